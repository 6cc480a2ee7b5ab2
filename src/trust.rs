//! Certificate trust store
//!
//! The store always contains the gateway's own root certificate. It lives
//! outside the user map, so `remove` and `clear` cannot evict it whatever
//! alias the caller uses. User certificates are added under caller-chosen
//! aliases and may be replaced, removed or cleared freely.

use crate::{GatewayError, Result};
use base64::{engine::general_purpose, Engine as _};
use parking_lot::RwLock;
use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use std::collections::HashMap;
use std::fmt;

/// PEM-encoded root certificate of the payment gateway
pub const GATEWAY_ROOT_CERTIFICATE: &str = include_str!("certs/gateway_root.pem");

/// Name the reserved certificate is registered under in a snapshot
pub const RESERVED_ENTRY_NAME: &str = "gateway.root";

/// Prefix applied to user aliases in a snapshot
pub const CUSTOM_ENTRY_PREFIX: &str = "custom.";

/// A parsed X.509 certificate that can act as a trust anchor
#[derive(Clone, PartialEq, Eq)]
pub struct TrustedCertificate {
    der: CertificateDer<'static>,
}

impl TrustedCertificate {
    /// Parse a PEM-encoded certificate
    ///
    /// The `BEGIN`/`END` armor lines are optional; a bare base64 body is
    /// accepted too. Only the first certificate in the text is read, and it is
    /// checked as in [`TrustedCertificate::from_der`].
    pub fn from_pem(pem: &str) -> Result<Self> {
        let der = decode_pem(pem)?;
        Self::from_der(der)
    }

    /// Parse a DER-encoded certificate
    ///
    /// The input is accepted when it can act as a trust anchor: the outer
    /// X.509 structure, subject, public key and name constraints must decode.
    /// Validity dates, other extensions and the signature are not checked.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let der = CertificateDer::from(der.into());
        if der.is_empty() {
            return Err(GatewayError::invalid_argument("Certificate may not be empty"));
        }

        RootCertStore::empty()
            .add(der.clone())
            .map_err(|e| GatewayError::invalid_argument_with("Unable to read X.509 certificate", e))?;

        Ok(Self { der })
    }

    /// DER bytes of the certificate
    pub fn as_der(&self) -> &[u8] {
        self.der.as_ref()
    }

    pub(crate) fn to_certificate_der(&self) -> CertificateDer<'static> {
        self.der.clone()
    }
}

impl fmt::Debug for TrustedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustedCertificate")
            .field("der_len", &self.der.len())
            .finish()
    }
}

fn decode_pem(pem: &str) -> Result<Vec<u8>> {
    let mut body = String::new();
    for line in pem.lines().map(str::trim) {
        if line.starts_with("-----BEGIN") {
            continue;
        }
        if line.starts_with("-----END") {
            break;
        }
        body.extend(line.chars().filter(|c| !c.is_whitespace()));
    }

    if body.is_empty() {
        return Err(GatewayError::invalid_argument("Certificate may not be empty"));
    }

    general_purpose::STANDARD
        .decode(body)
        .map_err(|e| GatewayError::invalid_argument_with("Unable to read PEM certificate", e))
}

/// One named certificate in a trust store snapshot
#[derive(Debug, Clone)]
pub struct TrustEntry {
    /// Namespaced entry name
    pub name: String,
    /// The certificate
    pub certificate: TrustedCertificate,
}

/// Certificates trusted when connecting to the gateway
pub struct TrustStore {
    reserved_pem: &'static str,
    custom: RwLock<HashMap<String, TrustedCertificate>>,
}

impl TrustStore {
    /// Create a store holding only the gateway root certificate
    pub fn new() -> Self {
        Self {
            reserved_pem: GATEWAY_ROOT_CERTIFICATE,
            custom: RwLock::new(HashMap::new()),
        }
    }

    /// Add a certificate, replacing any entry with the same alias
    pub fn add(&self, alias: &str, certificate: TrustedCertificate) -> Result<()> {
        if alias.trim().is_empty() {
            return Err(GatewayError::invalid_argument("Alias may not be empty"));
        }

        let replaced = self
            .custom
            .write()
            .insert(alias.to_string(), certificate)
            .is_some();
        tracing::debug!(alias, replaced, "trusted certificate added");
        Ok(())
    }

    /// Parse a PEM-encoded certificate and add it under `alias`
    pub fn add_pem(&self, alias: &str, pem: &str) -> Result<()> {
        if alias.trim().is_empty() {
            return Err(GatewayError::invalid_argument("Alias may not be empty"));
        }
        let certificate = TrustedCertificate::from_pem(pem)?;
        self.add(alias, certificate)
    }

    /// Remove a user certificate; unknown aliases are ignored
    pub fn remove(&self, alias: &str) {
        if self.custom.write().remove(alias).is_some() {
            tracing::debug!(alias, "trusted certificate removed");
        }
    }

    /// Remove every user certificate
    pub fn clear(&self) {
        self.custom.write().clear();
    }

    /// Whether a user certificate is registered under `alias`
    pub fn contains(&self, alias: &str) -> bool {
        self.custom.read().contains_key(alias)
    }

    /// Look up a user certificate
    pub fn get(&self, alias: &str) -> Option<TrustedCertificate> {
        self.custom.read().get(alias).cloned()
    }

    /// Aliases of all user certificates, sorted
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.custom.read().keys().cloned().collect();
        aliases.sort();
        aliases
    }

    /// Number of user certificates
    pub fn len(&self) -> usize {
        self.custom.read().len()
    }

    /// Whether there are no user certificates
    pub fn is_empty(&self) -> bool {
        self.custom.read().is_empty()
    }

    /// All trusted certificates, reserved entry first
    ///
    /// The lock is released before this returns.
    pub fn snapshot(&self) -> Result<Vec<TrustEntry>> {
        let reserved = TrustedCertificate::from_pem(self.reserved_pem)?;

        let custom = self.custom.read();
        let mut entries = Vec::with_capacity(custom.len() + 1);
        entries.push(TrustEntry {
            name: RESERVED_ENTRY_NAME.to_string(),
            certificate: reserved,
        });

        let mut aliases: Vec<&String> = custom.keys().collect();
        aliases.sort();
        for alias in aliases {
            entries.push(TrustEntry {
                name: format!("{}{}", CUSTOM_ENTRY_PREFIX, alias),
                certificate: custom[alias].clone(),
            });
        }

        Ok(entries)
    }
}

impl Default for TrustStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TrustStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustStore")
            .field("aliases", &self.aliases())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISRG_ROOT_X2: &str = include_str!("../tests/fixtures/isrg_root_x2.pem");

    fn names(store: &TrustStore) -> Vec<String> {
        store
            .snapshot()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    #[test]
    fn test_reserved_certificate_parses() {
        let cert = TrustedCertificate::from_pem(GATEWAY_ROOT_CERTIFICATE).unwrap();
        assert!(!cert.as_der().is_empty());
    }

    #[test]
    fn test_new_store_has_only_reserved_entry() {
        let store = TrustStore::new();
        assert!(store.is_empty());
        assert_eq!(names(&store), vec![RESERVED_ENTRY_NAME.to_string()]);
    }

    #[test]
    fn test_add_then_remove_restores_state() {
        let store = TrustStore::new();
        let before = names(&store);

        store.add_pem("partner", ISRG_ROOT_X2).unwrap();
        assert!(store.contains("partner"));
        assert_eq!(
            names(&store),
            vec![RESERVED_ENTRY_NAME.to_string(), "custom.partner".to_string()]
        );

        store.remove("partner");
        assert_eq!(names(&store), before);
    }

    #[test]
    fn test_add_overwrites_existing_alias() {
        let store = TrustStore::new();
        let reserved = TrustedCertificate::from_pem(GATEWAY_ROOT_CERTIFICATE).unwrap();
        let other = TrustedCertificate::from_pem(ISRG_ROOT_X2).unwrap();

        store.add("dup", reserved).unwrap();
        store.add("dup", other.clone()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("dup"), Some(other));
    }

    #[test]
    fn test_reserved_alias_collision_cannot_evict() {
        let store = TrustStore::new();
        store.add_pem(RESERVED_ENTRY_NAME, ISRG_ROOT_X2).unwrap();
        store.remove(RESERVED_ENTRY_NAME);
        store.remove("unknown");
        store.clear();

        assert_eq!(names(&store), vec![RESERVED_ENTRY_NAME.to_string()]);
    }

    #[test]
    fn test_empty_alias_rejected() {
        let store = TrustStore::new();
        let result = store.add_pem("  ", ISRG_ROOT_X2);
        assert!(matches!(result, Err(GatewayError::InvalidArgument { .. })));
    }

    #[test]
    fn test_pem_without_armor() {
        let body: String = ISRG_ROOT_X2
            .lines()
            .filter(|l| !l.starts_with("-----"))
            .collect();
        let armored = TrustedCertificate::from_pem(ISRG_ROOT_X2).unwrap();
        let bare = TrustedCertificate::from_pem(&body).unwrap();
        assert_eq!(armored, bare);
    }

    #[test]
    fn test_malformed_base64_rejected() {
        let result = TrustedCertificate::from_pem("-----BEGIN CERTIFICATE-----\n@@@@\n-----END CERTIFICATE-----");
        match result {
            Err(GatewayError::InvalidArgument { source, .. }) => assert!(source.is_some()),
            other => panic!("expected invalid argument, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_der_rejected() {
        // valid base64, not a certificate
        let result = TrustedCertificate::from_pem("aGVsbG8gd29ybGQ=");
        assert!(matches!(result, Err(GatewayError::InvalidArgument { .. })));
        assert!(TrustedCertificate::from_der(Vec::<u8>::new()).is_err());
    }

    #[test]
    fn test_der_truncated_after_header_rejected() {
        let der = TrustedCertificate::from_pem(ISRG_ROOT_X2).unwrap().as_der().to_vec();
        assert!(TrustedCertificate::from_der(der[..16].to_vec()).is_err());
        assert!(TrustedCertificate::from_der(der).is_ok());
    }

    #[test]
    fn test_empty_pem_rejected() {
        assert!(TrustedCertificate::from_pem("").is_err());
        assert!(TrustedCertificate::from_pem("-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----").is_err());
    }
}
