//! TLS client context restricted to the trust store

use crate::trust::{TrustEntry, TrustStore};
use crate::{GatewayError, Result};
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;

/// Build a root store holding exactly the given entries
///
/// Platform and bundled roots are never consulted. A certificate that fails
/// to load aborts the build rather than being skipped.
pub fn root_store(entries: &[TrustEntry]) -> Result<RootCertStore> {
    let mut roots = RootCertStore::empty();
    for entry in entries {
        roots
            .add(entry.certificate.to_certificate_der())
            .map_err(|e| {
                GatewayError::transport(
                    format!("failed to load trusted certificate '{}'", entry.name),
                    e,
                )
            })?;
    }

    if roots.is_empty() {
        return Err(GatewayError::transport(
            "failed to initialize TLS context",
            "trust store is empty",
        ));
    }

    Ok(roots)
}

/// Build a TLS client configuration trusting the store's current snapshot
pub fn client_config(store: &TrustStore) -> Result<ClientConfig> {
    let entries = store
        .snapshot()
        .map_err(|e| GatewayError::transport("failed to initialize TLS context", e))?;
    let roots = root_store(&entries)?;
    tracing::trace!(anchors = roots.len(), "built gateway trust anchors");

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| GatewayError::transport("failed to initialize TLS context", e))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(config)
}
