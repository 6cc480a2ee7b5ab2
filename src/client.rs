//! Gateway SDK entry point

use crate::config::GatewayConfig;
use crate::dispatch::GatewayCall;
use crate::executor::RequestExecutor;
use crate::trust::{TrustStore, TrustedCertificate};
use crate::types::{Card, GatewayRequest, UpdateSessionRequest, UpdateSessionResponse};
use crate::Result;
use std::sync::Arc;
use url::Url;

/// Client for the payment gateway
///
/// Owns its configuration and its own trust store. Session updates return a
/// [`GatewayCall`], which can be awaited directly or delivered to a
/// [`CallbackQueue`](crate::dispatch::CallbackQueue).
///
/// ```no_run
/// # async fn run() -> gateway_sdk::Result<()> {
/// use gateway_sdk::Gateway;
///
/// let mut gateway = Gateway::new();
/// gateway.set_base_url("https://your-gateway-url.com")?;
/// gateway.set_merchant_id("your-merchant-id")?;
///
/// let response = gateway
///     .update_session_with_card_info("SESSION0001", "Jane Doe", "4111111111111111", "123", "05", "29")?
///     .await?;
/// println!("updated session {:?}", response.session_id());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Gateway {
    config: GatewayConfig,
    trust_store: Arc<TrustStore>,
}

impl Gateway {
    /// Create an unconfigured gateway client
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    /// Create a gateway client from an existing configuration
    pub fn with_config(config: GatewayConfig) -> Self {
        Self {
            config,
            trust_store: Arc::new(TrustStore::new()),
        }
    }

    /// Current configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Mutable access to the configuration
    pub fn config_mut(&mut self) -> &mut GatewayConfig {
        &mut self.config
    }

    /// Endpoint root of the gateway
    pub fn base_url(&self) -> Option<&str> {
        self.config.base_url()
    }

    /// Set the base URL; only its scheme and host are kept
    pub fn set_base_url(&mut self, url: &str) -> Result<&mut Self> {
        self.config.set_base_url(url)?;
        Ok(self)
    }

    /// Set the base URL from a parsed URL
    pub fn set_base_url_from(&mut self, url: &Url) -> Result<&mut Self> {
        self.config.set_base_url_from(url)?;
        Ok(self)
    }

    /// Current merchant ID
    pub fn merchant_id(&self) -> Option<&str> {
        self.config.merchant_id()
    }

    /// Set the merchant ID
    pub fn set_merchant_id(&mut self, merchant_id: impl Into<String>) -> Result<&mut Self> {
        self.config.set_merchant_id(merchant_id)?;
        Ok(self)
    }

    /// The trust store used for HTTPS connections
    pub fn trust_store(&self) -> &TrustStore {
        &self.trust_store
    }

    /// Trust an additional PEM-encoded certificate
    ///
    /// The gateway's own root certificate is always trusted and cannot be
    /// removed.
    pub fn add_trusted_certificate_pem(&self, alias: &str, pem: &str) -> Result<&Self> {
        self.trust_store.add_pem(alias, pem)?;
        Ok(self)
    }

    /// Trust an additional certificate
    pub fn add_trusted_certificate(
        &self,
        alias: &str,
        certificate: TrustedCertificate,
    ) -> Result<&Self> {
        self.trust_store.add(alias, certificate)?;
        Ok(self)
    }

    /// Stop trusting a previously added certificate
    pub fn remove_trusted_certificate(&self, alias: &str) {
        self.trust_store.remove(alias);
    }

    /// Remove all additional certificates
    pub fn clear_trusted_certificates(&self) {
        self.trust_store.clear();
    }

    /// Update a session with basic card information
    pub fn update_session_with_card_info(
        &self,
        session_id: &str,
        name_on_card: &str,
        card_number: &str,
        security_code: &str,
        expiry_mm: &str,
        expiry_yy: &str,
    ) -> Result<GatewayCall<UpdateSessionResponse>> {
        self.update_session(
            session_id,
            UpdateSessionRequest::with_card_info(
                name_on_card,
                card_number,
                security_code,
                expiry_mm,
                expiry_yy,
            ),
        )
    }

    /// Update a session with the provided card
    pub fn update_session_with_card(
        &self,
        session_id: &str,
        card: Card,
    ) -> Result<GatewayCall<UpdateSessionResponse>> {
        self.update_session(session_id, UpdateSessionRequest::with_card(card))
    }

    /// Update a session with a pre-built request
    ///
    /// Configuration problems are reported here, before anything is sent.
    pub fn update_session(
        &self,
        session_id: &str,
        request: UpdateSessionRequest,
    ) -> Result<GatewayCall<UpdateSessionResponse>> {
        let endpoint = self.config.update_session_url(session_id)?;
        Ok(self.call(endpoint, request))
    }

    fn call<R>(&self, endpoint: String, request: R) -> GatewayCall<R::Response>
    where
        R: GatewayRequest + Send + Sync + 'static,
    {
        let executor = RequestExecutor::new(Arc::clone(&self.trust_store), &self.config);
        GatewayCall::new(async move { executor.execute(&endpoint, &request).await })
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}
