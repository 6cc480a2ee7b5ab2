//! Gateway configuration and endpoint construction

use crate::{GatewayError, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::time::Duration;
use url::Url;

/// Default REST API version
pub const DEFAULT_API_VERSION: u32 = 39;

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Characters escaped when an identifier is inserted as a path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Endpoint root, scheme and host only
    base_url: Option<String>,
    /// Merchant identifier
    merchant_id: Option<String>,
    api_version: u32,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl GatewayConfig {
    /// Create an empty configuration with default timeouts
    pub fn new() -> Self {
        Self {
            base_url: None,
            merchant_id: None,
            api_version: DEFAULT_API_VERSION,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        self.set_base_url(url)?;
        Ok(self)
    }

    /// Set the merchant ID
    pub fn with_merchant_id(mut self, merchant_id: impl Into<String>) -> Result<Self> {
        self.set_merchant_id(merchant_id)?;
        Ok(self)
    }

    /// Set the REST API version
    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Parse and set the base URL
    ///
    /// Only the scheme, host and port are kept; path, query and fragment are
    /// discarded.
    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(GatewayError::invalid_argument("Url may not be empty"));
        }
        let parsed = Url::parse(url.trim())
            .map_err(|e| GatewayError::invalid_argument_with("Incorrect url format", e))?;
        self.set_base_url_from(&parsed)
    }

    /// Set the base URL from an already parsed URL
    pub fn set_base_url_from(&mut self, url: &Url) -> Result<()> {
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(GatewayError::invalid_argument(format!(
                "Unsupported url scheme '{}'",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(GatewayError::invalid_argument("Url must contain a host"));
        }

        self.base_url = Some(url.origin().ascii_serialization());
        Ok(())
    }

    /// Set the merchant ID
    pub fn set_merchant_id(&mut self, merchant_id: impl Into<String>) -> Result<()> {
        let merchant_id = merchant_id.into();
        if merchant_id.trim().is_empty() {
            return Err(GatewayError::invalid_argument("Merchant ID may not be empty"));
        }
        self.merchant_id = Some(merchant_id);
        Ok(())
    }

    /// Endpoint root, e.g. `https://host.example.com`
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Merchant ID
    pub fn merchant_id(&self) -> Option<&str> {
        self.merchant_id.as_deref()
    }

    /// REST API version
    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Connect timeout
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Read timeout
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Check that requests can be issued with this configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_none() {
            return Err(GatewayError::invalid_argument("Base url has not been set"));
        }
        if self.merchant_id.is_none() {
            return Err(GatewayError::invalid_argument("Merchant ID has not been set"));
        }
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(GatewayError::invalid_argument("Timeouts must be greater than zero"));
        }
        Ok(())
    }

    /// Root of the versioned REST API
    pub fn api_url(&self) -> Result<String> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| GatewayError::invalid_argument("Base url has not been set"))?;
        Ok(format!("{}/api/rest/version/{}", base_url, self.api_version))
    }

    /// Endpoint for updating the given session
    pub fn update_session_url(&self, session_id: &str) -> Result<String> {
        self.validate()?;
        if session_id.trim().is_empty() {
            return Err(GatewayError::invalid_argument("Session ID may not be empty"));
        }
        let merchant_id = self.merchant_id.as_deref().unwrap_or_default();

        Ok(format!(
            "{}/merchant/{}/session/{}",
            self.api_url()?,
            utf8_percent_encode(merchant_id, PATH_SEGMENT),
            utf8_percent_encode(session_id, PATH_SEGMENT)
        ))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new()
    }
}
