//! HTTP execution of gateway requests

use crate::config::GatewayConfig;
use crate::redact::{redact_body, redact_value};
use crate::tls;
use crate::trust::TrustStore;
use crate::types::{ErrorResponse, GatewayRequest};
use crate::{GatewayError, Result, USER_AGENT};
use reqwest::header::{CONTENT_TYPE, USER_AGENT as USER_AGENT_HEADER};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Content type of request bodies
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Executes one request per call against the gateway
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    trust_store: Arc<TrustStore>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl RequestExecutor {
    /// Create an executor trusting `trust_store` with the timeouts from `config`
    pub fn new(trust_store: Arc<TrustStore>, config: &GatewayConfig) -> Self {
        Self {
            trust_store,
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
        }
    }

    /// Send `request` to `endpoint` and decode the gateway's answer
    pub async fn execute<R: GatewayRequest>(&self, endpoint: &str, request: &R) -> Result<R::Response> {
        let url = Url::parse(endpoint)
            .map_err(|e| GatewayError::invalid_argument_with("Incorrect endpoint url", e))?;
        let body = serde_json::to_value(request)
            .map_err(|e| GatewayError::invalid_argument_with("Unable to serialize request", e))?;
        let method = request.method();

        let client = self.build_client(&url)?;

        tracing::debug!(
            %method,
            endpoint = %url,
            payload = %redact_value(&body),
            "sending gateway request"
        );

        let response = client
            .request(method, url.clone())
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| log_transport_failure(&url, e))?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|e| log_transport_failure(&url, e))?;

        tracing::debug!(
            status = status.as_u16(),
            endpoint = %url,
            payload = %redact_body(&payload),
            "received gateway response"
        );

        if !status.is_success() {
            let envelope = serde_json::from_str::<ErrorResponse>(&payload).ok();
            return Err(GatewayError::gateway(status.as_u16(), envelope));
        }

        serde_json::from_str(&payload).map_err(|source| GatewayError::MalformedResponse {
            status_code: status.as_u16(),
            source,
        })
    }

    fn build_client(&self, url: &Url) -> Result<Client> {
        // A redirect would replay the card details to another endpoint, so a
        // 3xx is reported as a gateway error instead.
        let mut builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .redirect(Policy::none())
            .pool_max_idle_per_host(0)
            .no_proxy();

        if url.scheme() == "https" {
            builder = builder.use_preconfigured_tls(tls::client_config(&self.trust_store)?);
        }

        builder
            .build()
            .map_err(|e| GatewayError::transport("Failed to create HTTP client", e))
    }
}

fn log_transport_failure(url: &Url, err: reqwest::Error) -> GatewayError {
    let err = GatewayError::from(err);
    tracing::warn!(endpoint = %url, error = %err, "gateway request failed");
    err
}
