//! Error types for the gateway SDK

use crate::types::ErrorResponse;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Boxed error used as the source of wrapped failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for gateway operations
///
/// `InvalidArgument` is raised synchronously by configuration and request
/// entry points. The remaining variants are only produced while a request
/// executes and always arrive through the same channel as a successful result.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Bad configuration or request input
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Name resolution, connect, TLS or read failure
    #[error("Transport failure: {message}")]
    Transport {
        message: String,
        #[source]
        source: BoxError,
    },

    /// The response body could not be decoded into the expected shape
    #[error("Malformed response (HTTP {status_code}): {source}")]
    MalformedResponse {
        status_code: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The gateway answered with a non-success status
    #[error(
        "Gateway error (HTTP {status_code}): {}",
        .explanation.as_deref().unwrap_or("no explanation provided")
    )]
    Gateway {
        status_code: u16,
        explanation: Option<String>,
        response: Option<ErrorResponse>,
    },
}

impl GatewayError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid argument error wrapping the underlying cause
    pub fn invalid_argument_with(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a transport failure
    pub fn transport(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Create a gateway error from a status code and a possibly absent envelope
    pub fn gateway(status_code: u16, response: Option<ErrorResponse>) -> Self {
        let explanation = response
            .as_ref()
            .and_then(|r| r.error.as_ref())
            .and_then(|e| e.explanation.clone());

        Self::Gateway {
            status_code,
            explanation,
            response,
        }
    }

    /// HTTP status code, when the gateway produced a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::MalformedResponse { status_code, .. } | Self::Gateway { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }

    /// Explanation from the gateway's error envelope
    pub fn explanation(&self) -> Option<&str> {
        match self {
            Self::Gateway { explanation, .. } => explanation.as_deref(),
            _ => None,
        }
    }

    /// The parsed error envelope, if the gateway returned a readable one
    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Gateway { response, .. } => response.as_ref(),
            _ => None,
        }
    }

    /// Whether this failure was caused by a connect or read timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source
                .downcast_ref::<reqwest::Error>()
                .is_some_and(reqwest::Error::is_timeout),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out"
        } else if err.is_connect() {
            "unable to connect to gateway"
        } else if err.is_body() || err.is_decode() {
            "failed to read response body"
        } else {
            "request failed"
        };
        Self::transport(message, err)
    }
}
