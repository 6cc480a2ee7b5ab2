//! Request and response types for the gateway REST API

use crate::redact::{mask_card_number, MASKED_SECURITY_CODE};
use http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Operation discriminator for a session update carrying payer data
pub const UPDATE_PAYER_DATA: &str = "UPDATE_PAYER_DATA";

/// A request that can be sent to the gateway
///
/// Implementors serialize to the JSON request body and name the response
/// type the gateway answers with on success.
pub trait GatewayRequest: Serialize {
    /// Type decoded from a 2xx response body
    type Response: DeserializeOwned + Send + 'static;

    /// HTTP method used for this request
    fn method(&self) -> Method;
}

/// Card expiry date, two-digit month and year
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiry {
    /// Expiry month (MM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    /// Expiry year (YY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl Expiry {
    /// Create a new expiry from month and year
    pub fn new(month: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            month: Some(month.into()),
            year: Some(year.into()),
        }
    }
}

/// Card details supplied directly by the payer
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Cardholder name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_on_card: Option<String>,
    /// Primary account number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Card security code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_code: Option<String>,
    /// Expiry date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<Expiry>,
}

impl Card {
    /// Create a card from its individual fields
    pub fn new(
        name_on_card: impl Into<String>,
        number: impl Into<String>,
        security_code: impl Into<String>,
        expiry: Expiry,
    ) -> Self {
        Self {
            name_on_card: Some(name_on_card.into()),
            number: Some(number.into()),
            security_code: Some(security_code.into()),
            expiry: Some(expiry),
        }
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("name_on_card", &self.name_on_card)
            .field("number", &self.number.as_deref().map(mask_card_number))
            .field(
                "security_code",
                &self.security_code.as_ref().map(|_| MASKED_SECURITY_CODE),
            )
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Payment details provided as a card, not a stored token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provided {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
}

/// Source of funds for the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOfFunds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provided: Option<Provided>,
}

/// Update session request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    /// Operation discriminator
    pub api_operation: String,
    /// Payment details to attach to the session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_of_funds: Option<SourceOfFunds>,
}

impl UpdateSessionRequest {
    /// Create a session update carrying the given card
    pub fn with_card(card: Card) -> Self {
        Self {
            api_operation: UPDATE_PAYER_DATA.to_string(),
            source_of_funds: Some(SourceOfFunds {
                provided: Some(Provided { card: Some(card) }),
            }),
        }
    }

    /// Create a session update from raw card fields
    pub fn with_card_info(
        name_on_card: impl Into<String>,
        number: impl Into<String>,
        security_code: impl Into<String>,
        expiry_month: impl Into<String>,
        expiry_year: impl Into<String>,
    ) -> Self {
        Self::with_card(Card::new(
            name_on_card,
            number,
            security_code,
            Expiry::new(expiry_month, expiry_year),
        ))
    }

    /// The card carried by this request, if any
    pub fn card(&self) -> Option<&Card> {
        self.source_of_funds
            .as_ref()
            .and_then(|s| s.provided.as_ref())
            .and_then(|p| p.card.as_ref())
    }
}

impl GatewayRequest for UpdateSessionRequest {
    type Response = UpdateSessionResponse;

    fn method(&self) -> Method {
        Method::PUT
    }
}

/// Session summary returned by the gateway
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Session identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Result of the update, e.g. "SUCCESS"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_status: Option<String>,
    /// Session version after the update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Successful update session response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSessionResponse {
    /// Merchant identifier echoed by the gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    /// Updated session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionInfo>,
    /// API version that served the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Any other fields returned by the gateway
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl UpdateSessionResponse {
    /// Identifier of the updated session
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.id.as_deref())
    }
}

/// Details inside the gateway's error envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// Human-readable description of the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Request field the failure relates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_type: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Error envelope returned with non-success status codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Result indicator, usually "ERROR"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}
