/// Shared serializable types: API payloads, table rows and the error envelope.
///
/// Businesses are passed through as raw JSON. Only the table renderer looks
/// inside them, and only through [`BusinessRow`].
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::YelpError;

/// A single business record, exactly as the API returned it.
pub type Business = Value;

/// One page of search results.
///
/// Fields other than `businesses` and `total` (e.g. `region`) are kept so the
/// whole payload can be printed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Businesses in server order.
    pub businesses: Vec<Business>,
    /// Total matches reported by the server. Informational only.
    #[serde(default)]
    pub total: u64,
    /// Remaining top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The handful of business fields shown in table output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessRow {
    pub name: String,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub city: Option<String>,
    pub phone: Option<String>,
}

impl BusinessRow {
    /// Pick table fields out of a raw business; missing fields stay `None`.
    #[must_use]
    pub fn from_business(business: &Business) -> Self {
        let str_at = |pointer: &str| {
            business
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        Self {
            name: str_at("/name")
                .or_else(|| str_at("/id"))
                .unwrap_or_default(),
            rating: business.get("rating").and_then(Value::as_f64),
            review_count: business.get("review_count").and_then(Value::as_u64),
            city: str_at("/location/city"),
            phone: str_at("/display_phone").or_else(|| str_at("/phone")),
        }
    }
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (snake_case).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status, for API errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// The API's own error payload, unmodified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ErrorOutput {
    /// Construct from a `YelpError`.
    #[must_use]
    pub fn from_error(err: &YelpError) -> Self {
        let (code, status, body) = match err {
            YelpError::MissingCredential { .. } => ("missing_credential", None, None),
            YelpError::Signing(_) => ("signing_error", None, None),
            YelpError::InvalidParameter { .. } => ("invalid_parameter", None, None),
            YelpError::Api { status, body } => ("api_error", Some(status.as_u16()), Some(body.clone())),
            YelpError::Transport(_) => ("transport_error", None, None),
            YelpError::Decode(_) => ("decode_error", None, None),
            YelpError::Io(_) => ("io_error", None, None),
        };
        Self {
            ok: false,
            error: ErrorDetail {
                code: code.to_owned(),
                message: err.to_string(),
                status,
                body,
            },
        }
    }
}
