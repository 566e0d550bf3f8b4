/// Errors from the API layer: credentials, signing, HTTP and decoding.
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Everything that can go wrong between reading credentials and decoding a response.
#[derive(Debug, Error)]
pub enum YelpError {
    /// A required credential environment variable is not set.
    #[error("Missing credential: environment variable {name} is not set")]
    MissingCredential {
        /// Name of the unset variable.
        name: String,
    },

    /// The request could not be signed (empty credential, bad base URL).
    #[error("Cannot sign request: {0}")]
    Signing(String),

    /// A search or lookup parameter failed validation before any request was made.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter {
        /// Parameter (flag) name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The API answered with a non-2xx status. `body` is the decoded error payload.
    #[error("API error (HTTP {status}): {}", api_error_text(.body))]
    Api {
        /// HTTP status returned by the API.
        status: StatusCode,
        /// Error body, decoded as JSON; non-JSON bodies are kept as a string.
        body: Value,
    },

    /// Network failure or timeout.
    #[error("{}", transport_message(.0))]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body is not the expected JSON shape.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl YelpError {
    /// Return the CLI exit code for this error.
    ///
    /// A closed stdout pipe (`yelp search ... | head`) is not a failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe => 0,
            _ => 1,
        }
    }
}

/// Pull the most useful text out of a Yelp error body.
///
/// v2 errors look like `{"error": {"id": "AREA_TOO_LARGE", "text": "..."}}`.
fn api_error_text(body: &Value) -> String {
    let error = body.get("error").unwrap_or(body);
    let text = error.get("text").and_then(Value::as_str);
    let id = error.get("id").and_then(Value::as_str);
    match (id, text) {
        (Some(id), Some(text)) => format!("{id}: {text}"),
        (None, Some(text)) => text.to_owned(),
        (Some(id), None) => id.to_owned(),
        (None, None) => match body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("Request timed out: {err}")
    } else {
        format!("HTTP request failed: {err}")
    }
}
