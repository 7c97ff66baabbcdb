//! The single error type surfaced by [`AbstractClient`](super::AbstractClient).

use serde_json::Value;
use std::time::Duration;

use super::ServiceKey;

/// Broad category of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing key or unusable client settings; nothing was sent
    Configuration,
    /// Arguments the upstream cannot accept; nothing was sent
    InvalidRequest,
    /// The upstream answered with a non-2xx status
    Upstream,
    /// Timeout, DNS, refused connection or a broken body stream
    Transport,
    /// A 2xx body that does not match the expected shape
    Decode,
}

/// Errors that can occur when calling Abstract API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No key configured for the service the operation belongs to
    #[error("No API key configured for {service} service. Set {}", .service.env_var())]
    MissingCredential { service: ServiceKey },

    /// Client settings that cannot be used (bad base URL, TLS backend failure, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Arguments rejected before any request is made
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-2xx response, with the upstream body as details when it had one
    #[error("Abstract API Error {status}: {message}")]
    Upstream {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// The request never produced a complete response
    #[error("Network error: {message}")]
    Transport {
        message: String,
        timed_out: bool,
        #[source]
        source: reqwest::Error,
    },

    /// A successful response whose body could not be turned into the result type
    #[error("Failed to decode {service} response: {message}")]
    Decode {
        service: ServiceKey,
        status: u16,
        message: String,
        details: Option<Value>,
    },
}

impl ApiError {
    /// HTTP status of the failed exchange, `0` when no HTTP status exists
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Upstream { status, .. } | ApiError::Decode { status, .. } => *status,
            _ => 0,
        }
    }

    /// Human-readable message without the status prefix
    pub fn message(&self) -> String {
        match self {
            ApiError::Upstream { message, .. }
            | ApiError::Transport { message, .. }
            | ApiError::Decode { message, .. } => message.clone(),
            ApiError::Config(message) | ApiError::InvalidRequest(message) => message.clone(),
            ApiError::MissingCredential { .. } => self.to_string(),
        }
    }

    /// Structured payload from the upstream, when one was returned
    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Upstream { details, .. } | ApiError::Decode { details, .. } => {
                details.as_ref()
            }
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::MissingCredential { .. } | ApiError::Config(_) => ErrorClass::Configuration,
            ApiError::InvalidRequest(_) => ErrorClass::InvalidRequest,
            ApiError::Upstream { .. } => ErrorClass::Upstream,
            ApiError::Transport { .. } => ErrorClass::Transport,
            ApiError::Decode { .. } => ErrorClass::Decode,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.class() == ErrorClass::Configuration
    }

    pub fn is_transport(&self) -> bool {
        self.class() == ErrorClass::Transport
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport { timed_out: true, .. })
    }

    /// Wrap a reqwest failure, keeping it as the source
    pub(crate) fn transport(source: reqwest::Error, timeout: Duration) -> Self {
        let timed_out = source.is_timeout();
        let message = if timed_out {
            format!("request timed out after {}s", timeout.as_secs_f64())
        } else if source.is_connect() {
            "could not connect to upstream".to_string()
        } else if source.is_body() || source.is_decode() {
            "failed to read response body".to_string()
        } else {
            "request failed".to_string()
        };

        ApiError::Transport {
            message,
            timed_out,
            source,
        }
    }

    /// Build the error for a non-2xx JSON body.
    ///
    /// The message is taken from `error.message`, `message`, `title` or `error`,
    /// in that order; the whole body is kept as details.
    pub(crate) fn from_error_body(status: u16, body: Value) -> Self {
        let message = error_message(&body).unwrap_or_else(|| "Unknown error".to_string());
        ApiError::Upstream {
            status,
            message,
            details: Some(body),
        }
    }
}

fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error");

    if let Some(Value::Object(obj)) = error {
        if let Some(message) = obj.get("message").and_then(non_empty_str) {
            return Some(message);
        }
    }

    body.get("message")
        .and_then(non_empty_str)
        .or_else(|| body.get("title").and_then(non_empty_str))
        .or_else(|| match error {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
