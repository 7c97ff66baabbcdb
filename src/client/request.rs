//! Request descriptors and raw response bodies.

use serde_json::Value;

use super::ServiceKey;

/// Everything needed to issue one call, minus the key.
///
/// The key is attached at send time so a descriptor can be logged or handed to
/// a diagnostics sink as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Operation name, e.g. `validate_email`
    pub operation: &'static str,

    /// Service whose key authenticates the call
    pub service: ServiceKey,

    /// Path on the service host, e.g. `/v1/current_time/`
    pub path: &'static str,

    /// Query parameters in the order they were added
    pub params: Vec<(&'static str, String)>,

    /// Scraping and screenshots get the long timeout
    pub long_running: bool,
}

impl ApiRequest {
    pub fn new(operation: &'static str, service: ServiceKey, path: &'static str) -> Self {
        Self {
            operation,
            service,
            path,
            params: Vec::new(),
            long_running: false,
        }
    }

    /// Add a required parameter
    pub fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    /// Add a parameter only when it has a non-blank value
    pub fn optional<T: ToString>(mut self, name: &'static str, value: Option<T>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.trim().is_empty() {
                self.params.push((name, value));
            }
        }
        self
    }

    pub fn long_running(mut self) -> Self {
        self.long_running = true;
        self
    }
}

/// A response body, classified by content type
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Payload {
    Json(Value),
    Text(String),
    Binary { bytes: Vec<u8>, content_type: String },
}

impl Payload {
    /// Classify a body the way the upstream labels it.
    ///
    /// Images and octet streams are binary, JSON is parsed, plain text stays text,
    /// and anything else is parsed as JSON when it looks like JSON.
    pub(crate) fn classify(content_type: &str, bytes: Vec<u8>) -> Self {
        let content_type = content_type.to_ascii_lowercase();

        if content_type.contains("image") || content_type.contains("application/octet-stream") {
            return Payload::Binary {
                bytes,
                content_type,
            };
        }

        let text = String::from_utf8_lossy(&bytes).into_owned();

        if content_type.contains("application/json") {
            return match serde_json::from_str(&text) {
                Ok(value) => Payload::Json(value),
                Err(_) => Payload::Text(text),
            };
        }

        if content_type.contains("text/plain") {
            return Payload::Text(text);
        }

        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str(&text) {
                return Payload::Json(value);
            }
        }

        Payload::Text(text)
    }

    /// Fill in `url` on a JSON object that lacks one
    pub(crate) fn with_url(self, url: &str) -> Self {
        match self {
            Payload::Json(Value::Object(mut map)) => {
                map.entry("url")
                    .or_insert_with(|| Value::String(url.to_string()));
                Payload::Json(Value::Object(map))
            }
            other => other,
        }
    }

    /// JSON view of the body; text is wrapped as `{"result": text}`
    pub(crate) fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(text) => Some(serde_json::json!({ "result": text })),
            Payload::Binary { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_params_skip_absent_and_blank() {
        let request = ApiRequest::new("validate_phone", ServiceKey::Phone, "/v1/")
            .param("phone", "+1234567890")
            .optional("country_code", None::<String>)
            .optional("carrier", Some(""))
            .optional("month", Some(3));

        assert_eq!(
            request.params,
            vec![("phone", "+1234567890".to_string()), ("month", "3".to_string())]
        );
        assert!(!request.long_running);
    }

    #[test]
    fn test_classify_json() {
        let payload = Payload::classify("application/json; charset=utf-8", br#"{"a":1}"#.to_vec());
        assert_eq!(payload, Payload::Json(json!({"a": 1})));
    }

    #[test]
    fn test_classify_plain_text() {
        let payload = Payload::classify("text/plain", b"hello".to_vec());
        assert_eq!(payload.into_json(), Some(json!({"result": "hello"})));
    }

    #[test]
    fn test_classify_sniffs_unlabelled_json() {
        let payload = Payload::classify("", b"  [1, 2]".to_vec());
        assert_eq!(payload, Payload::Json(json!([1, 2])));

        let payload = Payload::classify("text/html", b"<html></html>".to_vec());
        assert_eq!(payload, Payload::Text("<html></html>".to_string()));
    }

    #[test]
    fn test_classify_binary() {
        let payload = Payload::classify("image/png", vec![0x89, 0x50]);
        assert!(matches!(payload, Payload::Binary { ref bytes, .. } if bytes.len() == 2));
        assert_eq!(payload.into_json(), None);
    }

    #[test]
    fn test_with_url_keeps_existing() {
        let payload = Payload::Json(json!({"content": "x"})).with_url("https://a.io");
        assert_eq!(payload, Payload::Json(json!({"content": "x", "url": "https://a.io"})));

        let payload = Payload::Json(json!({"url": "https://b.io"})).with_url("https://a.io");
        assert_eq!(payload, Payload::Json(json!({"url": "https://b.io"})));
    }

    #[test]
    fn test_invalid_json_falls_back_to_text() {
        let payload = Payload::classify("application/json", b"{not json".to_vec());
        assert_eq!(payload, Payload::Text("{not json".to_string()));
    }
}
