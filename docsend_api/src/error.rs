use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid API token")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("upload cancelled")]
    Cancelled,
    #[error("server rejected the request ({status}): {}", messages.join("; "))]
    Api {
        status: StatusCode,
        messages: Vec<String>,
    },
}

/// Error payload the server sends: a headline message plus a `data` object
/// that either carries `field_errors` or per-field detail arrays.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ErrorBody {
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ErrorBody {
    /// Flatten the payload into user-facing strings: one line per field
    /// error when present, otherwise the message with whatever detail the
    /// data object holds appended.
    pub fn messages(&self) -> Vec<String> {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "request failed".to_string());

        if let Some(fields) = self.data.get("field_errors").and_then(|v| v.as_array()) {
            let field_messages: Vec<String> = fields
                .iter()
                .filter_map(|field| field.as_str())
                .map(|field| format!("{message} {field}"))
                .collect();
            if !field_messages.is_empty() {
                return field_messages;
            }
        }

        let details = self
            .data
            .as_object()
            .map(|map| {
                map.values()
                    .flat_map(flatten_value)
                    .collect::<Vec<String>>()
                    .join(" ")
            })
            .unwrap_or_default();

        if details.is_empty() {
            vec![message]
        } else {
            vec![format!("{message}: {details}")]
        }
    }
}

fn flatten_value(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(s) => vec![s.clone()],
        serde_json::Value::Array(items) => items.iter().flat_map(flatten_value).collect(),
        serde_json::Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_errors_become_one_message_each() {
        let body: ErrorBody = serde_json::from_value(json!({
            "message": "Invalid value for",
            "data": { "field_errors": ["email", "password"] }
        }))
        .unwrap();
        assert_eq!(
            body.messages(),
            ["Invalid value for email", "Invalid value for password"]
        );
    }

    #[test]
    fn detail_arrays_are_flattened_behind_the_message() {
        let body: ErrorBody = serde_json::from_value(json!({
            "message": "Validation failed",
            "data": { "name": ["must not be empty"], "tax_id": ["must have 14 digits"] }
        }))
        .unwrap();
        let messages = body.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Validation failed: "));
        assert!(messages[0].contains("must not be empty"));
        assert!(messages[0].contains("must have 14 digits"));
    }

    #[test]
    fn empty_payload_still_produces_a_message() {
        let body = ErrorBody::default();
        assert_eq!(body.messages(), ["request failed"]);
    }
}
