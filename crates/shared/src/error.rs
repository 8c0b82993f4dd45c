use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Shown when a failed query carries no structured detail.
pub const GENERIC_FETCH_ERROR: &str = "Failed to fetch data";

/// Rejected combinations of filter and pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("a district filter requires a state filter")]
    DistrictWithoutState,
    #[error("page size must be positive")]
    ZeroLimit,
    #[error("offset {offset} is not a multiple of page size {limit}")]
    MisalignedOffset { offset: u64, limit: u64 },
}

/// Failure body returned by the gateway, e.g. `{"detail": "Invalid API Key"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Human-readable message carried by the body, if any.
    ///
    /// A string detail is returned as is. Request validation failures come
    /// back as a list of `{ "msg": .. }` objects and are joined.
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
            Value::Array(items) => {
                let messages = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .filter(|msg| !msg.trim().is_empty())
                    .collect::<Vec<_>>();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(value: Value) -> ErrorBody {
        serde_json::from_value(value).expect("error body")
    }

    #[test]
    fn string_detail_is_used_verbatim() {
        assert_eq!(
            body(json!({ "detail": "invalid api key" })).detail_message(),
            Some("invalid api key".to_string())
        );
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let detail = body(json!({
            "detail": [
                { "loc": ["query", "offset"], "msg": "ensure this value is greater than or equal to 0" },
                { "loc": ["query", "limit"], "msg": "field required" }
            ]
        }));
        assert_eq!(
            detail.detail_message(),
            Some("ensure this value is greater than or equal to 0; field required".to_string())
        );
    }

    #[test]
    fn missing_or_unstructured_detail_yields_none() {
        assert_eq!(body(json!({})).detail_message(), None);
        assert_eq!(body(json!({ "detail": "  " })).detail_message(), None);
        assert_eq!(body(json!({ "detail": 42 })).detail_message(), None);
        assert_eq!(body(json!({ "detail": [{ "loc": [] }] })).detail_message(), None);
    }
}
