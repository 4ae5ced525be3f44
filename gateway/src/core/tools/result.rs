use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Outcome of a tool call, always serializable back into the conversation.
///
/// Serializes as `{"success":true,"data":...}` or
/// `{"success":false,"message":"..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Value),
    Failure(String),
}

impl ToolResult {
    pub fn success(data: Value) -> Self {
        Self::Success(data)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// JSON text placed in the `output` field of a `function_call_output` item.
    pub fn to_output(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"message":"failed to encode tool result: {e}"}}"#)
        })
    }
}

impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Self::Success(data) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
            }
            Self::Failure(message) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("message", message)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let result = ToolResult::success(json!([{"name": "Ada"}]));
        let value: Value = serde_json::from_str(&result.to_output()).unwrap();
        assert_eq!(value, json!({"success": true, "data": [{"name": "Ada"}]}));
        assert!(result.is_success());
    }

    #[test]
    fn test_failure_shape() {
        let result = ToolResult::failure("nothing found");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value, json!({"success": false, "message": "nothing found"}));
        assert!(!result.is_success());
    }
}
