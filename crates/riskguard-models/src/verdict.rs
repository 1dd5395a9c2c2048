use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reason reported when the engine's event stream ends without a verdict.
pub const NO_RESULT_REASON: &str = "Agent did not produce a result.";

/// The engine's approve/deny decision with a justification. Extra keys in
/// the engine's response object are carried through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskVerdict {
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub reason: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RiskVerdict {
    fn default() -> Self {
        Self {
            approved: false,
            reason: NO_RESULT_REASON.to_string(),
            extra: Map::new(),
        }
    }
}

impl RiskVerdict {
    pub fn approved(reason: impl Into<String>) -> Self {
        Self {
            approved: true,
            reason: reason.into(),
            extra: Map::new(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: reason.into(),
            extra: Map::new(),
        }
    }

    /// Adopt a verdict from an engine response. Only JSON objects qualify.
    pub fn from_response(value: &Value) -> Option<Self> {
        value
            .as_object()
            .and_then(|_| serde_json::from_value(value.clone()).ok())
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "approved": false, "reason": self.reason })
        })
    }
}
