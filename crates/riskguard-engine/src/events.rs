use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the terminal signal carrying the verdict payload.
pub const RISK_CHECK_RESULT: &str = "risk_check_result";

/// A named function result emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventContent {
    pub parts: Vec<EventPart>,
}

/// One event of the engine's output sequence. Intermediate events carry
/// text; the terminal event carries a named function response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<EventContent>,
}

impl EngineEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Some(EventContent {
                parts: vec![EventPart {
                    text: Some(text.into()),
                    function_response: None,
                }],
            }),
        }
    }

    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self {
            content: Some(EventContent {
                parts: vec![EventPart {
                    text: None,
                    function_response: Some(FunctionResponse {
                        name: name.into(),
                        response,
                    }),
                }],
            }),
        }
    }

    /// The function response of the first content part, if any.
    pub fn first_function_response(&self) -> Option<&FunctionResponse> {
        self.content
            .as_ref()
            .and_then(|content| content.parts.first())
            .and_then(|part| part.function_response.as_ref())
    }
}
