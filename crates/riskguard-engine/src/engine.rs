use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde_json::{Map, Value};

use crate::error::EngineError;
use crate::events::EngineEvent;

/// Lazy, finite, non-restartable sequence of engine events.
pub type EngineEventStream = BoxStream<'static, Result<EngineEvent, EngineError>>;

/// The single opaque content unit handed to the engine: the validated
/// request payload serialized as JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineInput {
    pub text: String,
}

impl EngineInput {
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, EngineError> {
        let text = serde_json::to_string(&Value::Object(payload.clone()))?;
        Ok(Self { text })
    }
}

/// The opaque decision-making subsystem. Implementations evaluate the input
/// bound to a session identity and yield events terminating in a named
/// `risk_check_result` function response.
#[async_trait]
pub trait RiskEngine: Send + Sync {
    async fn run(
        &self,
        user_id: &str,
        session_id: &str,
        input: EngineInput,
    ) -> Result<EngineEventStream, EngineError>;
}
