use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::Message;

/// Payload key holding the proposed trade.
pub const TRADE_PROPOSAL_KEY: &str = "trade_proposal";
/// Payload key holding the caller's current portfolio snapshot.
pub const PORTFOLIO_STATE_KEY: &str = "portfolio_state";

/// Inbound request as delivered by the transport. The transport has already
/// deserialized the wire format; the adapter only inspects the shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestContext {
    #[serde(default)]
    pub context_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

impl RequestContext {
    /// The structured payload: the data object of the first message part.
    /// Returns `None` when there is no message, no data part, or the data
    /// is not a JSON object.
    pub fn data_payload(&self) -> Option<&Map<String, Value>> {
        self.message
            .as_ref()
            .and_then(Message::first_data)
            .and_then(Value::as_object)
    }

    /// A `context_id` that is present and non-empty.
    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref().filter(|id| !id.is_empty())
    }
}
