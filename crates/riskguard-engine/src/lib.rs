pub mod engine;
pub mod error;
pub mod events;
pub mod rule;

pub mod test_support;

pub use engine::{EngineEventStream, EngineInput, RiskEngine};
pub use error::EngineError;
pub use events::{EngineEvent, EventContent, EventPart, FunctionResponse, RISK_CHECK_RESULT};
pub use rule::RuleBasedRiskEngine;
