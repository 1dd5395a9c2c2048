use thiserror::Error;

use riskguard_engine::EngineError;
use riskguard_models::RiskVerdict;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to establish session '{0}'")]
    SessionUnavailable(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl AdapterError {
    /// The single failure-to-reply mapping: every error becomes a denial
    /// whose reason names the originating condition.
    pub fn to_verdict(&self) -> RiskVerdict {
        RiskVerdict::denied(format!("An internal error occurred: {self}"))
    }
}
