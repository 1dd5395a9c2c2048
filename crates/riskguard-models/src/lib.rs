pub mod config;
pub mod indicators;
pub mod message;
pub mod request;
pub mod verdict;

pub use config::{EngineConfig, RiskGuardConfig, SessionBackend, SessionConfig};
pub use message::{Message, Part, Role};
pub use request::{RequestContext, PORTFOLIO_STATE_KEY, TRADE_PROPOSAL_KEY};
pub use verdict::{RiskVerdict, NO_RESULT_REASON};
