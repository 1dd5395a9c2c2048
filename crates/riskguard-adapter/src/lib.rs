pub mod error;
pub mod executor;
pub mod queue;

pub use error::AdapterError;
pub use executor::{RiskGuardExecutor, APP_NAME, USER_ID};
pub use queue::{BufferedEventQueue, EventQueue, QueueError};
