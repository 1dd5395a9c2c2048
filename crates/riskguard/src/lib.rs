//! RiskGuard - single-shot risk evaluation adapter
//!
//! Bridges A2A-style trade requests onto a risk engine: each request is
//! validated, bound to a session, run through the engine, and answered with
//! exactly one outbound message before the reply channel closes.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use riskguard::models::{RequestContext, RiskVerdict, RiskGuardConfig};
//! use riskguard::adapter::{RiskGuardExecutor, BufferedEventQueue};
//! use riskguard::engine::RuleBasedRiskEngine;
//! use riskguard::session::InMemorySessionService;
//! ```

pub use riskguard_adapter as adapter;
pub use riskguard_engine as engine;
pub use riskguard_models as models;
pub use riskguard_session as session;

use std::sync::Arc;

use riskguard_adapter::{BufferedEventQueue, RiskGuardExecutor};
use riskguard_engine::RuleBasedRiskEngine;
use riskguard_models::config::{RiskGuardConfig, SessionBackend};
use riskguard_models::{Message, RequestContext};
use riskguard_session::{InMemorySessionService, SessionService, SqliteSessionService};

/// Build an executor from configuration.
pub fn build_executor(config: &RiskGuardConfig) -> Result<RiskGuardExecutor, anyhow::Error> {
    let sessions: Arc<dyn SessionService> = match config.session.backend {
        SessionBackend::Memory => Arc::new(InMemorySessionService::new()),
        SessionBackend::Sqlite => Arc::new(SqliteSessionService::open(&config.session.sqlite_path)?),
    };
    let engine = Arc::new(RuleBasedRiskEngine::new(config.engine.clone()));
    Ok(RiskGuardExecutor::new(engine, sessions))
}

/// Run a single request through the executor and return the drained replies.
pub async fn evaluate(executor: &RiskGuardExecutor, request: &RequestContext) -> Vec<Message> {
    let queue = BufferedEventQueue::new();
    executor.execute(request, &queue).await;
    queue.messages().await
}
