use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::Map;
use tracing::{debug, error, info, warn};

use riskguard_engine::{EngineInput, RiskEngine, RISK_CHECK_RESULT};
use riskguard_models::{
    Message, RequestContext, RiskVerdict, PORTFOLIO_STATE_KEY, TRADE_PROPOSAL_KEY,
};
use riskguard_session::{Session, SessionService};

use crate::error::AdapterError;
use crate::queue::EventQueue;

/// Application scope under which the adapter stores its sessions.
pub const APP_NAME: &str = "risk_adapter";
/// Synthetic user identity bound to every engine invocation.
pub const USER_ID: &str = "system_user";

/// Bridges A2A requests onto the risk engine: one request in, exactly one
/// reply message out, queue closed on every path.
pub struct RiskGuardExecutor {
    engine: Arc<dyn RiskEngine>,
    sessions: Arc<dyn SessionService>,
}

impl RiskGuardExecutor {
    pub fn new(engine: Arc<dyn RiskEngine>, sessions: Arc<dyn SessionService>) -> Self {
        Self { engine, sessions }
    }

    /// Run one request to completion. Never returns an error: every failure
    /// is converted into a denial reply, and the queue is closed exactly
    /// once whether or not the reply could be enqueued.
    pub async fn execute(&self, context: &RequestContext, queue: &dyn EventQueue) {
        let verdict = match self.run_request(context).await {
            Ok(verdict) => verdict,
            Err(e) => {
                error!(task_id = ?context.task_id, error = %e, "Risk evaluation request failed");
                e.to_verdict()
            }
        };

        let reply = Message::agent_data(
            verdict.to_value(),
            context.context_id.clone(),
            context.task_id.clone(),
        );
        if let Err(e) = queue.enqueue(reply).await {
            error!(task_id = ?context.task_id, error = %e, "Failed to enqueue reply");
        }
        if let Err(e) = queue.close().await {
            error!(task_id = ?context.task_id, error = %e, "Failed to close outbound queue");
        }
    }

    /// Execution is single-shot and already complete by the time a cancel
    /// could be observed, so there is nothing to interrupt.
    pub async fn cancel(&self, context: &RequestContext, queue: &dyn EventQueue) {
        warn!(
            task_id = ?context.task_id,
            "Cancel called on single-shot risk executor; nothing to do"
        );
        if let Err(e) = queue.close().await {
            error!(task_id = ?context.task_id, error = %e, "Failed to close outbound queue");
        }
    }

    async fn run_request(&self, context: &RequestContext) -> Result<RiskVerdict, AdapterError> {
        // Validation: context id plus a payload carrying both required keys.
        let context_id = context.context_id().ok_or_else(|| {
            AdapterError::InvalidRequest("Context ID is missing, cannot execute".to_string())
        })?;
        let payload = context.data_payload().ok_or_else(|| {
            AdapterError::InvalidRequest("Missing data payload".to_string())
        })?;
        if !payload.contains_key(TRADE_PROPOSAL_KEY) || !payload.contains_key(PORTFOLIO_STATE_KEY) {
            return Err(AdapterError::InvalidRequest(format!(
                "Missing '{TRADE_PROPOSAL_KEY}' or '{PORTFOLIO_STATE_KEY}' in data payload"
            )));
        }

        let session = self.resolve_session(context, context_id).await?;
        let input = EngineInput::from_payload(payload)?;

        let mut stream = self.engine.run(USER_ID, &session.id, input).await?;
        let mut verdict = RiskVerdict::default();
        while let Some(event) = stream.next().await {
            let event = event?;
            if let Some(response) = event.first_function_response() {
                if response.name == RISK_CHECK_RESULT {
                    if let Some(adopted) = RiskVerdict::from_response(&response.response) {
                        verdict = adopted;
                        break;
                    }
                }
            }
        }
        Ok(verdict)
    }

    /// Resolve the session for a context id: lookup first, create on miss.
    /// A failed lookup is logged and treated as a miss; a failed creation is
    /// terminal for the request.
    async fn resolve_session(
        &self,
        context: &RequestContext,
        context_id: &str,
    ) -> Result<Session, AdapterError> {
        info!(task_id = ?context.task_id, context_id, "Resolving session");

        let existing = match self.sessions.get(APP_NAME, USER_ID, context_id).await {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    context_id,
                    error = %e,
                    "Session lookup failed; treating as not found"
                );
                None
            }
        };
        if let Some(session) = existing {
            debug!(context_id, "Found existing session");
            return Ok(session);
        }

        info!(context_id, "Session not found; creating");
        match self
            .sessions
            .create(APP_NAME, USER_ID, context_id, Map::new())
            .await
        {
            Ok(session) => Ok(session),
            Err(e) => {
                error!(context_id, error = %e, "Session creation failed");
                Err(AdapterError::SessionUnavailable(context_id.to_string()))
            }
        }
    }
}
