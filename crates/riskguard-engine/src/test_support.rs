//! Test support: scripted engines for exercising the adapter without a
//! real decision runtime. Event sequences are replayed per `run` call and
//! consumption is observable, so tests can assert both what the adapter
//! saw and how far it read.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;

use crate::engine::{EngineEventStream, EngineInput, RiskEngine};
use crate::error::EngineError;
use crate::events::{EngineEvent, RISK_CHECK_RESULT};

/// One scripted stream element.
#[derive(Debug, Clone)]
pub enum ScriptItem {
    Event(EngineEvent),
    Error(String),
}

/// Arguments of one recorded `run` invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub user_id: String,
    pub session_id: String,
    pub input: EngineInput,
}

/// A risk engine that replays a canned event script.
pub struct ScriptedRiskEngine {
    script: Vec<ScriptItem>,
    fail_on_run: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
    events_consumed: Arc<AtomicUsize>,
}

impl ScriptedRiskEngine {
    pub fn new(script: Vec<ScriptItem>) -> Self {
        Self {
            script,
            fail_on_run: None,
            calls: Mutex::new(Vec::new()),
            events_consumed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_events(events: Vec<EngineEvent>) -> Self {
        Self::new(events.into_iter().map(ScriptItem::Event).collect())
    }

    /// An engine that produces a text event followed by the named verdict.
    pub fn with_verdict(response: Value) -> Self {
        Self::from_events(vec![
            EngineEvent::text("analyzing"),
            EngineEvent::function_response(RISK_CHECK_RESULT, response),
        ])
    }

    /// An engine whose `run` call itself fails.
    pub fn failing(reason: &str) -> Self {
        Self {
            script: Vec::new(),
            fail_on_run: Some(reason.to_string()),
            calls: Mutex::new(Vec::new()),
            events_consumed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Total number of stream items handed out across all runs.
    pub fn events_consumed(&self) -> usize {
        self.events_consumed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RiskEngine for ScriptedRiskEngine {
    async fn run(
        &self,
        user_id: &str,
        session_id: &str,
        input: EngineInput,
    ) -> Result<EngineEventStream, EngineError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
                input,
            });

        if let Some(reason) = &self.fail_on_run {
            return Err(EngineError::Internal(reason.clone()));
        }

        let items: VecDeque<ScriptItem> = self.script.iter().cloned().collect();
        let counter = Arc::clone(&self.events_consumed);
        let stream = futures_util::stream::unfold(
            (items, counter),
            |(mut items, counter)| async move {
                let item = items.pop_front()?;
                counter.fetch_add(1, Ordering::SeqCst);
                let result = match item {
                    ScriptItem::Event(event) => Ok(event),
                    ScriptItem::Error(reason) => Err(EngineError::Internal(reason)),
                };
                Some((result, (items, counter)))
            },
        );
        Ok(stream.boxed())
    }
}
