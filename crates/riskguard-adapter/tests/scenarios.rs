//! End-to-end scenarios for the execution adapter: every request, valid or
//! not, must yield exactly one reply message and exactly one queue close.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use riskguard_adapter::{
    BufferedEventQueue, EventQueue, QueueError, RiskGuardExecutor, APP_NAME, USER_ID,
};
use riskguard_engine::test_support::{ScriptItem, ScriptedRiskEngine};
use riskguard_engine::{EngineEvent, RuleBasedRiskEngine, RISK_CHECK_RESULT};
use riskguard_models::{
    EngineConfig, Message, Part, RequestContext, RiskVerdict, Role, PORTFOLIO_STATE_KEY,
    TRADE_PROPOSAL_KEY,
};
use riskguard_session::{InMemorySessionService, Session, SessionError, SessionService};

fn valid_request(context_id: &str, task_id: &str) -> RequestContext {
    let payload = json!({
        TRADE_PROPOSAL_KEY: {"symbol": "AAPL", "side": "buy", "quantity": "10", "price": "100"},
        PORTFOLIO_STATE_KEY: {"total_value": "100000", "holdings": {}},
    });
    RequestContext {
        context_id: Some(context_id.to_string()),
        task_id: Some(task_id.to_string()),
        message: Some(Message {
            message_id: Uuid::new_v4(),
            role: Role::User,
            parts: vec![Part::data(payload)],
            context_id: Some(context_id.to_string()),
            task_id: Some(task_id.to_string()),
        }),
    }
}

async fn sole_verdict(queue: &BufferedEventQueue) -> RiskVerdict {
    let messages = queue.messages().await;
    assert_eq!(messages.len(), 1, "expected exactly one reply message");
    RiskVerdict::from_response(messages[0].first_data().unwrap()).unwrap()
}

/// Session service wrapper that counts calls and can fail either operation.
struct CountingSessionService {
    inner: InMemorySessionService,
    gets: AtomicUsize,
    creates: AtomicUsize,
    fail_get: bool,
    fail_create: bool,
}

impl CountingSessionService {
    fn new() -> Self {
        Self {
            inner: InMemorySessionService::new(),
            gets: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            fail_get: false,
            fail_create: false,
        }
    }

    fn failing(fail_get: bool, fail_create: bool) -> Self {
        Self {
            fail_get,
            fail_create,
            ..Self::new()
        }
    }
}

#[async_trait]
impl SessionService for CountingSessionService {
    async fn get(
        &self,
        app_name: &str,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Session>, SessionError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_get {
            return Err(SessionError::Unavailable("store offline".to_string()));
        }
        self.inner.get(app_name, user_id, id).await
    }

    async fn create(
        &self,
        app_name: &str,
        user_id: &str,
        id: &str,
        state: Map<String, Value>,
    ) -> Result<Session, SessionError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(SessionError::Unavailable("store offline".to_string()));
        }
        self.inner.create(app_name, user_id, id, state).await
    }
}

/// Queue whose enqueue always fails; close still succeeds and is counted.
#[derive(Default)]
struct FailingQueue {
    close_calls: Mutex<usize>,
}

#[async_trait]
impl EventQueue for FailingQueue {
    async fn enqueue(&self, _message: Message) -> Result<(), QueueError> {
        Err(QueueError::Send("sink rejected message".to_string()))
    }

    async fn close(&self) -> Result<(), QueueError> {
        *self.close_calls.lock().await += 1;
        Ok(())
    }
}

#[tokio::test]
async fn denied_trade_end_to_end() {
    // Fresh session, engine denies with a named reason.
    let engine = Arc::new(ScriptedRiskEngine::with_verdict(json!({
        "approved": false,
        "reason": "exceeds exposure limit",
    })));
    let sessions = Arc::new(CountingSessionService::new());
    let executor = RiskGuardExecutor::new(engine.clone(), sessions.clone());
    let queue = BufferedEventQueue::new();

    executor.execute(&valid_request("s1", "t1"), &queue).await;

    let messages = queue.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].context_id.as_deref(), Some("s1"));
    assert_eq!(messages[0].task_id.as_deref(), Some("t1"));
    let verdict = sole_verdict(&queue).await;
    assert!(!verdict.approved);
    assert_eq!(verdict.reason, "exceeds exposure limit");

    assert_eq!(sessions.creates.load(Ordering::SeqCst), 1);
    assert_eq!(engine.call_count(), 1);
    assert_eq!(queue.close_calls().await, 1);
}

#[tokio::test]
async fn invalid_request_still_sends_one_message_and_closes() {
    let engine = Arc::new(ScriptedRiskEngine::with_verdict(json!({"approved": true})));
    let sessions = Arc::new(CountingSessionService::new());
    let executor = RiskGuardExecutor::new(engine.clone(), sessions.clone());
    let queue = BufferedEventQueue::new();

    executor.execute(&RequestContext::default(), &queue).await;

    let verdict = sole_verdict(&queue).await;
    assert!(!verdict.approved);
    assert_eq!(queue.close_calls().await, 1);
    assert_eq!(engine.call_count(), 0);
    // Validation failures never reach the store.
    assert_eq!(sessions.gets.load(Ordering::SeqCst), 0);
    assert_eq!(sessions.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn session_reused_across_requests_with_same_context() {
    let engine = Arc::new(ScriptedRiskEngine::with_verdict(json!({
        "approved": true,
        "reason": "ok",
    })));
    let sessions = Arc::new(CountingSessionService::new());
    let executor = RiskGuardExecutor::new(engine.clone(), sessions.clone());

    for task in ["t1", "t2"] {
        let queue = BufferedEventQueue::new();
        executor.execute(&valid_request("shared-ctx", task), &queue).await;
        assert_eq!(queue.messages().await.len(), 1);
    }

    // One creation on first miss, a lookup for each request.
    assert_eq!(sessions.creates.load(Ordering::SeqCst), 1);
    assert_eq!(sessions.gets.load(Ordering::SeqCst), 2);
    assert_eq!(engine.call_count(), 2);
}

#[tokio::test]
async fn lookup_failure_is_masked_and_session_created() {
    let engine = Arc::new(ScriptedRiskEngine::with_verdict(json!({
        "approved": true,
        "reason": "ok",
    })));
    let sessions = Arc::new(CountingSessionService::failing(true, false));
    let executor = RiskGuardExecutor::new(engine.clone(), sessions.clone());
    let queue = BufferedEventQueue::new();

    executor.execute(&valid_request("s1", "t1"), &queue).await;

    let verdict = sole_verdict(&queue).await;
    assert!(verdict.approved, "get failure must degrade to a miss");
    assert_eq!(sessions.creates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn session_unavailable_when_both_operations_fail() {
    let engine = Arc::new(ScriptedRiskEngine::with_verdict(json!({"approved": true})));
    let sessions = Arc::new(CountingSessionService::failing(true, true));
    let executor = RiskGuardExecutor::new(engine.clone(), sessions);
    let queue = BufferedEventQueue::new();

    executor.execute(&valid_request("s1", "t1"), &queue).await;

    let verdict = sole_verdict(&queue).await;
    assert!(!verdict.approved);
    assert!(verdict.reason.contains("session"));
    assert_eq!(engine.call_count(), 0);
    assert_eq!(queue.close_calls().await, 1);
}

#[tokio::test]
async fn engine_run_failure_yields_error_reply_and_closed_queue() {
    let engine = Arc::new(ScriptedRiskEngine::failing("model backend unreachable"));
    let executor =
        RiskGuardExecutor::new(engine.clone(), Arc::new(InMemorySessionService::new()));
    let queue = BufferedEventQueue::new();

    executor.execute(&valid_request("s1", "t1"), &queue).await;

    let verdict = sole_verdict(&queue).await;
    assert!(!verdict.approved);
    assert!(verdict.reason.contains("An internal error occurred"));
    assert!(verdict.reason.contains("model backend unreachable"));
    assert_eq!(queue.close_calls().await, 1);
}

#[tokio::test]
async fn mid_stream_failure_yields_error_reply() {
    let engine = Arc::new(ScriptedRiskEngine::new(vec![
        ScriptItem::Event(EngineEvent::text("starting")),
        ScriptItem::Error("stream broke".to_string()),
        ScriptItem::Event(EngineEvent::function_response(
            RISK_CHECK_RESULT,
            json!({"approved": true}),
        )),
    ]));
    let executor =
        RiskGuardExecutor::new(engine, Arc::new(InMemorySessionService::new()));
    let queue = BufferedEventQueue::new();

    executor.execute(&valid_request("s1", "t1"), &queue).await;

    let verdict = sole_verdict(&queue).await;
    assert!(!verdict.approved);
    assert!(verdict.reason.contains("stream broke"));
    assert_eq!(queue.close_calls().await, 1);
}

#[tokio::test]
async fn rule_engine_overflow_yields_error_reply_and_closed_queue() {
    // quantity * price has no Decimal representation; the failure must
    // surface as a denial reply, not a panic.
    let payload = json!({
        TRADE_PROPOSAL_KEY: {
            "symbol": "AAPL",
            "side": "buy",
            "quantity": "79228162514264337593543950335",
            "price": "2",
        },
        PORTFOLIO_STATE_KEY: {"total_value": "100000", "holdings": {}},
    });
    let request = RequestContext {
        context_id: Some("s1".to_string()),
        task_id: Some("t1".to_string()),
        message: Some(Message {
            message_id: Uuid::new_v4(),
            role: Role::User,
            parts: vec![Part::data(payload)],
            context_id: Some("s1".to_string()),
            task_id: Some("t1".to_string()),
        }),
    };

    let engine = Arc::new(RuleBasedRiskEngine::new(EngineConfig::default()));
    let executor = RiskGuardExecutor::new(engine, Arc::new(InMemorySessionService::new()));
    let queue = BufferedEventQueue::new();

    executor.execute(&request, &queue).await;

    let verdict = sole_verdict(&queue).await;
    assert!(!verdict.approved);
    assert!(verdict.reason.contains("An internal error occurred"));
    assert_eq!(queue.close_calls().await, 1);
}

#[tokio::test]
async fn queue_closed_even_when_enqueue_fails() {
    let engine = Arc::new(ScriptedRiskEngine::with_verdict(json!({"approved": true})));
    let executor =
        RiskGuardExecutor::new(engine, Arc::new(InMemorySessionService::new()));
    let queue = FailingQueue::default();

    executor.execute(&valid_request("s1", "t1"), &queue).await;

    assert_eq!(*queue.close_calls.lock().await, 1);
}

#[tokio::test]
async fn session_identity_uses_adapter_scope() {
    let engine = Arc::new(ScriptedRiskEngine::with_verdict(json!({
        "approved": true,
        "reason": "ok",
    })));
    let sessions = Arc::new(InMemorySessionService::new());
    let executor = RiskGuardExecutor::new(engine, sessions.clone());
    let queue = BufferedEventQueue::new();

    executor.execute(&valid_request("ctx-42", "t1"), &queue).await;

    let session = sessions.get(APP_NAME, USER_ID, "ctx-42").await.unwrap();
    assert!(session.is_some());
    assert!(session.unwrap().state.is_empty());
}
