use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use riskguard_models::Message;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Queue is closed")]
    Closed,

    #[error("Queue send failed: {0}")]
    Send(String),
}

/// Append-only outbound sink. The adapter enqueues exactly one message and
/// closes the queue exactly once per request; there is no signaling back.
#[async_trait]
pub trait EventQueue: Send + Sync {
    async fn enqueue(&self, message: Message) -> Result<(), QueueError>;
    async fn close(&self) -> Result<(), QueueError>;
}

#[derive(Default)]
struct BufferedState {
    messages: Vec<Message>,
    close_calls: usize,
}

/// An in-memory queue that buffers replies for the caller to drain. Used by
/// the CLI and by tests; a transport would provide its own implementation.
#[derive(Default)]
pub struct BufferedEventQueue {
    state: Mutex<BufferedState>,
}

impl BufferedEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.close_calls > 0
    }

    /// How many times `close` was called. The adapter contract is exactly one.
    pub async fn close_calls(&self) -> usize {
        self.state.lock().await.close_calls
    }
}

#[async_trait]
impl EventQueue for BufferedEventQueue {
    async fn enqueue(&self, message: Message) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        if state.close_calls > 0 {
            return Err(QueueError::Closed);
        }
        state.messages.push(message);
        Ok(())
    }

    async fn close(&self) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state.close_calls += 1;
        Ok(())
    }
}
