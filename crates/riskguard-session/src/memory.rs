use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::SessionError;
use crate::session::{Session, SessionService};

/// In-memory session store. Sessions live for the life of the process.
#[derive(Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<(String, String, String), Session>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn get(
        &self,
        app_name: &str,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.read().await;
        let key = (
            app_name.to_string(),
            user_id.to_string(),
            id.to_string(),
        );
        Ok(sessions.get(&key).cloned())
    }

    async fn create(
        &self,
        app_name: &str,
        user_id: &str,
        id: &str,
        state: Map<String, Value>,
    ) -> Result<Session, SessionError> {
        let session = Session::new(app_name, user_id, id, state);
        let key = (
            app_name.to_string(),
            user_id.to_string(),
            id.to_string(),
        );
        self.sessions.write().await.insert(key, session.clone());
        Ok(session)
    }
}
