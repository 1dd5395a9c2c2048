use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SessionError;

/// Durable conversational context. Identity is `(app_name, user_id, id)`;
/// `id` is the caller's correlation id, so one session is shared by all
/// requests carrying the same `context_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub app_name: String,
    pub user_id: String,
    pub id: String,
    pub state: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        id: impl Into<String>,
        state: Map<String, Value>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            id: id.into(),
            state,
            created_at: Utc::now(),
        }
    }
}

/// Session store contract consumed by the adapter. Implementations must be
/// safe for concurrent use by multiple in-flight requests; serialization of
/// racing requests on the same id is the store's concern.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Look up a session. `Ok(None)` means not found.
    async fn get(
        &self,
        app_name: &str,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Session>, SessionError>;

    /// Create (or replace) a session with the given initial state.
    async fn create(
        &self,
        app_name: &str,
        user_id: &str,
        id: &str,
        state: Map<String, Value>,
    ) -> Result<Session, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_session() {
        let mut state = Map::new();
        state.insert("turns".to_string(), Value::from(3));
        let session = Session::new("risk_adapter", "system_user", "ctx-1", state);

        let json = serde_json::to_string(&session).unwrap();
        let deserialized: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(session, deserialized);
    }
}
