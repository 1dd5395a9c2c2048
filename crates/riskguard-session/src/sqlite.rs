use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::SessionError;
use crate::session::{Session, SessionService};

const SESSIONS_TABLE_DDL: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    app_name   TEXT NOT NULL,
    user_id    TEXT NOT NULL,
    id         TEXT NOT NULL,
    state_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (app_name, user_id, id)
);
";

/// SQLite-backed session store. Sessions survive process restarts.
pub struct SqliteSessionService {
    conn: Mutex<Connection>,
}

impl SqliteSessionService {
    pub fn open(path: &str) -> Result<Self, SessionError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SESSIONS_TABLE_DDL)?;
        debug!(path, "Opened session database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database. Useful for testing.
    pub fn open_in_memory() -> Result<Self, SessionError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SESSIONS_TABLE_DDL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl SessionService for SqliteSessionService {
    async fn get(
        &self,
        app_name: &str,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Session>, SessionError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT state_json, created_at FROM sessions \
             WHERE app_name = ?1 AND user_id = ?2 AND id = ?3",
        )?;

        let result = stmt.query_row(rusqlite::params![app_name, user_id, id], |row| {
            let state_json: String = row.get(0)?;
            let created_at: String = row.get(1)?;
            Ok((state_json, created_at))
        });

        match result {
            Ok((state_json, created_at)) => {
                let state: Map<String, Value> = serde_json::from_str(&state_json)?;
                let created_at = created_at
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|_| Utc::now());
                Ok(Some(Session {
                    app_name: app_name.to_string(),
                    user_id: user_id.to_string(),
                    id: id.to_string(),
                    state,
                    created_at,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SessionError::Sqlite(e)),
        }
    }

    async fn create(
        &self,
        app_name: &str,
        user_id: &str,
        id: &str,
        state: Map<String, Value>,
    ) -> Result<Session, SessionError> {
        let session = Session::new(app_name, user_id, id, state);
        let state_json = serde_json::to_string(&session.state)?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO sessions (app_name, user_id, id, state_json, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                session.app_name,
                session.user_id,
                session.id,
                state_json,
                session.created_at.to_rfc3339(),
            ],
        )?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_get() {
        let service = SqliteSessionService::open_in_memory().unwrap();
        let mut state = Map::new();
        state.insert("seen".to_string(), Value::from(true));

        service
            .create("risk_adapter", "system_user", "ctx-1", state)
            .await
            .unwrap();

        let session = service
            .get("risk_adapter", "system_user", "ctx-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.id, "ctx-1");
        assert_eq!(session.state.get("seen"), Some(&Value::from(true)));
    }

    #[tokio::test]
    async fn get_missing() {
        let service = SqliteSessionService::open_in_memory().unwrap();
        let session = service
            .get("risk_adapter", "system_user", "nonexistent")
            .await
            .unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn sessions_persist_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");
        let path = path.to_str().unwrap();

        {
            let service = SqliteSessionService::open(path).unwrap();
            service
                .create("risk_adapter", "system_user", "ctx-1", Map::new())
                .await
                .unwrap();
        }

        let reopened = SqliteSessionService::open(path).unwrap();
        let session = reopened
            .get("risk_adapter", "system_user", "ctx-1")
            .await
            .unwrap();
        assert!(session.is_some());
    }
}
