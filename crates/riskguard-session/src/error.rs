use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Session state serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}
