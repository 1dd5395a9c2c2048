pub mod error;
pub mod memory;
pub mod session;
pub mod sqlite;

pub use error::SessionError;
pub use memory::InMemorySessionService;
pub use session::{Session, SessionService};
pub use sqlite::SqliteSessionService;
