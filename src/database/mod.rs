pub mod manager;
pub mod models;
pub mod schema;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{FileRecord, Project, User, DEFAULT_PROJECT_NAME};
pub use store::{PgProjectStore, ProjectStore};
