pub mod file;
pub mod project;
pub mod user;

pub use file::FileRecord;
pub use project::{Project, DEFAULT_PROJECT_NAME};
pub use user::User;
