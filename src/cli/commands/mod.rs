pub mod schema;
pub mod secret;
pub mod user;
pub mod webhook;
