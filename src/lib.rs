pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod database;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod services;
pub mod telegram;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
