//! Webshot Server Library
//!
//! Request handling, configuration and error types for the page snapshot
//! service.

pub mod config;
pub mod error;
pub mod server;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result, WebshotError};
pub use server::{create_router, start_server, ServerState, SharedState};
pub use types::{CaptureRequest, SnapshotPath};
