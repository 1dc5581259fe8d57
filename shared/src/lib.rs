//! Shared types for the order-flow workspace
//!
//! Domain models (orders, statuses, customers, point history, stock),
//! the unified error code system and small utility helpers.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
