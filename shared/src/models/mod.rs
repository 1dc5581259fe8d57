//! Data models
//!
//! Entities owned by the persistence layer and passed to the order-flow core
//! by reference for the duration of one operation. All IDs are `i64`.

pub mod customer;
pub mod order;
pub mod order_status;
pub mod point_history;
pub mod product_stock;

// Re-exports
pub use customer::*;
pub use order::*;
pub use order_status::*;
pub use point_history::*;
pub use product_stock::*;
