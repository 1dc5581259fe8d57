//! Database Module
//!
//! Repository contracts plus the embedded redb implementation.

pub mod repository;
pub mod store;

pub use repository::{
    CustomerRepository, OrderRepository, OrderStatusRepository, Persistence,
    PointHistoryRepository, RepoError, RepoResult, StockRepository,
};
pub use store::LedgerStore;
