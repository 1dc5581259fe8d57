//! Repository Module
//!
//! Narrow persistence contracts consumed by the order-flow core. Each trait
//! covers one entity; [`Persistence`] bundles them so services can hold a
//! single `Arc<dyn Persistence>`.

use shared::models::{
    Customer, NewPointEntry, Order, OrderStatus, PointLedgerEntry, ProductStock,
};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Serialization(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

pub trait CustomerRepository {
    fn find_customer(&self, id: i64) -> RepoResult<Option<Customer>>;
    fn save_customer(&self, customer: &Customer) -> RepoResult<()>;
}

pub trait OrderRepository {
    fn find_order(&self, id: i64) -> RepoResult<Option<Order>>;
    fn save_order(&self, order: &Order) -> RepoResult<()>;
}

pub trait OrderStatusRepository {
    fn find_status(&self, id: i64) -> RepoResult<Option<OrderStatus>>;
    fn save_status(&self, status: &OrderStatus) -> RepoResult<()>;
}

/// Append-only point history
pub trait PointHistoryRepository {
    /// Assign the next entry id, stamp the creation time and write the entry
    fn append_entry(&self, entry: NewPointEntry) -> RepoResult<PointLedgerEntry>;
    /// Every entry of one customer, in id order
    fn entries_for_customer(&self, customer_id: i64) -> RepoResult<Vec<PointLedgerEntry>>;
    /// Customers that have at least one entry
    fn all_customer_ids(&self) -> RepoResult<Vec<i64>>;
}

pub trait StockRepository {
    fn find_stock(&self, product_class_id: i64) -> RepoResult<Option<ProductStock>>;
    fn save_stock(&self, stock: &ProductStock) -> RepoResult<()>;
}

/// Everything the core needs from the storage collaborator
pub trait Persistence:
    CustomerRepository
    + OrderRepository
    + OrderStatusRepository
    + PointHistoryRepository
    + StockRepository
    + Send
    + Sync
{
}

impl<T> Persistence for T where
    T: CustomerRepository
        + OrderRepository
        + OrderStatusRepository
        + PointHistoryRepository
        + StockRepository
        + Send
        + Sync
{
}
