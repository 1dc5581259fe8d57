//! redb-based implementation of the repository contracts
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `customers` | `customer_id` | `Customer` | Customer + cached point balance |
//! | `orders` | `order_id` | `Order` | Order aggregate |
//! | `order_statuses` | `status_id` | `OrderStatus` | Status master data |
//! | `point_history` | `(customer_id, entry_id)` | `PointLedgerEntry` | Point ledger (append-only) |
//! | `product_stock` | `product_class_id` | `ProductStock` | Inventory |
//! | `sequence_counter` | name | `u64` | Ledger entry ids |
//!
//! Values are JSON-serialized. The composite point history key keeps one
//! customer's entries contiguous so balance queries are a single range read.
//!
//! # Durability
//!
//! Every write is its own transaction, committed with redb's default
//! immediate durability. Grouping several writes into one unit of work is
//! the caller's concern.

use super::repository::{
    CustomerRepository, OrderRepository, OrderStatusRepository, PointHistoryRepository,
    RepoError, RepoResult, StockRepository,
};
use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    Customer, NewPointEntry, Order, OrderStatus, PointLedgerEntry, ProductStock,
};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

type JsonTable = TableDefinition<'static, i64, &'static [u8]>;

const CUSTOMERS_TABLE: JsonTable = TableDefinition::new("customers");

const ORDERS_TABLE: JsonTable = TableDefinition::new("orders");

const ORDER_STATUS_TABLE: JsonTable = TableDefinition::new("order_statuses");

const PRODUCT_STOCK_TABLE: JsonTable = TableDefinition::new("product_stock");

/// key = (customer_id, entry_id)
const POINT_HISTORY_TABLE: TableDefinition<(i64, i64), &[u8]> =
    TableDefinition::new("point_history");

const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const POINT_HISTORY_SEQ_KEY: &str = "point_history";

macro_rules! impl_database_error {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for RepoError {
                fn from(err: $err) -> Self {
                    RepoError::Database(err.to_string())
                }
            }
        )*
    };
}

impl_database_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Embedded store backed by redb
#[derive(Clone)]
pub struct LedgerStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore").finish_non_exhaustive()
    }
}

impl LedgerStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, embedding)
    pub fn open_in_memory() -> RepoResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> RepoResult<Self> {
        // Create all tables up front so read transactions never miss one
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CUSTOMERS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDER_STATUS_TABLE)?;
            let _ = write_txn.open_table(PRODUCT_STOCK_TABLE)?;
            let _ = write_txn.open_table(POINT_HISTORY_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(POINT_HISTORY_SEQ_KEY)?.is_none() {
                seq_table.insert(POINT_HISTORY_SEQ_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Insert the default order statuses that are not stored yet
    ///
    /// Existing rows are left as they are. Returns how many were added.
    pub fn seed_default_statuses(&self) -> RepoResult<usize> {
        let mut added = 0;
        for status in OrderStatus::defaults() {
            if self.find_status(status.id)?.is_none() {
                self.save_status(&status)?;
                added += 1;
            }
        }
        if added > 0 {
            tracing::info!(added, "Default order statuses seeded");
        }
        Ok(added)
    }

    fn get_json<T: DeserializeOwned>(&self, table: JsonTable, id: i64) -> RepoResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, table: JsonTable, id: i64, value: &T) -> RepoResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(table)?;
            table.insert(id, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl CustomerRepository for LedgerStore {
    fn find_customer(&self, id: i64) -> RepoResult<Option<Customer>> {
        self.get_json(CUSTOMERS_TABLE, id)
    }

    fn save_customer(&self, customer: &Customer) -> RepoResult<()> {
        self.put_json(CUSTOMERS_TABLE, customer.id, customer)
    }
}

impl OrderRepository for LedgerStore {
    fn find_order(&self, id: i64) -> RepoResult<Option<Order>> {
        self.get_json(ORDERS_TABLE, id)
    }

    fn save_order(&self, order: &Order) -> RepoResult<()> {
        self.put_json(ORDERS_TABLE, order.id, order)
    }
}

impl OrderStatusRepository for LedgerStore {
    fn find_status(&self, id: i64) -> RepoResult<Option<OrderStatus>> {
        self.get_json(ORDER_STATUS_TABLE, id)
    }

    fn save_status(&self, status: &OrderStatus) -> RepoResult<()> {
        self.put_json(ORDER_STATUS_TABLE, status.id, status)
    }
}

impl StockRepository for LedgerStore {
    fn find_stock(&self, product_class_id: i64) -> RepoResult<Option<ProductStock>> {
        self.get_json(PRODUCT_STOCK_TABLE, product_class_id)
    }

    fn save_stock(&self, stock: &ProductStock) -> RepoResult<()> {
        self.put_json(PRODUCT_STOCK_TABLE, stock.product_class_id, stock)
    }
}

impl PointHistoryRepository for LedgerStore {
    fn append_entry(&self, entry: NewPointEntry) -> RepoResult<PointLedgerEntry> {
        let txn = self.db.begin_write()?;
        let stored = {
            let mut seq_table = txn.open_table(SEQUENCE_TABLE)?;
            let next = seq_table
                .get(POINT_HISTORY_SEQ_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0)
                + 1;
            seq_table.insert(POINT_HISTORY_SEQ_KEY, next)?;

            let stored = entry.into_entry(next as i64, Utc::now());
            let key = (stored.customer_id, stored.id);

            let mut table = txn.open_table(POINT_HISTORY_TABLE)?;
            if table.get(key)?.is_some() {
                return Err(RepoError::Duplicate(format!(
                    "point history entry {} for customer {}",
                    stored.id, stored.customer_id
                )));
            }
            let value = serde_json::to_vec(&stored)?;
            table.insert(key, value.as_slice())?;
            stored
        };
        txn.commit()?;
        Ok(stored)
    }

    fn entries_for_customer(&self, customer_id: i64) -> RepoResult<Vec<PointLedgerEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(POINT_HISTORY_TABLE)?;

        let mut entries = Vec::new();
        let range_start = (customer_id, i64::MIN);
        let range_end = (customer_id, i64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let entry: PointLedgerEntry = serde_json::from_slice(value.value())?;
            entries.push(entry);
        }

        Ok(entries)
    }

    fn all_customer_ids(&self) -> RepoResult<Vec<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(POINT_HISTORY_TABLE)?;

        let mut ids = BTreeSet::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            let (customer_id, _entry_id) = key.value();
            ids.insert(customer_id);
        }

        Ok(ids.into_iter().collect())
    }
}
