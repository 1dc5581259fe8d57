//! Point history (ledger) model
//!
//! Entries are immutable. Corrections are made by appending an offsetting
//! entry, never by updating or deleting an existing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a point change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    /// Credit (positive delta)
    Add,
    /// Debit (negative delta)
    Use,
}

/// Business reason for a point change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordEvent {
    /// Points used on, refunded to, or earned by a purchase
    Shopping,
    /// Sign-up bonus
    Entry,
    /// Earned points taken back after a return
    OrderCancel,
}

/// Persisted point history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointLedgerEntry {
    /// Assigned by the store at append time, strictly increasing
    pub id: i64,
    /// Signed delta: positive = credit, negative = debit
    pub point: i64,
    pub customer_id: i64,
    pub order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Only set for expiring grants and the debits netted against them
    pub expiration_date: Option<DateTime<Utc>>,
    pub record_type: RecordType,
    pub record_event: RecordEvent,
}

impl PointLedgerEntry {
    pub fn is_expiring(&self) -> bool {
        self.expiration_date.is_some()
    }
}

/// Entry that has not been written yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPointEntry {
    pub point: i64,
    pub customer_id: i64,
    pub order_id: Option<i64>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub record_type: RecordType,
    pub record_event: RecordEvent,
}

impl NewPointEntry {
    pub fn new(
        customer_id: i64,
        point: i64,
        record_type: RecordType,
        record_event: RecordEvent,
    ) -> Self {
        Self {
            point,
            customer_id,
            order_id: None,
            expiration_date: None,
            record_type,
            record_event,
        }
    }

    pub fn order(mut self, order_id: Option<i64>) -> Self {
        self.order_id = order_id;
        self
    }

    pub fn expires_at(mut self, expiration_date: Option<DateTime<Utc>>) -> Self {
        self.expiration_date = expiration_date;
        self
    }

    /// Freeze into a persisted entry
    pub fn into_entry(self, id: i64, created_at: DateTime<Utc>) -> PointLedgerEntry {
        PointLedgerEntry {
            id,
            point: self.point,
            customer_id: self.customer_id,
            order_id: self.order_id,
            created_at,
            expiration_date: self.expiration_date,
            record_type: self.record_type,
            record_event: self.record_event,
        }
    }
}
