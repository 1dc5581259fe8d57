//! PointLedger - read surface over the append-only point history
//!
//! Entries are never updated or deleted. Corrections are written as
//! offsetting entries, so every balance below is a pure fold over history.

use super::error::PointResult;
use crate::db::{Persistence, PointHistoryRepository};
use chrono::{DateTime, Utc};
use shared::models::{NewPointEntry, PointLedgerEntry};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Unconsumed remainder of the grants sharing one expiration date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiringGrant {
    pub expiration_date: DateTime<Utc>,
    pub remaining: i64,
}

#[derive(Clone)]
pub struct PointLedger {
    store: Arc<dyn Persistence>,
}

impl std::fmt::Debug for PointLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointLedger")
            .field("store", &"<Persistence>")
            .finish()
    }
}

impl PointLedger {
    pub fn new(store: Arc<dyn Persistence>) -> Self {
        Self { store }
    }

    /// Write one entry; the store assigns id and creation time
    pub fn append(&self, entry: NewPointEntry) -> PointResult<PointLedgerEntry> {
        let stored = self.store.append_entry(entry)?;
        tracing::info!(
            entry_id = stored.id,
            customer_id = stored.customer_id,
            order_id = ?stored.order_id,
            point = stored.point,
            record_type = ?stored.record_type,
            record_event = ?stored.record_event,
            expiration_date = ?stored.expiration_date,
            "Point history entry written"
        );
        Ok(stored)
    }

    /// Full history of one customer, ordered by creation time then id
    pub fn entries(&self, customer_id: i64) -> PointResult<Vec<PointLedgerEntry>> {
        let mut entries = self.store.entries_for_customer(customer_id)?;
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(entries)
    }

    /// Sum of every delta for the customer
    pub fn current_balance(&self, customer_id: i64) -> PointResult<i64> {
        let entries = self.store.entries_for_customer(customer_id)?;
        Ok(entries.iter().map(|e| e.point).sum())
    }

    /// Expiring balances still available, soonest expiration first
    ///
    /// Entries are grouped by their exact expiration date. Grants and the
    /// USE entries tagged with the same date net against each other; only
    /// groups left positive are returned.
    pub fn expiring_grants(&self, customer_id: i64) -> PointResult<Vec<ExpiringGrant>> {
        let entries = self.store.entries_for_customer(customer_id)?;
        Ok(remaining_by_expiration(&entries))
    }
}

fn remaining_by_expiration(entries: &[PointLedgerEntry]) -> Vec<ExpiringGrant> {
    let mut groups: BTreeMap<DateTime<Utc>, i64> = BTreeMap::new();
    for entry in entries {
        if let Some(date) = entry.expiration_date {
            *groups.entry(date).or_insert(0) += entry.point;
        }
    }

    groups
        .into_iter()
        .filter(|(_, remaining)| *remaining > 0)
        .map(|(expiration_date, remaining)| ExpiringGrant {
            expiration_date,
            remaining,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LedgerStore;
    use chrono::{Duration, TimeZone};
    use shared::models::{RecordEvent, RecordType};

    fn create_test_ledger() -> PointLedger {
        PointLedger::new(Arc::new(LedgerStore::open_in_memory().unwrap()))
    }

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, n, 0, 0, 0).unwrap()
    }

    fn expiring(customer_id: i64, point: i64, date: DateTime<Utc>) -> NewPointEntry {
        let record_type = if point >= 0 {
            RecordType::Add
        } else {
            RecordType::Use
        };
        NewPointEntry::new(customer_id, point, record_type, RecordEvent::Shopping)
            .expires_at(Some(date))
    }

    #[test]
    fn test_balance_is_sum_of_deltas() {
        let ledger = create_test_ledger();
        ledger
            .append(NewPointEntry::new(1, 100, RecordType::Add, RecordEvent::Shopping))
            .unwrap();
        ledger
            .append(NewPointEntry::new(1, -30, RecordType::Use, RecordEvent::Shopping))
            .unwrap();
        ledger
            .append(NewPointEntry::new(2, 999, RecordType::Add, RecordEvent::Entry))
            .unwrap();

        assert_eq!(ledger.current_balance(1).unwrap(), 70);
        assert_eq!(ledger.current_balance(2).unwrap(), 999);
        assert_eq!(ledger.current_balance(3).unwrap(), 0);
    }

    #[test]
    fn test_expiring_grants_net_use_entries_by_date() {
        let ledger = create_test_ledger();
        ledger.append(expiring(1, 10, day(5))).unwrap();
        ledger.append(expiring(1, 5, day(1))).unwrap();
        ledger.append(expiring(1, -5, day(1))).unwrap();
        ledger.append(expiring(1, -3, day(5))).unwrap();
        // non-expiring credit does not show up
        ledger
            .append(NewPointEntry::new(1, 50, RecordType::Add, RecordEvent::Shopping))
            .unwrap();

        let grants = ledger.expiring_grants(1).unwrap();
        assert_eq!(
            grants,
            vec![ExpiringGrant {
                expiration_date: day(5),
                remaining: 7
            }]
        );
    }

    #[test]
    fn test_expiring_grants_sorted_ascending() {
        let ledger = create_test_ledger();
        ledger.append(expiring(1, 3, day(9))).unwrap();
        ledger.append(expiring(1, 4, day(2))).unwrap();
        ledger
            .append(expiring(1, 6, day(2) + Duration::hours(1)))
            .unwrap();

        let dates: Vec<_> = ledger
            .expiring_grants(1)
            .unwrap()
            .into_iter()
            .map(|g| g.expiration_date)
            .collect();
        assert_eq!(dates, vec![day(2), day(2) + Duration::hours(1), day(9)]);
    }

    #[test]
    fn test_entries_in_creation_order() {
        let ledger = create_test_ledger();
        let first = ledger
            .append(NewPointEntry::new(4, 1, RecordType::Add, RecordEvent::Shopping))
            .unwrap();
        let second = ledger
            .append(NewPointEntry::new(4, 2, RecordType::Add, RecordEvent::Shopping))
            .unwrap();

        let ids: Vec<_> = ledger.entries(4).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
