//! Order status master data

use serde::{Deserialize, Serialize};

/// Order status (订单状态)
///
/// Statuses are master data: the set is configured externally and the
/// workflow graph refers to them by `id` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderStatus {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sort_no: i32,
}

impl OrderStatus {
    pub const NEW: i64 = 1;
    pub const CANCEL: i64 = 3;
    pub const IN_PROGRESS: i64 = 4;
    pub const DELIVERED: i64 = 5;
    pub const PAID: i64 = 6;
    pub const PENDING: i64 = 7;
    pub const PROCESSING: i64 = 8;
    pub const RETURNED: i64 = 9;

    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sort_no: 0,
        }
    }

    /// Default master data, in display order
    pub fn defaults() -> Vec<OrderStatus> {
        [
            (Self::NEW, "New"),
            (Self::PAID, "Paid"),
            (Self::IN_PROGRESS, "In progress"),
            (Self::DELIVERED, "Shipped"),
            (Self::CANCEL, "Cancelled"),
            (Self::RETURNED, "Returned"),
            (Self::PENDING, "Pending"),
            (Self::PROCESSING, "Processing"),
        ]
        .into_iter()
        .enumerate()
        .map(|(sort_no, (id, name))| OrderStatus {
            id,
            name: name.to_string(),
            sort_no: sort_no as i32,
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_unique_ids() {
        let defaults = OrderStatus::defaults();
        let mut ids: Vec<i64> = defaults.iter().map(|s| s.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), defaults.len());
        assert_eq!(defaults[0].id, OrderStatus::NEW);
        assert_eq!(defaults[0].sort_no, 0);
    }
}
