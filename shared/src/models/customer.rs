//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity (会员)
///
/// `point` is a cache of the customer's ledger balance. It is only written by
/// a full recount of the point history, never adjusted incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    /// Cached point balance
    #[serde(default)]
    pub point: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Customer {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let now = crate::util::now_millis();
        Self {
            id,
            name: name.into(),
            email: None,
            point: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
