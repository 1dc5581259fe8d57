//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Customer errors (1xxx)
    Customer,
    /// Order / workflow errors (4xxx)
    Order,
    /// Point errors (5xxx)
    Point,
    /// Product / stock errors (6xxx)
    Product,
    /// System errors (9xxx and unassigned ranges)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Customer,
            4000..5000 => Self::Order,
            5000..6000 => Self::Point,
            6000..7000 => Self::Product,
            _ => Self::System,
        }
    }
}

impl From<ErrorCode> for ErrorCategory {
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from(ErrorCode::Success), ErrorCategory::General);
        assert_eq!(
            ErrorCategory::from(ErrorCode::CustomerNotFound),
            ErrorCategory::Customer
        );
        assert_eq!(
            ErrorCategory::from(ErrorCode::InvalidTransition),
            ErrorCategory::Order
        );
        assert_eq!(
            ErrorCategory::from(ErrorCode::PointEntryExists),
            ErrorCategory::Point
        );
        assert_eq!(
            ErrorCategory::from(ErrorCode::StockInsufficient),
            ErrorCategory::Product
        );
        assert_eq!(
            ErrorCategory::from(ErrorCode::PersistenceFailure),
            ErrorCategory::System
        );
        assert_eq!(
            ErrorCategory::from(ErrorCode::ConfigError),
            ErrorCategory::System
        );
    }
}
