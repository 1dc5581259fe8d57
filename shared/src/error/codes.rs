//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Customer errors
//! - 4xxx: Order / workflow errors
//! - 5xxx: Point errors
//! - 6xxx: Product / stock errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,

    // ==================== 1xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 1001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Requested status is not reachable from the current status
    InvalidTransition = 4002,
    /// Order status master data missing
    OrderStatusNotFound = 4003,
    /// Workflow definition failed validation
    WorkflowDefinitionInvalid = 4004,

    // ==================== 5xxx: Point ====================
    /// A point history entry with the same key already exists
    PointEntryExists = 5001,

    // ==================== 6xxx: Product ====================
    /// Product stock record not found
    ProductNotFound = 6001,
    /// Not enough stock to reserve
    StockInsufficient = 6003,

    // ==================== 9xxx: System ====================
    /// Storage collaborator failed
    PersistenceFailure = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",

            // Customer
            ErrorCode::CustomerNotFound => "Customer not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Order cannot move to the requested status",
            ErrorCode::OrderStatusNotFound => "Order status not found",
            ErrorCode::WorkflowDefinitionInvalid => "Workflow definition is invalid",

            // Point
            ErrorCode::PointEntryExists => "Point history entry already exists",

            // Product
            ErrorCode::ProductNotFound => "Product stock not found",
            ErrorCode::StockInsufficient => "Insufficient stock",

            // System
            ErrorCode::PersistenceFailure => "Persistence failure",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Raised when a u16 does not map to any [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),

            // Customer
            1001 => Ok(ErrorCode::CustomerNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::OrderStatusNotFound),
            4004 => Ok(ErrorCode::WorkflowDefinitionInvalid),

            // Point
            5001 => Ok(ErrorCode::PointEntryExists),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6003 => Ok(ErrorCode::StockInsufficient),

            // System
            9002 => Ok(ErrorCode::PersistenceFailure),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
