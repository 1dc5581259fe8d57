//! 积分模块
//!
//! - [`PointLedger`]: append-only point history queries
//! - [`PointAccountingService`]: conversion, FIFO consumption, grants and recount

mod error;
mod ledger;
mod service;

pub use error::{PointError, PointResult};
pub use ledger::{ExpiringGrant, PointLedger};
pub use service::{POINT_PROCESSOR_NAME, PointAccountingService};
