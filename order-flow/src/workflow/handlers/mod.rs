//! Transition handlers
//!
//! Each [`HandlerKind`] resolves to one handler struct. The engine runs them
//! in the order the transition declares, before the new status is committed,
//! so every handler still sees the pre-transition status.

use enum_dispatch::enum_dispatch;

use super::definition::{HandlerKind, Transition};
use super::error::WorkflowResult;
use crate::points::PointAccountingService;
use crate::stock::StockCompensationProcessor;
use chrono::{DateTime, Utc};
use shared::models::Order;

mod add_point;
mod payment_date;
mod stock;
mod use_point;

pub use add_point::{CommitAddPointHandler, RollbackAddPointHandler};
pub use payment_date::UpdatePaymentDateHandler;
pub use stock::{CommitStockHandler, RollbackStockHandler};
pub use use_point::{CommitUsePointHandler, RollbackUsePointHandler};

/// State shared by the handlers of one `apply`
pub struct TransitionContext<'a> {
    pub order: &'a mut Order,
    pub transition: &'a Transition,
    pub points: &'a PointAccountingService,
    pub stock: &'a StockCompensationProcessor,
    /// Single timestamp for the whole transition
    pub now: DateTime<Utc>,
}

#[enum_dispatch]
pub trait TransitionHandler {
    fn handle(&self, ctx: &mut TransitionContext<'_>) -> WorkflowResult<()>;
}

/// TransitionAction enum - static dispatch over the concrete handlers
#[enum_dispatch(TransitionHandler)]
#[derive(Debug, Clone, Copy)]
pub enum TransitionAction {
    UpdatePaymentDate(UpdatePaymentDateHandler),
    CommitStock(CommitStockHandler),
    RollbackStock(RollbackStockHandler),
    CommitUsePoint(CommitUsePointHandler),
    RollbackUsePoint(RollbackUsePointHandler),
    CommitAddPoint(CommitAddPointHandler),
    RollbackAddPoint(RollbackAddPointHandler),
}

/// Handler registry
///
/// This is the ONLY place with a match on HandlerKind.
impl From<HandlerKind> for TransitionAction {
    fn from(kind: HandlerKind) -> Self {
        match kind {
            HandlerKind::UpdatePaymentDate => UpdatePaymentDateHandler.into(),
            HandlerKind::CommitStock => CommitStockHandler.into(),
            HandlerKind::RollbackStock => RollbackStockHandler.into(),
            HandlerKind::CommitUsePoint => CommitUsePointHandler.into(),
            HandlerKind::RollbackUsePoint => RollbackUsePointHandler.into(),
            HandlerKind::CommitAddPoint => CommitAddPointHandler.into(),
            HandlerKind::RollbackAddPoint => RollbackAddPointHandler.into(),
        }
    }
}
