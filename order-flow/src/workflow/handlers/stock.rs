use super::{TransitionContext, TransitionHandler};
use crate::workflow::error::WorkflowResult;

/// Re-reserve stock (back_to_in_progress)
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitStockHandler;

impl TransitionHandler for CommitStockHandler {
    fn handle(&self, ctx: &mut TransitionContext<'_>) -> WorkflowResult<()> {
        ctx.stock.reserve(ctx.order)?;
        Ok(())
    }
}

/// Release stock (cancel)
#[derive(Debug, Clone, Copy, Default)]
pub struct RollbackStockHandler;

impl TransitionHandler for RollbackStockHandler {
    fn handle(&self, ctx: &mut TransitionContext<'_>) -> WorkflowResult<()> {
        ctx.stock.release(ctx.order)?;
        Ok(())
    }
}
