use super::{TransitionContext, TransitionHandler};
use crate::workflow::error::WorkflowResult;

/// Grant the points the order earned
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitAddPointHandler;

impl TransitionHandler for CommitAddPointHandler {
    fn handle(&self, ctx: &mut TransitionContext<'_>) -> WorkflowResult<()> {
        if ctx.points.is_point_enabled() {
            ctx.points.grant_shipping_points(ctx.order)?;
        }
        Ok(())
    }
}

/// Revoke the earned points
#[derive(Debug, Clone, Copy, Default)]
pub struct RollbackAddPointHandler;

impl TransitionHandler for RollbackAddPointHandler {
    fn handle(&self, ctx: &mut TransitionContext<'_>) -> WorkflowResult<()> {
        if ctx.points.is_point_enabled() {
            ctx.points.revoke_shipping_points(ctx.order)?;
        }
        Ok(())
    }
}
