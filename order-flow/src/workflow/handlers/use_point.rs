//! 使用积分: points the customer spent on the order
//!
//! Both handlers skip when points are disabled, the order is a guest order
//! or it spent nothing.

use super::{TransitionContext, TransitionHandler};
use crate::workflow::error::WorkflowResult;

fn spent_points(ctx: &TransitionContext<'_>) -> Option<i64> {
    if !ctx.points.is_point_enabled() || ctx.order.customer_id.is_none() {
        return None;
    }
    (ctx.order.use_point > 0).then_some(ctx.order.use_point)
}

/// Debit the spent points again
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitUsePointHandler;

impl TransitionHandler for CommitUsePointHandler {
    fn handle(&self, ctx: &mut TransitionContext<'_>) -> WorkflowResult<()> {
        if let Some(points) = spent_points(ctx) {
            ctx.points.consume_points(ctx.order, points)?;
        }
        Ok(())
    }
}

/// Refund the spent points
#[derive(Debug, Clone, Copy, Default)]
pub struct RollbackUsePointHandler;

impl TransitionHandler for RollbackUsePointHandler {
    fn handle(&self, ctx: &mut TransitionContext<'_>) -> WorkflowResult<()> {
        if let Some(points) = spent_points(ctx) {
            ctx.points.refund_points(ctx.order, points)?;
        }
        Ok(())
    }
}
