use super::{TransitionContext, TransitionHandler};
use crate::workflow::error::WorkflowResult;

/// 更新支付日期
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdatePaymentDateHandler;

impl TransitionHandler for UpdatePaymentDateHandler {
    fn handle(&self, ctx: &mut TransitionContext<'_>) -> WorkflowResult<()> {
        ctx.order.payment_date = Some(ctx.now);
        tracing::debug!(
            order_id = ctx.order.id,
            transition = %ctx.transition.name,
            payment_date = %ctx.now,
            "Payment date set"
        );
        Ok(())
    }
}
