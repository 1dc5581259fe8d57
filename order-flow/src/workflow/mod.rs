//! 订单工作流
//!
//! - [`definition`]: the status graph as data
//! - [`handlers`]: side effects bound to transitions
//! - [`engine`]: enabled transitions, `can_transition`, `apply`

pub mod definition;
pub mod engine;
pub mod error;
pub mod handlers;

pub use definition::{DefinitionError, HandlerKind, Transition, WorkflowDefinition};
pub use engine::{OrderWorkflowEngine, TransitionEvent, TransitionOutcome};
pub use error::{WorkflowError, WorkflowResult};
pub use handlers::{TransitionAction, TransitionContext, TransitionHandler};

#[cfg(test)]
mod tests;
