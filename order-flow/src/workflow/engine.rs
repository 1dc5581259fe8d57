//! OrderWorkflowEngine - 订单状态机
//!
//! # Apply Flow
//!
//! ```text
//! apply(order, target)
//!     ├─ 1. Find the enabled transition targeting `target`
//!     ├─ 2. Resolve the target OrderStatus
//!     ├─ 3. Run handlers in declaration order (status unchanged)
//!     ├─ 4. Commit status + save order
//!     └─ 5. Broadcast TransitionEvent
//! ```
//!
//! Steps 1 and 2 fail before anything is touched. If the save in step 4
//! fails, the caller's order still carries its old status. A handler failure in
//! step 3 stops the chain; handlers that already ran are not undone and the
//! ledger cache is repaired by the next recount.

use super::definition::{HandlerKind, Transition, WorkflowDefinition};
use super::error::{WorkflowError, WorkflowResult};
use super::handlers::{TransitionAction, TransitionContext, TransitionHandler};
use crate::core::{Config, PointConfig};
use crate::db::{OrderRepository, OrderStatusRepository, Persistence};
use crate::points::PointAccountingService;
use crate::stock::StockCompensationProcessor;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::models::Order;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Emitted after a transition is committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub event_id: String,
    pub order_id: i64,
    pub transition: String,
    pub from: i64,
    pub to: i64,
    /// Unix millis
    pub occurred_at: i64,
}

/// Result of a committed transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub transition: String,
    pub from: i64,
    pub to: i64,
    pub handlers_run: Vec<HandlerKind>,
}

pub struct OrderWorkflowEngine {
    definition: WorkflowDefinition,
    store: Arc<dyn Persistence>,
    points: PointAccountingService,
    stock: StockCompensationProcessor,
    event_tx: broadcast::Sender<TransitionEvent>,
}

impl std::fmt::Debug for OrderWorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderWorkflowEngine")
            .field("transitions", &self.definition.transitions.len())
            .field("store", &"<Persistence>")
            .field("event_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl OrderWorkflowEngine {
    /// Create an engine over a validated definition
    pub fn new(
        definition: WorkflowDefinition,
        store: Arc<dyn Persistence>,
        point_config: PointConfig,
    ) -> WorkflowResult<Self> {
        definition.validate()?;

        let points = PointAccountingService::new(store.clone(), point_config);
        let stock = StockCompensationProcessor::new(store.clone());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            places = definition.places.len(),
            transitions = definition.transitions.len(),
            point_enabled = points.is_point_enabled(),
            "OrderWorkflowEngine started"
        );

        Ok(Self {
            definition,
            store,
            points,
            stock,
            event_tx,
        })
    }

    /// Create from config: `workflow_path` if set, otherwise the built-in graph
    pub fn from_config(config: &Config, store: Arc<dyn Persistence>) -> WorkflowResult<Self> {
        let definition = match &config.workflow_path {
            Some(path) => WorkflowDefinition::load(path)?,
            None => WorkflowDefinition::default(),
        };
        Self::new(definition, store, config.point.clone())
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    pub fn points(&self) -> &PointAccountingService {
        &self.points
    }

    pub fn stock(&self) -> &StockCompensationProcessor {
        &self.stock
    }

    /// Subscribe to transition events
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.event_tx.subscribe()
    }

    // ========== Queries ==========

    /// Every transition whose source set contains the order's status
    pub fn enabled_transitions(&self, order: &Order) -> Vec<&Transition> {
        self.definition.transitions_from(order.status_id()).collect()
    }

    pub fn can_transition(&self, order: &Order, target: i64) -> bool {
        self.find_transition(order, target).is_some()
    }

    fn find_transition(&self, order: &Order, target: i64) -> Option<&Transition> {
        self.definition
            .transitions_from(order.status_id())
            .find(|t| t.to == target)
    }

    // ========== Apply ==========

    /// Move `order` to `target`, running the transition's handlers first
    pub fn apply(&self, order: &mut Order, target: i64) -> WorkflowResult<TransitionOutcome> {
        let from = order.status_id();
        let transition =
            self.find_transition(order, target)
                .ok_or(WorkflowError::InvalidTransition {
                    order_id: order.id,
                    from,
                    to: target,
                })?;

        let status = self
            .store
            .find_status(target)?
            .ok_or(WorkflowError::StatusNotFound(target))?;

        let mut ctx = TransitionContext {
            order: &mut *order,
            transition,
            points: &self.points,
            stock: &self.stock,
            now: Utc::now(),
        };

        let mut handlers_run = Vec::with_capacity(transition.handlers.len());
        for kind in &transition.handlers {
            tracing::debug!(
                order_id = ctx.order.id,
                transition = %transition.name,
                handler = %kind,
                "Running transition handler"
            );
            let action = TransitionAction::from(*kind);
            if let Err(e) = action.handle(&mut ctx) {
                tracing::warn!(
                    order_id = ctx.order.id,
                    transition = %transition.name,
                    handler = %kind,
                    error = %e,
                    "Transition handler failed, status not committed"
                );
                return Err(e);
            }
            handlers_run.push(*kind);
        }

        let mut committed = order.clone();
        committed.status = status;
        self.store.save_order(&committed)?;
        *order = committed;

        tracing::info!(
            order_id = order.id,
            order_no = %order.order_no,
            transition = %transition.name,
            from,
            to = target,
            "Order transition committed"
        );

        self.broadcast(TransitionEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            order_id: order.id,
            transition: transition.name.clone(),
            from,
            to: target,
            occurred_at: shared::util::now_millis(),
        });

        Ok(TransitionOutcome {
            transition: transition.name.clone(),
            from,
            to: target,
            handlers_run,
        })
    }

    /// Load the order, apply the transition and return the updated order
    pub fn transition_order(
        &self,
        order_id: i64,
        target: i64,
    ) -> WorkflowResult<(Order, TransitionOutcome)> {
        let mut order = self
            .store
            .find_order(order_id)?
            .ok_or(WorkflowError::OrderNotFound(order_id))?;
        let outcome = self.apply(&mut order, target)?;
        Ok((order, outcome))
    }

    fn broadcast(&self, event: TransitionEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("Transition event not broadcast: no active receivers");
        }
    }
}
