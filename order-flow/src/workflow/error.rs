use super::definition::DefinitionError;
use crate::db::RepoError;
use crate::points::PointError;
use crate::stock::StockError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Workflow errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Order {order_id} cannot move from status {from} to {to}")]
    InvalidTransition { order_id: i64, from: i64, to: i64 },

    #[error("Order status not found: {0}")]
    StatusNotFound(i64),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),

    #[error("Insufficient stock for product class {product_class_id}: requested {requested}, available {available}")]
    StockInsufficient {
        product_class_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Product stock not found: {0}")]
    StockNotFound(i64),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] RepoError),

    #[error("Workflow definition error: {0}")]
    Definition(#[from] DefinitionError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

impl From<PointError> for WorkflowError {
    fn from(err: PointError) -> Self {
        match err {
            PointError::Repo(e) => WorkflowError::Persistence(e),
            PointError::CustomerNotFound(id) => WorkflowError::CustomerNotFound(id),
        }
    }
}

impl From<StockError> for WorkflowError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Insufficient {
                product_class_id,
                requested,
                available,
            } => WorkflowError::StockInsufficient {
                product_class_id,
                requested,
                available,
            },
            StockError::NotFound(id) => WorkflowError::StockNotFound(id),
            StockError::Repo(e) => WorkflowError::Persistence(e),
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err {
            WorkflowError::InvalidTransition { order_id, from, to } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
                    .with_detail("order_id", order_id)
                    .with_detail("from", from)
                    .with_detail("to", to)
            }
            WorkflowError::StatusNotFound(id) => {
                AppError::with_message(ErrorCode::OrderStatusNotFound, message)
                    .with_detail("status_id", id)
            }
            WorkflowError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message)
                    .with_detail("order_id", id)
            }
            WorkflowError::CustomerNotFound(id) => {
                AppError::with_message(ErrorCode::CustomerNotFound, message)
                    .with_detail("customer_id", id)
            }
            WorkflowError::StockInsufficient {
                product_class_id,
                requested,
                available,
            } => AppError::with_message(ErrorCode::StockInsufficient, message)
                .with_detail("product_class_id", product_class_id)
                .with_detail("requested", requested)
                .with_detail("available", available),
            WorkflowError::StockNotFound(id) => {
                AppError::with_message(ErrorCode::ProductNotFound, message)
                    .with_detail("product_class_id", id)
            }
            WorkflowError::Persistence(RepoError::Duplicate(_)) => {
                AppError::with_message(ErrorCode::PointEntryExists, message)
            }
            WorkflowError::Persistence(e) => {
                tracing::error!(error = %e, "Persistence failure");
                AppError::persistence(message)
            }
            WorkflowError::Definition(_) => {
                AppError::with_message(ErrorCode::WorkflowDefinitionInvalid, message)
            }
        }
    }
}
