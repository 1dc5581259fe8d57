//! 库存补偿 - reserve / release inventory for an order's product lines
//!
//! Quantities are aggregated per product class first, so an order holding
//! the same class on two lines is checked against its combined demand.
//! Unlimited-stock classes are never written.

use crate::db::{Persistence, RepoError, StockRepository};
use shared::models::{Order, ProductStock};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StockError {
    #[error("Insufficient stock for product class {product_class_id}: requested {requested}, available {available}")]
    Insufficient {
        product_class_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Product stock not found: {0}")]
    NotFound(i64),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub type StockResult<T> = Result<T, StockError>;

#[derive(Clone)]
pub struct StockCompensationProcessor {
    store: Arc<dyn Persistence>,
}

impl std::fmt::Debug for StockCompensationProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockCompensationProcessor")
            .field("store", &"<Persistence>")
            .finish()
    }
}

impl StockCompensationProcessor {
    pub fn new(store: Arc<dyn Persistence>) -> Self {
        Self { store }
    }

    /// Take the order's quantities out of stock
    ///
    /// Every class is checked before anything is written, so a failed
    /// reserve leaves inventory untouched.
    pub fn reserve(&self, order: &Order) -> StockResult<()> {
        let stocks = self.load_stocks(order)?;

        for (stock, requested) in &stocks {
            if !stock.stock_unlimited && stock.stock < *requested {
                tracing::warn!(
                    order_id = order.id,
                    product_class_id = stock.product_class_id,
                    requested,
                    available = stock.stock,
                    "Insufficient stock"
                );
                return Err(StockError::Insufficient {
                    product_class_id: stock.product_class_id,
                    requested: *requested,
                    available: stock.stock,
                });
            }
        }

        for (mut stock, requested) in stocks {
            if stock.stock_unlimited {
                continue;
            }
            stock.stock -= requested;
            self.store.save_stock(&stock)?;
            tracing::debug!(
                order_id = order.id,
                product_class_id = stock.product_class_id,
                quantity = requested,
                remaining = stock.stock,
                "Stock reserved"
            );
        }
        Ok(())
    }

    /// Put the order's quantities back
    pub fn release(&self, order: &Order) -> StockResult<()> {
        for (mut stock, quantity) in self.load_stocks(order)? {
            if stock.stock_unlimited {
                continue;
            }
            stock.stock += quantity;
            self.store.save_stock(&stock)?;
            tracing::debug!(
                order_id = order.id,
                product_class_id = stock.product_class_id,
                quantity,
                remaining = stock.stock,
                "Stock released"
            );
        }
        Ok(())
    }

    fn load_stocks(&self, order: &Order) -> StockResult<Vec<(ProductStock, i64)>> {
        let mut quantities: BTreeMap<i64, i64> = BTreeMap::new();
        for item in order.product_items() {
            if let Some(product_class_id) = item.product_class_id {
                *quantities.entry(product_class_id).or_insert(0) += item.quantity;
            }
        }

        quantities
            .into_iter()
            .map(|(product_class_id, quantity)| -> StockResult<(ProductStock, i64)> {
                let stock = self
                    .store
                    .find_stock(product_class_id)?
                    .ok_or(StockError::NotFound(product_class_id))?;
                Ok((stock, quantity))
            })
            .collect()
    }
}
