//! PointAccountingService - 积分换算、消费、发放与重新统计
//!
//! Every mutating operation ends with [`PointAccountingService::recount`]:
//! `Customer.point` is a cache rebuilt from the full ledger, never adjusted
//! incrementally. A failure half way leaves the written entries in place and
//! the next recount brings the cache back in line.

use super::error::{PointError, PointResult};
use super::ledger::PointLedger;
use crate::core::PointConfig;
use crate::db::{CustomerRepository, Persistence};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::models::{
    Customer, NewPointEntry, Order, OrderItem, OrderItemType, PointLedgerEntry, RecordEvent,
    RecordType,
};
use std::sync::Arc;

/// Tag carried by the order line that holds the point discount
pub const POINT_PROCESSOR_NAME: &str = "point_processor";

const POINT_DISCOUNT_LABEL: &str = "Point";

#[derive(Clone)]
pub struct PointAccountingService {
    store: Arc<dyn Persistence>,
    ledger: PointLedger,
    config: PointConfig,
}

impl std::fmt::Debug for PointAccountingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointAccountingService")
            .field("store", &"<Persistence>")
            .field("config", &self.config)
            .finish()
    }
}

impl PointAccountingService {
    pub fn new(store: Arc<dyn Persistence>, config: PointConfig) -> Self {
        let ledger = PointLedger::new(store.clone());
        Self {
            store,
            ledger,
            config,
        }
    }

    pub fn ledger(&self) -> &PointLedger {
        &self.ledger
    }

    pub fn config(&self) -> &PointConfig {
        &self.config
    }

    pub fn is_point_enabled(&self) -> bool {
        self.config.enabled
    }

    // ========== Conversion ==========

    /// Currency value of `point`, truncated toward zero
    pub fn point_to_price(&self, point: i64) -> Decimal {
        (Decimal::from(point) * self.config.conversion_rate).trunc()
    }

    /// Discount line amount for `point` (non-positive)
    pub fn point_to_discount(&self, point: i64) -> Decimal {
        -self.point_to_price(point)
    }

    /// Points worth `amount`, rounded down
    pub fn price_to_point(&self, amount: Decimal) -> i64 {
        amount
            .checked_div(self.config.conversion_rate)
            .and_then(|points| points.floor().to_i64())
            .unwrap_or(0)
    }

    // ========== Order lines ==========

    pub fn add_point_discount_item(&self, order: &mut Order, discount: Decimal) {
        let next_id = order.items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        order.items.push(OrderItem {
            id: next_id,
            product_class_id: None,
            product_name: POINT_DISCOUNT_LABEL.to_string(),
            price: discount,
            quantity: 1,
            item_type: OrderItemType::Point,
            processor_name: Some(POINT_PROCESSOR_NAME.to_string()),
        });
    }

    pub fn remove_point_discount_item(&self, order: &mut Order) {
        order
            .items
            .retain(|item| item.processor_name.as_deref() != Some(POINT_PROCESSOR_NAME));
    }

    // ========== Ledger mutations ==========

    /// Debit `points` for the order's customer, expiring grants first
    ///
    /// Each expiring group is drained in ascending expiration order and the
    /// debit carries the same expiration date as the grant it consumes.
    /// Demand left after all expiring balance is written as one plain USE
    /// entry. Affordability is the caller's concern: the balance may go
    /// negative.
    pub fn consume_points(
        &self,
        order: &Order,
        points: i64,
    ) -> PointResult<Vec<PointLedgerEntry>> {
        let Some(customer_id) = order.customer_id else {
            return Ok(Vec::new());
        };

        let mut written = Vec::new();
        let mut demand = points;

        if demand > 0 {
            for grant in self.ledger.expiring_grants(customer_id)? {
                let take = demand.min(grant.remaining);
                let entry = NewPointEntry::new(
                    customer_id,
                    -take,
                    RecordType::Use,
                    RecordEvent::Shopping,
                )
                .order(Some(order.id))
                .expires_at(Some(grant.expiration_date));
                written.push(self.ledger.append(entry)?);

                demand -= take;
                if demand <= 0 {
                    break;
                }
            }
        }

        if demand > 0 {
            let entry =
                NewPointEntry::new(customer_id, -demand, RecordType::Use, RecordEvent::Shopping)
                    .order(Some(order.id));
            written.push(self.ledger.append(entry)?);
        }

        self.recount(customer_id)?;
        Ok(written)
    }

    /// Credit back points previously consumed by the order
    ///
    /// Nothing is written for `points <= 0`; the balance is still recounted.
    pub fn refund_points(&self, order: &Order, points: i64) -> PointResult<Option<PointLedgerEntry>> {
        let Some(customer_id) = order.customer_id else {
            return Ok(None);
        };
        if points <= 0 {
            self.recount(customer_id)?;
            return Ok(None);
        }

        let entry = NewPointEntry::new(customer_id, points, RecordType::Add, RecordEvent::Shopping)
            .order(Some(order.id));
        let written = self.ledger.append(entry)?;

        self.recount(customer_id)?;
        Ok(Some(written))
    }

    /// Grant the points earned by a shipped order
    ///
    /// Expires `lifetime` after the order date. Guest orders earn nothing.
    pub fn grant_shipping_points(&self, order: &Order) -> PointResult<Option<PointLedgerEntry>> {
        let Some(customer_id) = order.customer_id else {
            return Ok(None);
        };

        let add_point = earned_points(order);
        let written = if add_point != 0 {
            let entry =
                NewPointEntry::new(customer_id, add_point, RecordType::Add, RecordEvent::Shopping)
                    .order(Some(order.id))
                    .expires_at(Some(order.order_date + self.config.lifetime));
            Some(self.ledger.append(entry)?)
        } else {
            None
        };

        self.recount(customer_id)?;
        Ok(written)
    }

    /// Take back the points granted on shipping
    pub fn revoke_shipping_points(&self, order: &Order) -> PointResult<Option<PointLedgerEntry>> {
        let Some(customer_id) = order.customer_id else {
            return Ok(None);
        };

        let add_point = earned_points(order);
        let written = if add_point != 0 {
            let entry = NewPointEntry::new(
                customer_id,
                -add_point,
                RecordType::Use,
                RecordEvent::OrderCancel,
            )
            .order(Some(order.id));
            Some(self.ledger.append(entry)?)
        } else {
            None
        };

        self.recount(customer_id)?;
        Ok(written)
    }

    /// 会员注册奖励积分
    ///
    /// Skipped when points are disabled or no entry bonus is configured.
    pub fn grant_entry_points(&self, customer: &Customer) -> PointResult<Option<PointLedgerEntry>> {
        if !self.config.enabled || self.config.entry_point <= 0 {
            tracing::debug!(customer_id = customer.id, "Entry bonus not configured, skipping");
            return Ok(None);
        }

        let expiration_date = Utc::now() + self.config.entry_lifetime;
        let entry = NewPointEntry::new(
            customer.id,
            self.config.entry_point,
            RecordType::Add,
            RecordEvent::Entry,
        )
        .expires_at(Some(expiration_date));
        let written = self.ledger.append(entry)?;

        self.recount(customer.id)?;
        Ok(Some(written))
    }

    /// 重新统计: rebuild `Customer.point` from the whole ledger and persist it
    pub fn recount(&self, customer_id: i64) -> PointResult<i64> {
        let mut customer = self
            .store
            .find_customer(customer_id)?
            .ok_or(PointError::CustomerNotFound(customer_id))?;

        let balance = self.ledger.current_balance(customer_id)?;
        if customer.point != balance {
            tracing::debug!(
                customer_id,
                cached = customer.point,
                balance,
                "Customer point cache updated"
            );
        }

        customer.point = balance;
        customer.updated_at = shared::util::now_millis();
        self.store.save_customer(&customer)?;
        Ok(balance)
    }
}

fn earned_points(order: &Order) -> i64 {
    order.add_point.trunc().to_i64().unwrap_or(0)
}
