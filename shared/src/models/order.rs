//! Order Model

use super::order_status::OrderStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order line type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderItemType {
    Product,
    DeliveryFee,
    Charge,
    Discount,
    Tax,
    /// Point discount line (negative price)
    Point,
}

/// Order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    /// Product class (SKU) for product lines, `None` otherwise
    pub product_class_id: Option<i64>,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i64,
    pub item_type: OrderItemType,
    /// Name of the processor that owns this line (e.g. the point discount line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_name: Option<String>,
}

impl OrderItem {
    pub fn product(
        id: i64,
        product_class_id: i64,
        product_name: impl Into<String>,
        price: Decimal,
        quantity: i64,
    ) -> Self {
        Self {
            id,
            product_class_id: Some(product_class_id),
            product_name: product_name.into(),
            price,
            quantity,
            item_type: OrderItemType::Product,
            processor_name: None,
        }
    }

    pub fn is_product(&self) -> bool {
        self.item_type == OrderItemType::Product
    }

    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order aggregate (订单)
///
/// `status` is only changed by the workflow engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_no: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// `None` for guest orders
    pub customer_id: Option<i64>,
    pub payment_date: Option<DateTime<Utc>>,
    pub order_date: DateTime<Utc>,
    /// Points earned by this order, granted on shipment
    #[serde(default)]
    pub add_point: Decimal,
    /// Points spent on this order
    #[serde(default)]
    pub use_point: i64,
}

impl Order {
    pub fn new(
        id: i64,
        order_no: impl Into<String>,
        status: OrderStatus,
        order_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_no: order_no.into(),
            status,
            items: Vec::new(),
            customer_id: None,
            payment_date: None,
            order_date,
            add_point: Decimal::ZERO,
            use_point: 0,
        }
    }

    pub fn status_id(&self) -> i64 {
        self.status.id
    }

    pub fn is_guest(&self) -> bool {
        self.customer_id.is_none()
    }

    pub fn product_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|item| item.is_product())
    }

    /// Sum of all line totals
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::total_price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        let mut order = Order::new(
            1,
            "EC-0001",
            OrderStatus::new(OrderStatus::NEW, "New"),
            Utc::now(),
        );
        order
            .items
            .push(OrderItem::product(1, 10, "Tea", Decimal::new(1200, 0), 2));
        order.items.push(OrderItem {
            id: 2,
            product_class_id: None,
            product_name: "Shipping".to_string(),
            price: Decimal::new(500, 0),
            quantity: 1,
            item_type: OrderItemType::DeliveryFee,
            processor_name: None,
        });
        order
    }

    #[test]
    fn test_product_items_skip_other_lines() {
        let order = sample_order();
        let products: Vec<_> = order.product_items().collect();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_class_id, Some(10));
    }

    #[test]
    fn test_total() {
        assert_eq!(sample_order().total(), Decimal::new(2900, 0));
    }

    #[test]
    fn test_new_order_is_guest() {
        let order = sample_order();
        assert!(order.is_guest());
        assert_eq!(order.status_id(), OrderStatus::NEW);
    }
}
