use super::*;
use crate::core::PointConfig;
use crate::db::{
    CustomerRepository, LedgerStore, OrderRepository, OrderStatusRepository,
    PointHistoryRepository, StockRepository,
};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use shared::models::{
    Customer, NewPointEntry, Order, OrderItem, OrderStatus, ProductStock, RecordEvent, RecordType,
};
use std::sync::Arc;

const CUSTOMER_ID: i64 = 1;
const OPENING_BALANCE: i64 = 100;

/// product class 100: 10 in stock, 2 per order
const TEA: i64 = 100;
/// product class 200: 3 in stock, 1 per order
const CUP: i64 = 200;
/// product class 300: unlimited
const GIFT_CARD: i64 = 300;

const USE_POINT: i64 = 30;

struct TestEnv {
    engine: OrderWorkflowEngine,
    store: Arc<LedgerStore>,
}

fn order_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, 1, 10, 0, 0).unwrap()
}

fn create_test_env() -> TestEnv {
    create_test_env_with(PointConfig::default())
}

fn create_test_env_with(config: PointConfig) -> TestEnv {
    let store = Arc::new(LedgerStore::open_in_memory().unwrap());
    store.seed_default_statuses().unwrap();
    store.save_customer(&Customer::new(CUSTOMER_ID, "Alice")).unwrap();
    store.save_stock(&ProductStock::limited(TEA, 10)).unwrap();
    store.save_stock(&ProductStock::limited(CUP, 3)).unwrap();
    store.save_stock(&ProductStock::unlimited(GIFT_CARD)).unwrap();
    store
        .append_entry(NewPointEntry::new(
            CUSTOMER_ID,
            OPENING_BALANCE,
            RecordType::Add,
            RecordEvent::Shopping,
        ))
        .unwrap();

    let engine =
        OrderWorkflowEngine::new(WorkflowDefinition::default(), store.clone(), config).unwrap();
    engine.points().recount(CUSTOMER_ID).unwrap();

    TestEnv { engine, store }
}

/// Place an order the way the purchase flow leaves it: stock reserved and
/// the spent points already debited
fn create_test_order(env: &TestEnv, id: i64, customer_id: Option<i64>) -> Order {
    let status = env.store.find_status(OrderStatus::NEW).unwrap().unwrap();
    let mut order = Order::new(id, format!("EC-{id:05}"), status, order_date());
    order.customer_id = customer_id;
    order
        .items
        .push(OrderItem::product(1, TEA, "Sencha", Decimal::new(1200, 0), 2));
    order
        .items
        .push(OrderItem::product(2, CUP, "Yunomi", Decimal::new(2500, 0), 1));
    order
        .items
        .push(OrderItem::product(3, GIFT_CARD, "Gift card", Decimal::new(3000, 0), 1));
    order.add_point = Decimal::new(125, 1);

    env.engine.stock().reserve(&order).unwrap();
    if customer_id.is_some() {
        order.use_point = USE_POINT;
        env.engine.points().consume_points(&order, USE_POINT).unwrap();
    }

    env.store.save_order(&order).unwrap();
    order
}

fn stock_of(env: &TestEnv, product_class_id: i64) -> i64 {
    env.store.find_stock(product_class_id).unwrap().unwrap().stock
}

fn cached_point(env: &TestEnv, customer_id: i64) -> i64 {
    env.store.find_customer(customer_id).unwrap().unwrap().point
}

fn ledger_len(env: &TestEnv, customer_id: i64) -> usize {
    env.store.entries_for_customer(customer_id).unwrap().len()
}

fn assert_cache_matches_ledger(env: &TestEnv) {
    for customer_id in env.store.all_customer_ids().unwrap() {
        let sum: i64 = env
            .store
            .entries_for_customer(customer_id)
            .unwrap()
            .iter()
            .map(|e| e.point)
            .sum();
        assert_eq!(
            cached_point(env, customer_id),
            sum,
            "cache drifted for customer {customer_id}"
        );
    }
}
