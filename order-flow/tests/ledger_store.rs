//! 账本持久化测试 - 重新打开 redb 文件后数据仍然完整

use order_flow::db::{
    CustomerRepository, OrderRepository, PointHistoryRepository, StockRepository,
};
use order_flow::{LedgerStore, OrderWorkflowEngine, PointConfig, WorkflowDefinition};
use rust_decimal::Decimal;
use shared::models::{
    Customer, NewPointEntry, Order, OrderItem, OrderStatus, ProductStock, RecordEvent, RecordType,
};
use std::sync::Arc;

fn open_store(dir: &tempfile::TempDir) -> Arc<LedgerStore> {
    Arc::new(LedgerStore::open(dir.path().join("ledger.redb")).unwrap())
}

#[test]
fn test_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let ids = {
        let store = open_store(&dir);
        store.save_customer(&Customer::new(1, "Alice")).unwrap();
        let a = store
            .append_entry(NewPointEntry::new(1, 50, RecordType::Add, RecordEvent::Entry))
            .unwrap();
        let b = store
            .append_entry(NewPointEntry::new(1, -20, RecordType::Use, RecordEvent::Shopping))
            .unwrap();
        vec![a.id, b.id]
    };

    let store = open_store(&dir);
    let entries = store.entries_for_customer(1).unwrap();
    assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), ids);
    assert_eq!(entries.iter().map(|e| e.point).sum::<i64>(), 30);

    // the id sequence continues after reopen
    let c = store
        .append_entry(NewPointEntry::new(1, 5, RecordType::Add, RecordEvent::Shopping))
        .unwrap();
    assert!(c.id > ids[1]);
}

#[test]
fn test_transition_persisted_across_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = open_store(&dir);
        store.seed_default_statuses().unwrap();
        store.save_customer(&Customer::new(1, "Alice")).unwrap();
        store.save_stock(&ProductStock::limited(10, 4)).unwrap();

        let status = OrderStatus::new(OrderStatus::NEW, "New");
        let mut order = Order::new(1, "EC-00001", status, chrono::Utc::now());
        order.customer_id = Some(1);
        order.add_point = Decimal::new(40, 0);
        order
            .items
            .push(OrderItem::product(1, 10, "Matcha", Decimal::new(4000, 0), 1));
        store.save_order(&order).unwrap();

        let engine = OrderWorkflowEngine::new(
            WorkflowDefinition::default(),
            store.clone(),
            PointConfig::default(),
        )
        .unwrap();
        engine.transition_order(1, OrderStatus::PAID).unwrap();
        engine.transition_order(1, OrderStatus::DELIVERED).unwrap();
    }

    let store = open_store(&dir);
    let order = store.find_order(1).unwrap().unwrap();
    assert_eq!(order.status_id(), OrderStatus::DELIVERED);
    assert!(order.payment_date.is_some());
    assert_eq!(store.find_customer(1).unwrap().unwrap().point, 40);
    assert_eq!(store.find_stock(10).unwrap().unwrap().stock, 4);
}
