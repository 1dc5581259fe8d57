//! point-recount - 重新统计所有会员的积分余额
//!
//! Rebuilds `Customer.point` from the ledger for every customer with point
//! history. Run it after a crash or an aborted transition left the cache
//! behind the ledger.
//!
//! ```ignore
//! WORK_DIR=/data/shop cargo run --bin point-recount
//! ```

use anyhow::Context;
use order_flow::db::{CustomerRepository, PointHistoryRepository};
use order_flow::utils::logger::init_logger_with_file;
use order_flow::{Config, LedgerStore, PointAccountingService};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config.report_issues();

    // 2. 打开账本
    std::fs::create_dir_all(&config.work_dir)
        .with_context(|| format!("Failed to create work dir {}", config.work_dir))?;
    let db_path = config.db_path();
    let store = Arc::new(
        LedgerStore::open(&db_path)
            .with_context(|| format!("Failed to open ledger at {}", db_path.display()))?,
    );
    tracing::info!(path = %db_path.display(), "Ledger opened");

    // 3. 重新统计
    let service = PointAccountingService::new(store.clone(), config.point.clone());
    let customer_ids = store.all_customer_ids()?;
    let mut corrected = 0usize;
    let mut missing = 0usize;

    for customer_id in &customer_ids {
        let Some(customer) = store.find_customer(*customer_id)? else {
            tracing::warn!(customer_id, "Point history without customer record, skipping");
            missing += 1;
            continue;
        };

        let balance = service
            .recount(customer.id)
            .with_context(|| format!("Recount failed for customer {}", customer.id))?;
        if balance != customer.point {
            tracing::info!(
                customer_id = customer.id,
                cached = customer.point,
                balance,
                "Customer point balance corrected"
            );
            corrected += 1;
        }
    }

    tracing::info!(
        customers = customer_ids.len(),
        corrected,
        missing,
        "Point recount finished"
    );
    println!(
        "recounted {} customers, corrected {}, skipped {}",
        customer_ids.len(),
        corrected,
        missing
    );
    Ok(())
}
