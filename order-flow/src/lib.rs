//! Order Flow - 订单生命周期状态机 + 积分账本
//!
//! # 架构概述
//!
//! - **工作流** (`workflow`): 状态图定义、转换处理器、状态机引擎
//! - **积分** (`points`): 只追加的积分账本、换算、FIFO 消费、重新统计
//! - **库存** (`stock`): 转换时的库存预留 / 释放
//! - **数据库** (`db`): 仓储接口 + 嵌入式 redb 实现
//!
//! # 模块结构
//!
//! ```text
//! order-flow/src/
//! ├── core/          # 配置
//! ├── db/            # 仓储接口、redb 存储
//! ├── points/        # PointLedger、PointAccountingService
//! ├── stock/         # StockCompensationProcessor
//! ├── workflow/      # 定义、处理器、引擎
//! ├── utils/         # 日志
//! └── bin/           # point-recount
//! ```

pub mod core;
pub mod db;
pub mod points;
pub mod stock;
pub mod utils;
pub mod workflow;

// Re-export 公共类型
pub use core::{Config, PointConfig};
pub use db::{LedgerStore, Persistence, RepoError};
pub use points::{PointAccountingService, PointError, PointLedger};
pub use stock::{StockCompensationProcessor, StockError};
pub use workflow::{
    OrderWorkflowEngine, TransitionEvent, TransitionOutcome, WorkflowDefinition, WorkflowError,
};
