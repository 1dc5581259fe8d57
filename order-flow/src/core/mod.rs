//! 核心配置

pub mod config;

pub use config::{Config, PointConfig};
