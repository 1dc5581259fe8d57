use chrono::Duration;
use rust_decimal::Decimal;
use shared::error::AppError;
use std::path::PathBuf;
use std::str::FromStr;

/// 积分配置 - 换算比例、有效期、注册奖励
#[derive(Debug, Clone)]
pub struct PointConfig {
    /// 积分功能开关 (off: point handlers become no-ops)
    pub enabled: bool,
    /// 1 积分 = conversion_rate 货币单位，必须 > 0
    pub conversion_rate: Decimal,
    /// 购物积分有效期 (从下单日期起算)
    pub lifetime: Duration,
    /// 注册奖励积分
    pub entry_point: i64,
    /// 注册奖励有效期 (从发放时刻起算)
    pub entry_lifetime: Duration,
}

impl Default for PointConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            conversion_rate: Decimal::ONE,
            lifetime: Duration::days(365),
            entry_point: 0,
            entry_lifetime: Duration::days(365),
        }
    }
}

/// 服务配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/order-flow | 工作目录 (ledger.redb) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (按天滚动) |
/// | WORKFLOW_PATH | - | 状态机定义 JSON，未设置时使用内置定义 |
/// | POINT_ENABLED | true | 积分开关 |
/// | POINT_CONVERSION_RATE | 1 | 积分换算比例 |
/// | POINT_LIFETIME_DAYS | 365 | 购物积分有效天数 |
/// | ENTRY_POINT | 0 | 注册奖励积分 |
/// | ENTRY_POINT_LIFETIME_DAYS | 365 | 注册奖励有效天数 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/shop POINT_CONVERSION_RATE=1.5 cargo run --bin point-recount
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放 redb 数据文件
    pub work_dir: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 自定义状态机定义文件
    pub workflow_path: Option<PathBuf>,
    pub point: PointConfig,
    /// 无效配置项 (已回退到默认值)，日志初始化后用 [`Config::report_issues`] 输出
    pub issues: Vec<AppError>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (env, .env map, tests)
    ///
    /// Unparseable or out-of-range values fall back to the default and are
    /// recorded in `issues` with [`ErrorCode::ConfigError`](shared::error::ErrorCode).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = PointConfig::default();
        let mut issues = Vec::new();

        let conversion_rate = match lookup("POINT_CONVERSION_RATE") {
            None => defaults.conversion_rate,
            Some(raw) => match Decimal::from_str(raw.trim()) {
                Ok(rate) if rate > Decimal::ZERO => rate,
                _ => {
                    issues.push(AppError::config(
                        "POINT_CONVERSION_RATE",
                        format!("POINT_CONVERSION_RATE must be a positive decimal, got {raw:?}"),
                    ));
                    defaults.conversion_rate
                }
            },
        };

        let enabled = parse_or(&lookup, "POINT_ENABLED", defaults.enabled, &mut issues);
        let lifetime_days: i64 = parse_or(
            &lookup,
            "POINT_LIFETIME_DAYS",
            defaults.lifetime.num_days(),
            &mut issues,
        );
        let entry_point = parse_or(&lookup, "ENTRY_POINT", defaults.entry_point, &mut issues);
        let entry_lifetime_days: i64 = parse_or(
            &lookup,
            "ENTRY_POINT_LIFETIME_DAYS",
            defaults.entry_lifetime.num_days(),
            &mut issues,
        );

        let point = PointConfig {
            enabled,
            conversion_rate,
            lifetime: Duration::days(lifetime_days),
            entry_point,
            entry_lifetime: Duration::days(entry_lifetime_days),
        };

        Self {
            work_dir: lookup("WORK_DIR").unwrap_or_else(|| "/var/lib/order-flow".into()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: lookup("LOG_DIR"),
            workflow_path: lookup("WORKFLOW_PATH").map(PathBuf::from),
            point,
            issues,
        }
    }

    /// Log every recorded config issue at warn level
    pub fn report_issues(&self) {
        for issue in &self.issues {
            tracing::warn!(code = %issue.code, details = ?issue.details, "{}", issue.message);
        }
    }

    /// redb 数据文件路径
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("ledger.redb")
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    issues: &mut Vec<AppError>,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            issues.push(AppError::config(key, format!("{key} has invalid value {raw:?}")));
            default
        }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.work_dir, "/var/lib/order-flow");
        assert_eq!(config.log_level, "info");
        assert!(config.workflow_path.is_none());
        assert!(config.point.enabled);
        assert_eq!(config.point.conversion_rate, Decimal::ONE);
        assert_eq!(config.point.lifetime, Duration::days(365));
        assert_eq!(config.point.entry_point, 0);
        assert!(config.issues.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("WORK_DIR", "/tmp/shop"),
            ("POINT_ENABLED", "false"),
            ("POINT_CONVERSION_RATE", "1.5"),
            ("POINT_LIFETIME_DAYS", "30"),
            ("ENTRY_POINT", "100"),
            ("ENTRY_POINT_LIFETIME_DAYS", "7"),
            ("WORKFLOW_PATH", "/etc/shop/workflow.json"),
        ]);
        assert!(!config.point.enabled);
        assert_eq!(config.point.conversion_rate, Decimal::new(15, 1));
        assert_eq!(config.point.lifetime, Duration::days(30));
        assert_eq!(config.point.entry_point, 100);
        assert_eq!(config.point.entry_lifetime, Duration::days(7));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/shop/ledger.redb"));
        assert_eq!(
            config.workflow_path,
            Some(PathBuf::from("/etc/shop/workflow.json"))
        );
        assert!(config.issues.is_empty());
    }

    #[test]
    fn test_non_positive_rate_falls_back() {
        let config = config_from(&[("POINT_CONVERSION_RATE", "0")]);
        assert_eq!(config.point.conversion_rate, Decimal::ONE);
        assert_eq!(config.issues.len(), 1);
        assert_eq!(config.issues[0].code, ErrorCode::ConfigError);
        assert_eq!(
            config.issues[0].details.as_ref().unwrap().get("key").unwrap(),
            "POINT_CONVERSION_RATE"
        );

        let config = config_from(&[("POINT_CONVERSION_RATE", "abc")]);
        assert_eq!(config.point.conversion_rate, Decimal::ONE);
        assert_eq!(config.issues.len(), 1);
    }

    #[test]
    fn test_invalid_values_recorded_as_issues() {
        let config = config_from(&[
            ("POINT_ENABLED", "yes"),
            ("POINT_LIFETIME_DAYS", "thirty"),
            ("ENTRY_POINT", "50"),
        ]);
        assert!(config.point.enabled);
        assert_eq!(config.point.lifetime, Duration::days(365));
        assert_eq!(config.point.entry_point, 50);

        let keys: Vec<_> = config
            .issues
            .iter()
            .map(|issue| issue.details.as_ref().unwrap()["key"].clone())
            .collect();
        assert_eq!(keys, vec!["POINT_ENABLED", "POINT_LIFETIME_DAYS"]);
        assert!(config.issues.iter().all(|i| i.code == ErrorCode::ConfigError));
    }
}
