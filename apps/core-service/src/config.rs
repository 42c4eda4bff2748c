//! # Core Service 設定
//!
//! 環境変数から Core Service の設定を読み込む。
//!
//! | 環境変数 | 既定値 |
//! |---------|-------|
//! | `SERVICE_NAME` | `matflow-core-service` |
//! | `LOG_FORMAT` | `pretty` |
//! | `QUERY_OVERDUE_DAYS` | 3 |
//! | `QUERY_ESCALATION_DAYS` | 5 |
//! | `QUERY_HIGH_PRIORITY_LEVEL` | 4 |
//! | `WORKFLOW_OVERDUE_DAYS` | 14 |

use std::{env, str::FromStr};

use matflow_domain::{DomainError, sla::SlaPolicy, value_objects::PriorityLevel};
use matflow_shared::observability::{LogFormat, TracingConfig};
use thiserror::Error;

const DEFAULT_SERVICE_NAME: &str = "matflow-core-service";

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 値をパースできない
    #[error("{key} の値が不正です: {value:?}")]
    Invalid { key: &'static str, value: String },

    /// 値は読めたが業務ルール上の範囲外
    #[error("SLA 設定が不正です: {0}")]
    OutOfRange(#[source] DomainError),
}

/// Core Service の設定
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// サービス名（ログ出力用）
    pub service_name: String,
    pub log_format:   LogFormat,
    /// 期限超過・エスカレーションの閾値
    pub sla:          SlaPolicy,
}

impl CoreConfig {
    /// `.env` を読み込んだうえで環境変数から設定を作る
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を読み込む
    ///
    /// 未設定のキーは既定値を使う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = SlaPolicy::default();

        let query_overdue_days = parse_or(
            &lookup,
            "QUERY_OVERDUE_DAYS",
            defaults.query_overdue_days(),
        )?;
        let query_escalation_days = parse_or(
            &lookup,
            "QUERY_ESCALATION_DAYS",
            defaults.query_escalation_days(),
        )?;
        let high_priority_level = parse_or(
            &lookup,
            "QUERY_HIGH_PRIORITY_LEVEL",
            defaults.high_priority_level().as_u8(),
        )?;
        let workflow_overdue_days = parse_or(
            &lookup,
            "WORKFLOW_OVERDUE_DAYS",
            defaults.workflow_overdue_days(),
        )?;

        let high_priority_level =
            PriorityLevel::new(high_priority_level).map_err(ConfigError::OutOfRange)?;
        let sla = SlaPolicy::new(
            query_overdue_days,
            query_escalation_days,
            high_priority_level,
            workflow_overdue_days,
        )
        .map_err(ConfigError::OutOfRange)?;

        Ok(Self {
            service_name: lookup("SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::default())?,
            sla,
        })
    }

    /// トレーシング初期化設定
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig::new(self.service_name.clone(), self.log_format)
    }

    /// ドメインの SLA ポリシー
    pub fn sla_policy(&self) -> SlaPolicy {
        self.sla
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
