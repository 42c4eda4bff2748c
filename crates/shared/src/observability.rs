//! # Observability 基盤
//!
//! トレーシング subscriber の初期化を提供する。
//!
//! 出力形式は `LOG_FORMAT`（`json` / `pretty` / `compact`）、
//! フィルタは `RUST_LOG` で制御する。どちらも未設定なら
//! `pretty` と [`DEFAULT_ENV_FILTER`] を使う。

use std::str::FromStr;

use thiserror::Error;

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_ENV_FILTER: &str = "info,matflow=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 イベント 1 行の JSON（集約基盤向け）
    Json,
    #[default]
    Pretty,
    /// 1 行のテキスト（CI ログ向け）
    Compact,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("未知のログ形式です: {0:?}（json / pretty / compact のいずれか）")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            _ => Err(UnknownLogFormat(s.to_string())),
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub service_name: String,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
        }
    }
}

/// グローバル subscriber を設定する
///
/// `tracing_error::ErrorLayer` を含めるため、インフラ層エラーの `SpanTrace` に
/// 呼び出し経路のスパンが記録される。
///
/// # Errors
///
/// グローバル subscriber が既に設定されている場合
#[cfg(feature = "observability")]
pub fn init_tracing(
    config: &TracingConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_ENV_FILTER));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        format = ?config.log_format,
        "トレーシングを初期化しました"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ログ形式は大文字小文字と前後の空白を無視する() {
        assert_eq!("json".parse(), Ok(LogFormat::Json));
        assert_eq!(" JSON ".parse(), Ok(LogFormat::Json));
        assert_eq!("Compact".parse(), Ok(LogFormat::Compact));
        assert_eq!("pretty".parse(), Ok(LogFormat::Pretty));
    }

    #[test]
    fn test_未知のログ形式はエラー() {
        assert_eq!(
            "yaml".parse::<LogFormat>(),
            Err(UnknownLogFormat("yaml".to_string()))
        );
    }

    #[test]
    fn test_既定のログ形式はpretty() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
