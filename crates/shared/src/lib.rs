//! # MatFlow 共通基盤
//!
//! 各クレートで共通利用するログ基盤を提供する。
//!
//! - [`observability`] - トレーシング初期化（`observability` feature）とログ出力形式
//! - [`event_log`] - ビジネスイベントログの構造化ヘルパー

pub mod event_log;
pub mod observability;
