//! # MatFlow インフラ層
//!
//! ドメイン層で扱う集約の永続化を担当する。
//!
//! ## モジュール構成
//!
//! - [`error`] - インフラ層エラー（SpanTrace 付き）
//! - [`repository`] - リポジトリトレイトとインメモリ実装

pub mod error;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
