//! # MatFlow ドメイン層
//!
//! マテリアル質問票ワークフローのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: MaterialWorkflow, Query）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: MaterialId, PriorityLevel）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（永続化、外部サービス）に一切依存しない。
//! 現在時刻も [`clock::Clock`] 経由で注入する。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`sla`] - 期限超過・エスカレーションの閾値
//! - [`value_objects`] - 検証済みの値オブジェクト
//! - [`workflow`] - ワークフロー集約と状態遷移
//!
//! ## 使用例
//!
//! ```rust
//! use matflow_domain::{DomainError, workflow::WorkflowState};
//!
//! let error = DomainError::IllegalTransition {
//!     from: WorkflowState::JvcPending,
//!     to:   WorkflowState::Completed,
//! };
//! assert!(error.to_string().contains("COMPLETED"));
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod sla;
pub mod value_objects;
pub mod workflow;

pub use error::DomainError;
