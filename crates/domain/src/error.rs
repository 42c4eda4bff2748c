//! # ドメイン層エラー定義
//!
//! ワークフロー集約とその子エンティティが操作を拒否したときのエラー。
//! ユースケース層は種別ごとに `CoreError` へ写像する。
//!
//! ## エラーの種類
//!
//! | エラー種別 | 用途 |
//! |-----------|------|
//! | `Validation` | 入力値の検証失敗、不正な構築 |
//! | `NotFound` | 集約内のエンティティが存在しない |
//! | `Conflict` | 回答キー（ステップ + フィールド）の重複 |
//! | `Forbidden` | 遷移ポリシーによる拒否 |
//! | `IllegalTransition` | 遷移表にない状態遷移 |
//! | `AlreadyResolved` | 解決済み問い合わせの再解決 |
//!
//! ## 使用例
//!
//! ```rust
//! use matflow_domain::{DomainError, workflow::WorkflowState};
//!
//! fn check(from: WorkflowState, to: WorkflowState) -> Result<(), DomainError> {
//!     if !from.can_transition_to(to) {
//!         return Err(DomainError::IllegalTransition { from, to });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(WorkflowState::JvcPending, WorkflowState::Completed).is_err());
//! ```

use thiserror::Error;

use crate::workflow::WorkflowState;

/// ドメイン層で発生するエラー
///
/// ビジネスロジックの実行中に発生する例外状態を表現する。
/// いずれのエラーも発生時点でエンティティは変更されていない。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - 文字数制限の超過
    /// - DB レコードの不変条件違反
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"Query", "QuestionnaireResponse" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 競合エラー
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// 権限エラー
    ///
    /// [`TransitionPolicy`](crate::workflow::TransitionPolicy) が遷移を拒否した場合に使用する。
    #[error("権限がありません: {0}")]
    Forbidden(String),

    /// 不正な状態遷移
    ///
    /// 遷移表にない組み合わせ、および終端状態からの遷移。
    /// 呼び出し元は状態または遷移先を変えずに再試行してはならない。
    #[error("不正な状態遷移です: {from} → {to}")]
    IllegalTransition {
        from: WorkflowState,
        to:   WorkflowState,
    },

    /// 解決済みの問い合わせ
    #[error("問い合わせは既に解決済みです: {query_id}")]
    AlreadyResolved { query_id: String },
}
