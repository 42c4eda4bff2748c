//! # Core Service エラー定義
//!
//! ユースケース層で発生するエラーと、ドメイン層・インフラ層エラーからの変換を定義する。

use matflow_domain::DomainError;
use matflow_infra::{InfraError, InfraErrorKind};
use thiserror::Error;

/// Core Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 不正なリクエスト（入力不正、遷移表にない遷移など）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 権限不足
    #[error("権限がありません: {0}")]
    Forbidden(String),

    /// 競合（楽観的ロック失敗、重複登録）
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_) | DomainError::IllegalTransition { .. } => {
                Self::BadRequest(err.to_string())
            }
            DomainError::NotFound { .. } => Self::NotFound(err.to_string()),
            DomainError::Conflict(_) | DomainError::AlreadyResolved { .. } => {
                Self::Conflict(err.to_string())
            }
            DomainError::Forbidden(msg) => Self::Forbidden(msg),
        }
    }
}

impl From<InfraError> for CoreError {
    fn from(err: InfraError) -> Self {
        match err.kind() {
            InfraErrorKind::Duplicate { material_id } => {
                Self::Conflict(format!("ワークフローは既に存在します: {material_id}"))
            }
            InfraErrorKind::NotRegistered { .. } | InfraErrorKind::VersionMismatch { .. } => {
                Self::Conflict(
                    "ワークフローは既に更新されています。最新の情報を取得してください。"
                        .to_string(),
                )
            }
            InfraErrorKind::Unexpected(_) => {
                tracing::error!(span_trace = %err.span_trace(), "インフラ層エラー: {err}");
                Self::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use matflow_domain::{
        value_objects::{MaterialId, Version},
        workflow::WorkflowState,
    };
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DomainError::Validation("x".to_string()), "BadRequest")]
    #[case(
        DomainError::IllegalTransition {
            from: WorkflowState::JvcPending,
            to:   WorkflowState::Completed,
        },
        "BadRequest"
    )]
    #[case(
        DomainError::NotFound { entity_type: "Query", id: "q-1".to_string() },
        "NotFound"
    )]
    #[case(DomainError::Conflict("dup".to_string()), "Conflict")]
    #[case(DomainError::AlreadyResolved { query_id: "q-1".to_string() }, "Conflict")]
    #[case(DomainError::Forbidden("no".to_string()), "Forbidden")]
    fn test_ドメインエラーの変換(#[case] err: DomainError, #[case] expected: &str) {
        let actual = match CoreError::from(err) {
            CoreError::NotFound(_) => "NotFound",
            CoreError::BadRequest(_) => "BadRequest",
            CoreError::Forbidden(_) => "Forbidden",
            CoreError::Conflict(_) => "Conflict",
            CoreError::Internal(_) => "Internal",
        };

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_重複登録はconflictに変換される() {
        let id = MaterialId::new("CHEM-001").unwrap();

        let err = CoreError::from(InfraError::duplicate(&id));

        assert!(matches!(err, CoreError::Conflict(msg) if msg.contains("CHEM-001")));
    }

    #[test]
    fn test_バージョン不一致はconflictに変換される() {
        let id = MaterialId::new("CHEM-001").unwrap();

        let err = CoreError::from(InfraError::version_mismatch(
            &id,
            Version::initial(),
            Version::initial().next(),
        ));

        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn test_予期しないインフラエラーはinternalに変換される() {
        let err = CoreError::from(InfraError::unexpected("ロック取得失敗"));

        assert!(matches!(err, CoreError::Internal(msg) if msg.contains("ロック取得失敗")));
    }
}
