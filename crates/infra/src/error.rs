//! # インフラ層エラー定義
//!
//! ワークフローストアの読み書きで発生するエラー。
//!
//! [`InfraError`] は種別（[`InfraErrorKind`]）と生成時点の [`SpanTrace`] を持つ。
//! 種別のうち `Duplicate` / `NotRegistered` / `VersionMismatch` は
//! 同時更新や重複登録による競合で、ユースケース層はいずれも `Conflict` として扱う。

use std::fmt;

use derive_more::Display;
use matflow_domain::value_objects::{MaterialId, Version};
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// 同じマテリアル ID のワークフローが既に登録されている
    #[error("ワークフローは既に登録されています: {material_id}")]
    Duplicate { material_id: MaterialId },

    /// 更新対象のワークフローが登録されていない
    #[error("更新対象のワークフローが登録されていません: {material_id}")]
    NotRegistered { material_id: MaterialId },

    /// 保存済みのバージョンが読み込み時から進んでいる
    #[error("バージョンが一致しません: {material_id}（期待 {expected}、保存済み {actual}）")]
    VersionMismatch {
        material_id: MaterialId,
        expected:    Version,
        actual:      Version,
    },

    /// 予期しないエラー（ストアのロック破損など）
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    fn capture(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 重複登録・未登録・バージョン不一致のいずれかか
    pub fn is_conflict(&self) -> bool {
        !matches!(self.kind, InfraErrorKind::Unexpected(_))
    }

    pub fn duplicate(material_id: &MaterialId) -> Self {
        Self::capture(InfraErrorKind::Duplicate {
            material_id: material_id.clone(),
        })
    }

    pub fn not_registered(material_id: &MaterialId) -> Self {
        Self::capture(InfraErrorKind::NotRegistered {
            material_id: material_id.clone(),
        })
    }

    pub fn version_mismatch(material_id: &MaterialId, expected: Version, actual: Version) -> Self {
        Self::capture(InfraErrorKind::VersionMismatch {
            material_id: material_id.clone(),
            expected,
            actual,
        })
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Unexpected(msg.into()))
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    fn chem_001() -> MaterialId {
        MaterialId::new("CHEM-001").unwrap()
    }

    #[test]
    fn test_生成時のスパンがspan_traceに記録される() {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("save_workflow", material_id = "CHEM-001");
            let _enter = span.enter();

            let err = InfraError::duplicate(&chem_001());

            let trace = err.span_trace().to_string();
            assert!(trace.contains("save_workflow"), "スパン名を含むこと: {trace}");
        });
    }

    #[test]
    fn test_バージョン不一致のメッセージ() {
        let err = InfraError::version_mismatch(
            &chem_001(),
            Version::new(2).unwrap(),
            Version::new(3).unwrap(),
        );

        assert_eq!(
            err.to_string(),
            "バージョンが一致しません: CHEM-001（期待 v2、保存済み v3）"
        );
    }

    #[test]
    fn test_競合種別の判定() {
        assert!(InfraError::duplicate(&chem_001()).is_conflict());
        assert!(InfraError::not_registered(&chem_001()).is_conflict());
        assert!(
            InfraError::version_mismatch(&chem_001(), Version::initial(), Version::initial().next())
                .is_conflict()
        );
        assert!(!InfraError::unexpected("ロック破損").is_conflict());
    }
}
