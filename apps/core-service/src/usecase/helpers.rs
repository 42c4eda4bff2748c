//! ユースケース層の共通ヘルパー

use std::fmt::Display;

use matflow_infra::InfraError;

use crate::error::CoreError;

/// リポジトリの検索結果 `Result<Option<T>, InfraError>` を `Result<T, CoreError>` にする
pub(crate) trait FindResultExt<T> {
    /// `None` は `NotFound`、`InfraError` は `CoreError` への通常の変換に従う
    fn or_not_found(self, entity: &str, id: &dyn Display) -> Result<T, CoreError>;
}

impl<T> FindResultExt<T> for Result<Option<T>, InfraError> {
    fn or_not_found(self, entity: &str, id: &dyn Display) -> Result<T, CoreError> {
        self?.ok_or_else(|| CoreError::NotFound(format!("{entity}が見つかりません: {id}")))
    }
}
