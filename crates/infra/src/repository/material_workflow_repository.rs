//! # MaterialWorkflowRepository
//!
//! マテリアルワークフロー集約の永続化を担当するリポジトリ。
//!
//! 問い合わせ・質問票回答・遷移履歴は集約の一部としてまとめて保存し、
//! 読み込み時も常に完全な集約を返す。
//! 更新は楽観的ロックで保護し、読み込み後に他者が更新していれば競合として拒否する。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use itertools::Itertools;
use matflow_domain::{
    value_objects::{MaterialId, Version},
    workflow::{MaterialWorkflow, WorkflowState},
};

use crate::error::InfraError;

/// マテリアルワークフローリポジトリトレイト
#[async_trait]
pub trait MaterialWorkflowRepository: Send + Sync {
    /// ワークフローを新規登録する
    ///
    /// # 戻り値
    ///
    /// - `Ok(())`: 登録成功
    /// - `Err(InfraError)`: 同じマテリアル ID が既に存在する場合は `Duplicate`
    async fn insert(&self, workflow: &MaterialWorkflow) -> Result<(), InfraError>;

    /// バージョンチェック付きでワークフローを更新する
    ///
    /// 保存済みのバージョンが `expected_version` と一致する場合のみ置き換える。
    ///
    /// # 戻り値
    ///
    /// - `Ok(())`: 更新成功
    /// - `Err(InfraError)`: 未登録なら `NotRegistered`、バージョン不一致なら `VersionMismatch`
    async fn update_with_version_check(
        &self,
        workflow: &MaterialWorkflow,
        expected_version: Version,
    ) -> Result<(), InfraError>;

    /// マテリアル ID でワークフローを取得する
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(workflow))`: 見つかった場合
    /// - `Ok(None)`: 見つからない場合
    async fn find_by_id(&self, id: &MaterialId) -> Result<Option<MaterialWorkflow>, InfraError>;

    /// 指定状態のワークフロー一覧を取得する（作成日時の昇順）
    async fn find_by_state(
        &self,
        state: WorkflowState,
    ) -> Result<Vec<MaterialWorkflow>, InfraError>;

    /// すべてのワークフローを取得する（作成日時の昇順）
    async fn find_all(&self) -> Result<Vec<MaterialWorkflow>, InfraError>;
}

/// インメモリ実装の MaterialWorkflowRepository
///
/// クローンしたインスタンス同士は同じストアを共有する。
#[derive(Debug, Clone, Default)]
pub struct InMemoryMaterialWorkflowRepository {
    workflows: Arc<Mutex<HashMap<MaterialId, MaterialWorkflow>>>,
}

impl InMemoryMaterialWorkflowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<MaterialId, MaterialWorkflow>>, InfraError> {
        self.workflows
            .lock()
            .map_err(|e| InfraError::unexpected(format!("ストアのロック取得に失敗: {e}")))
    }

    fn collect_sorted<'a>(
        workflows: impl Iterator<Item = &'a MaterialWorkflow>,
    ) -> Vec<MaterialWorkflow> {
        workflows
            .sorted_by(|a, b| {
                a.created_at()
                    .cmp(&b.created_at())
                    .then_with(|| a.material_id().as_str().cmp(b.material_id().as_str()))
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MaterialWorkflowRepository for InMemoryMaterialWorkflowRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(material_id = %workflow.material_id()))]
    async fn insert(&self, workflow: &MaterialWorkflow) -> Result<(), InfraError> {
        let mut workflows = self.lock()?;
        if workflows.contains_key(workflow.material_id()) {
            return Err(InfraError::duplicate(workflow.material_id()));
        }
        workflows.insert(workflow.material_id().clone(), workflow.clone());
        Ok(())
    }

    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(material_id = %workflow.material_id(), %expected_version)
    )]
    async fn update_with_version_check(
        &self,
        workflow: &MaterialWorkflow,
        expected_version: Version,
    ) -> Result<(), InfraError> {
        let mut workflows = self.lock()?;
        let Some(stored) = workflows.get_mut(workflow.material_id()) else {
            return Err(InfraError::not_registered(workflow.material_id()));
        };
        if stored.version() != expected_version {
            tracing::debug!(
                stored_version = %stored.version(),
                "バージョン不一致のため更新を拒否"
            );
            return Err(InfraError::version_mismatch(
                workflow.material_id(),
                expected_version,
                stored.version(),
            ));
        }
        *stored = workflow.clone();
        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &MaterialId) -> Result<Option<MaterialWorkflow>, InfraError> {
        Ok(self.lock()?.get(id).cloned())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%state))]
    async fn find_by_state(
        &self,
        state: WorkflowState,
    ) -> Result<Vec<MaterialWorkflow>, InfraError> {
        let workflows = self.lock()?;
        Ok(Self::collect_sorted(
            workflows.values().filter(|w| w.state() == state),
        ))
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<MaterialWorkflow>, InfraError> {
        let workflows = self.lock()?;
        Ok(Self::collect_sorted(workflows.values()))
    }
}
