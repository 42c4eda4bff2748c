//! # マテリアルワークフローユースケース
//!
//! ワークフローの作成・状態遷移・問い合わせ対応・質問票回答を実装する。
//!
//! ## 排他制御
//!
//! 同じマテリアル ID への変更操作は集約ごとの `tokio::sync::Mutex` で直列化し、
//! 保存時はリポジトリの楽観的ロックで他プロセスとの競合を検出する。
//! ロックテーブルのエントリは操作中の ID にだけ存在し、最後の保持者が抜けた時点で消える。
//! 読み込みからドメイン操作・保存までが 1 つの単位として完了するか、何も変更しない。

mod command;
mod query;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use matflow_domain::{
    DomainError,
    clock::{Clock, SystemClock},
    sla::SlaPolicy,
    value_objects::{
        FieldName,
        MaterialId,
        MaterialName,
        PlantCode,
        PriorityLevel,
        QueryQuestion,
        StepNumber,
    },
    workflow::{
        MaterialWorkflow,
        PermissiveTransitionPolicy,
        Query,
        QueryId,
        QueryTeam,
        TransitionPolicy,
    },
};
use matflow_infra::repository::MaterialWorkflowRepository;

use crate::{config::CoreConfig, error::CoreError, usecase::helpers::FindResultExt};

/// ワークフロー作成入力
#[derive(Debug, Clone)]
pub struct CreateWorkflowInput {
    pub material_id:    MaterialId,
    pub material_name:  MaterialName,
    pub assigned_plant: PlantCode,
}

/// 問い合わせ起票入力
#[derive(Debug, Clone)]
pub struct RaiseQueryInput {
    pub question:       QueryQuestion,
    /// 対象の質問票ステップ（任意）
    pub step_number:    Option<StepNumber>,
    /// 対象のフィールド（任意）
    pub field_name:     Option<FieldName>,
    pub assigned_team:  QueryTeam,
    /// 未指定時は既定の優先度
    pub priority_level: Option<PriorityLevel>,
}

/// 問い合わせ起票結果
#[derive(Debug, Clone)]
pub struct RaisedQuery {
    pub query_id: QueryId,
    pub workflow: MaterialWorkflow,
}

/// 質問票回答の入力（下書き保存・確定共通）
#[derive(Debug, Clone)]
pub struct ResponseInput {
    pub step_number: StepNumber,
    pub field_name:  FieldName,
    pub field_value: Option<String>,
    /// 未指定時は `TEXT`
    pub field_type:  Option<String>,
    /// 新規作成時のみ使用する
    pub is_required: bool,
}

/// 期限超過している問い合わせ
#[derive(Debug, Clone)]
pub struct OverdueQuery {
    pub material_id:      MaterialId,
    pub query:            Query,
    pub days_open:        i64,
    pub is_high_priority: bool,
}

type LockTable = Mutex<HashMap<MaterialId, Arc<tokio::sync::Mutex<()>>>>;

/// ロックテーブルの 1 エントリの保持
///
/// 破棄時、他に保持者がいなければテーブルから取り除く。
/// 複製はテーブルのロック下でしか作られないため、参照数の判定と削除の間に割り込まれない。
struct AggregateLock<'a> {
    table:       &'a LockTable,
    material_id: MaterialId,
    mutex:       Arc<tokio::sync::Mutex<()>>,
}

impl Drop for AggregateLock<'_> {
    fn drop(&mut self) {
        let Ok(mut locks) = self.table.lock() else {
            return;
        };
        let is_last_holder = Arc::strong_count(&self.mutex) == 2
            && locks
                .get(&self.material_id)
                .is_some_and(|m| Arc::ptr_eq(m, &self.mutex));
        if is_last_holder {
            locks.remove(&self.material_id);
        }
    }
}

/// マテリアルワークフローユースケース実装
pub struct MaterialWorkflowUseCaseImpl {
    repo:   Arc<dyn MaterialWorkflowRepository>,
    clock:  Arc<dyn Clock>,
    policy: Arc<dyn TransitionPolicy>,
    sla:    SlaPolicy,
    locks:  LockTable,
}

impl MaterialWorkflowUseCaseImpl {
    pub fn new(
        repo: Arc<dyn MaterialWorkflowRepository>,
        clock: Arc<dyn Clock>,
        policy: Arc<dyn TransitionPolicy>,
        sla: SlaPolicy,
    ) -> Self {
        Self {
            repo,
            clock,
            policy,
            sla,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// システム時刻と全操作者許可のポリシーで組み立てる
    pub fn from_config(repo: Arc<dyn MaterialWorkflowRepository>, config: &CoreConfig) -> Self {
        Self::new(
            repo,
            Arc::new(SystemClock),
            Arc::new(PermissiveTransitionPolicy),
            config.sla_policy(),
        )
    }

    pub fn sla(&self) -> SlaPolicy {
        self.sla
    }

    /// 集約ごとの排他ロックを取得する（なければ作る）
    fn aggregate_lock(&self, material_id: &MaterialId) -> Result<AggregateLock<'_>, CoreError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| CoreError::Internal(format!("ロックテーブルの取得に失敗: {e}")))?;
        let mutex = locks.entry(material_id.clone()).or_default().clone();
        Ok(AggregateLock {
            table: &self.locks,
            material_id: material_id.clone(),
            mutex,
        })
    }

    /// 読み込み → ドメイン操作 → バージョンチェック付き保存を 1 単位で行う
    ///
    /// ドメイン操作が失敗した場合は何も保存しない。
    async fn modify<T, F>(
        &self,
        material_id: &MaterialId,
        operation: F,
    ) -> Result<(MaterialWorkflow, T), CoreError>
    where
        F: FnOnce(&mut MaterialWorkflow, DateTime<Utc>) -> Result<T, DomainError> + Send,
        T: Send,
    {
        let lock = self.aggregate_lock(material_id)?;
        let _guard = lock.mutex.lock().await;

        let mut workflow = self
            .repo
            .find_by_id(material_id)
            .await
            .or_not_found("ワークフロー", material_id)?;
        let expected_version = workflow.version();

        let output = operation(&mut workflow, self.clock.now()).map_err(|e| {
            tracing::warn!(%material_id, state = %workflow.state(), error = %e, "ドメイン操作が拒否されました");
            CoreError::from(e)
        })?;

        self.repo
            .update_with_version_check(&workflow, expected_version)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    tracing::warn!(%material_id, %expected_version, "バージョン競合のため保存を中止");
                }
                CoreError::from(e)
            })?;

        Ok((workflow, output))
    }
}
