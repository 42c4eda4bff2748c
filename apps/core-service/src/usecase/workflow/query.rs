//! ワークフローユースケースの読み取り操作

use std::cmp::Reverse;

use itertools::Itertools;
use matflow_domain::{
    value_objects::MaterialId,
    workflow::{MaterialWorkflow, WorkflowState},
};

use super::{MaterialWorkflowUseCaseImpl, OverdueQuery};
use crate::{error::CoreError, usecase::helpers::FindResultExt};

impl MaterialWorkflowUseCaseImpl {
    /// ワークフローを取得する
    ///
    /// ## 戻り値
    ///
    /// - `Ok(workflow)`: 問い合わせ・回答を含む集約全体
    /// - `Err(NotFound)`: 見つからない場合
    pub async fn get_workflow(&self, material_id: &MaterialId) -> Result<MaterialWorkflow, CoreError> {
        self.repo
            .find_by_id(material_id)
            .await
            .or_not_found("ワークフロー", material_id)
    }

    /// 指定状態のワークフロー一覧を取得する（作成日時の昇順）
    pub async fn list_workflows_by_state(
        &self,
        state: WorkflowState,
    ) -> Result<Vec<MaterialWorkflow>, CoreError> {
        Ok(self.repo.find_by_state(state).await?)
    }

    /// 期限超過している未完了のワークフロー一覧（経過日数の降順）
    #[tracing::instrument(skip_all)]
    pub async fn find_overdue_workflows(&self) -> Result<Vec<MaterialWorkflow>, CoreError> {
        let now = self.clock.now();
        let workflows = self.repo.find_all().await?;

        let overdue = workflows
            .into_iter()
            .filter(|w| w.is_overdue(now, &self.sla))
            .sorted_by_key(|w| Reverse(w.days_pending(now)))
            .collect_vec();
        tracing::debug!(count = overdue.len(), "期限超過ワークフローを抽出しました");
        Ok(overdue)
    }

    /// 全ワークフローを横断して期限超過の問い合わせを抽出する
    ///
    /// 経過日数の降順に並べる。同じ経過日数なら高優先度のものを先にする。
    #[tracing::instrument(skip_all)]
    pub async fn find_overdue_queries(&self) -> Result<Vec<OverdueQuery>, CoreError> {
        let now = self.clock.now();
        let workflows = self.repo.find_all().await?;

        let overdue = workflows
            .iter()
            .flat_map(|w| {
                w.queries()
                    .iter()
                    .filter(move |q| q.is_overdue(now, &self.sla))
                    .map(move |q| OverdueQuery {
                        material_id:      w.material_id().clone(),
                        query:            q.clone(),
                        days_open:        q.days_open(now),
                        is_high_priority: q.is_high_priority(now, &self.sla),
                    })
            })
            .sorted_by_key(|o| (Reverse(o.days_open), Reverse(o.is_high_priority)))
            .collect_vec();
        tracing::debug!(count = overdue.len(), "期限超過の問い合わせを抽出しました");
        Ok(overdue)
    }
}
