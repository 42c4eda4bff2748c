//! 問い合わせの起票と解決
//!
//! 起票時は担当チームの状態へ、チームの最後の問い合わせが解決されたら
//! PLANT_PENDING へ、遷移表が許す場合に限りワークフローを自動で進める。

use matflow_domain::{
    DomainError,
    value_objects::{ActorId, MaterialId},
    workflow::{MaterialWorkflow, NewQuery, QueryId, WorkflowState},
};
use matflow_shared::{event_log::event, log_business_event};

use crate::{
    error::CoreError,
    usecase::workflow::{MaterialWorkflowUseCaseImpl, RaiseQueryInput, RaisedQuery},
};

impl MaterialWorkflowUseCaseImpl {
    /// 問い合わせを起票する
    ///
    /// 担当チームの状態への遷移が遷移表で許可されていれば、同時にワークフローを遷移させる。
    /// 遷移がポリシーに拒否された場合は起票も行わない。
    ///
    /// ## エラー
    ///
    /// - 完了済みのワークフローには起票できない（`BadRequest`）
    #[tracing::instrument(
        skip_all,
        fields(%material_id, team = %input.assigned_team, %actor)
    )]
    pub async fn raise_query(
        &self,
        material_id: &MaterialId,
        input: RaiseQueryInput,
        actor: ActorId,
    ) -> Result<RaisedQuery, CoreError> {
        let team = input.assigned_team;
        let (workflow, (query_id, routed_to)) = self
            .modify(material_id, |workflow, now| {
                let query_id = workflow.raise_query(NewQuery {
                    id: QueryId::new(),
                    question: input.question,
                    step_number: input.step_number,
                    field_name: input.field_name,
                    assigned_team: team,
                    priority_level: input.priority_level.unwrap_or_default(),
                    raised_by: actor.clone(),
                    now,
                })?;

                let target = team.corresponding_workflow_state();
                if !workflow.can_transition_to(target) {
                    tracing::debug!(
                        state = %workflow.state(),
                        %target,
                        "担当チームの状態へは遷移できないため現状維持"
                    );
                    return Ok((query_id, None));
                }
                workflow.transition_to_with(self.policy.as_ref(), target, actor.clone(), now)?;
                Ok((query_id, Some(target)))
            })
            .await?;

        if let Some(to) = routed_to {
            tracing::info!(%to, %actor, "問い合わせ起票によりワークフローを遷移しました");
        }
        log_business_event!(
            category: event::category::QUERY,
            action: event::action::QUERY_RAISED,
            entity: event::entity_type::QUERY => query_id,
            actor: actor,
            result: event::result::SUCCESS,
            "問い合わせ起票"
        );

        Ok(RaisedQuery { query_id, workflow })
    }

    /// 問い合わせを解決する
    ///
    /// ワークフローが問い合わせ状態にあり、その担当チームの未解決問い合わせが
    /// これで無くなった場合は PLANT_PENDING に戻す。
    /// 遷移ポリシーが操作者の差し戻しを拒否した場合は、解決だけを記録して状態は変えない。
    ///
    /// ## エラー
    ///
    /// - 問い合わせが見つからない場合は `NotFound`
    /// - 解決済みの場合は `Conflict`
    /// - 回答が空の場合は `BadRequest`
    #[tracing::instrument(skip_all, fields(%material_id, %query_id, %actor))]
    pub async fn resolve_query(
        &self,
        material_id: &MaterialId,
        query_id: &QueryId,
        response: String,
        actor: ActorId,
    ) -> Result<MaterialWorkflow, CoreError> {
        let (workflow, returned) = self
            .modify(material_id, |workflow, now| {
                workflow.resolve_query(query_id, response, actor.clone(), now)?;

                let state = workflow.state();
                let Some(team) = state.query_team() else {
                    return Ok(false);
                };
                if workflow.open_queries_for(team).next().is_some() {
                    tracing::debug!(%team, "担当チームの未解決問い合わせが残っているため現状維持");
                    return Ok(false);
                }
                match workflow.transition_to_with(
                    self.policy.as_ref(),
                    WorkflowState::PlantPending,
                    actor.clone(),
                    now,
                ) {
                    Ok(()) => Ok(true),
                    Err(DomainError::Forbidden(reason)) => {
                        tracing::debug!(%reason, "ポリシーが拒否したため解決のみ記録し現状維持");
                        Ok(false)
                    }
                    Err(e) => Err(e),
                }
            })
            .await?;

        if returned {
            tracing::info!(
                to = %WorkflowState::PlantPending,
                %actor,
                "問い合わせがすべて解決されたためプラントに戻しました"
            );
        }
        log_business_event!(
            category: event::category::QUERY,
            action: event::action::QUERY_RESOLVED,
            entity: event::entity_type::QUERY => query_id,
            actor: actor,
            result: event::result::SUCCESS,
            "問い合わせ解決"
        );

        Ok(workflow)
    }
}
