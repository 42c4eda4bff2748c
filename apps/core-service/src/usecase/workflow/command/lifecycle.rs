//! ワークフローの作成と状態遷移

use matflow_domain::{
    value_objects::{ActorId, MaterialId},
    workflow::{MaterialWorkflow, NewMaterialWorkflow, WorkflowState},
};
use matflow_shared::{event_log::event, log_business_event};

use crate::{
    error::CoreError,
    usecase::workflow::{CreateWorkflowInput, MaterialWorkflowUseCaseImpl},
};

impl MaterialWorkflowUseCaseImpl {
    /// ワークフローを作成する（初期状態: JVC_PENDING）
    ///
    /// ## エラー
    ///
    /// - 同じマテリアル ID のワークフローが既に存在する場合は `Conflict`
    #[tracing::instrument(skip_all, fields(material_id = %input.material_id, %actor))]
    pub async fn create_workflow(
        &self,
        input: CreateWorkflowInput,
        actor: ActorId,
    ) -> Result<MaterialWorkflow, CoreError> {
        let workflow = MaterialWorkflow::new(NewMaterialWorkflow {
            material_id: input.material_id,
            material_name: input.material_name,
            assigned_plant: input.assigned_plant,
            initiated_by: actor,
            now: self.clock.now(),
        });

        self.repo.insert(&workflow).await?;

        log_business_event!(
            category: event::category::WORKFLOW,
            action: event::action::WORKFLOW_CREATED,
            entity: event::entity_type::MATERIAL_WORKFLOW => workflow.material_id(),
            actor: workflow.initiated_by(),
            result: event::result::SUCCESS,
            "ワークフロー作成"
        );

        Ok(workflow)
    }

    /// ワークフローを指定状態へ遷移させる
    ///
    /// 遷移表による合法性チェックの後、注入された遷移ポリシーで操作者を検証する。
    ///
    /// ## エラー
    ///
    /// - ワークフローが見つからない場合は `NotFound`
    /// - 遷移表にない遷移は `BadRequest`
    /// - ポリシーが拒否した場合は `Forbidden`
    /// - 他の更新と競合した場合は `Conflict`
    #[tracing::instrument(skip_all, fields(%material_id, %target, %actor))]
    pub async fn transition(
        &self,
        material_id: &MaterialId,
        target: WorkflowState,
        actor: ActorId,
    ) -> Result<MaterialWorkflow, CoreError> {
        let (workflow, from) = self
            .modify(material_id, |workflow, now| {
                let from = workflow.state();
                workflow.transition_to_with(self.policy.as_ref(), target, actor.clone(), now)?;
                Ok(from)
            })
            .await?;

        tracing::info!(%from, to = %target, %actor, "ワークフローの状態を遷移しました");
        log_business_event!(
            category: event::category::WORKFLOW,
            action: event::action::WORKFLOW_TRANSITIONED,
            entity: event::entity_type::MATERIAL_WORKFLOW => material_id,
            actor: actor,
            result: event::result::SUCCESS,
            "ワークフロー状態遷移"
        );

        Ok(workflow)
    }
}
