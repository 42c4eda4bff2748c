//! 質問票回答の下書き保存・確定・妥当性判定

use chrono::{DateTime, Utc};
use matflow_domain::{
    DomainError,
    value_objects::{ActorId, MaterialId},
    workflow::{
        MaterialWorkflow,
        NewQuestionnaireResponse,
        QuestionnaireResponseId,
        ResponseKey,
        Validity,
    },
};
use matflow_shared::{event_log::event, log_business_event};

use crate::{
    error::CoreError,
    usecase::workflow::{MaterialWorkflowUseCaseImpl, ResponseInput},
};

/// キーの回答がなければ作成し、あれば値を書き換える
fn upsert_response(
    workflow: &mut MaterialWorkflow,
    input: ResponseInput,
    is_draft: bool,
    actor: ActorId,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    let key = ResponseKey::new(input.step_number, input.field_name.clone());
    if workflow.response(&key).is_none() {
        workflow.add_response(NewQuestionnaireResponse {
            id: QuestionnaireResponseId::new(),
            step_number: input.step_number,
            field_name: input.field_name,
            field_value: input.field_value,
            field_type: input.field_type,
            is_draft,
            is_required: input.is_required,
            modified_by: actor,
            now,
        })?;
        return Ok(());
    }

    if is_draft {
        workflow.save_response_draft(&key, input.field_value, actor, now)
    } else {
        workflow.update_response_value(&key, input.field_value, actor, now)
    }
}

impl MaterialWorkflowUseCaseImpl {
    /// 回答を下書き保存する（未作成なら下書きとして作成）
    #[tracing::instrument(
        skip_all,
        fields(%material_id, step = %input.step_number, field = %input.field_name, %actor)
    )]
    pub async fn save_response_draft(
        &self,
        material_id: &MaterialId,
        input: ResponseInput,
        actor: ActorId,
    ) -> Result<MaterialWorkflow, CoreError> {
        let key = ResponseKey::new(input.step_number, input.field_name.clone());
        let (workflow, ()) = self
            .modify(material_id, |workflow, now| {
                upsert_response(workflow, input, true, actor.clone(), now)
            })
            .await?;

        log_business_event!(
            category: event::category::RESPONSE,
            action: event::action::RESPONSE_DRAFT_SAVED,
            entity: event::entity_type::QUESTIONNAIRE_RESPONSE => key,
            actor: actor,
            result: event::result::SUCCESS,
            "回答下書き保存"
        );

        Ok(workflow)
    }

    /// 回答を確定する（未作成なら確定済みとして作成）
    #[tracing::instrument(
        skip_all,
        fields(%material_id, step = %input.step_number, field = %input.field_name, %actor)
    )]
    pub async fn submit_response(
        &self,
        material_id: &MaterialId,
        input: ResponseInput,
        actor: ActorId,
    ) -> Result<MaterialWorkflow, CoreError> {
        let key = ResponseKey::new(input.step_number, input.field_name.clone());
        let (workflow, ()) = self
            .modify(material_id, |workflow, now| {
                upsert_response(workflow, input, false, actor.clone(), now)
            })
            .await?;

        log_business_event!(
            category: event::category::RESPONSE,
            action: event::action::RESPONSE_SUBMITTED,
            entity: event::entity_type::QUESTIONNAIRE_RESPONSE => key,
            actor: actor,
            result: event::result::SUCCESS,
            "回答確定"
        );

        Ok(workflow)
    }

    /// 回答の妥当性判定結果を記録する
    ///
    /// ## エラー
    ///
    /// - 回答が見つからない場合は `NotFound`
    /// - 不正と判定したのにメッセージが空の場合は `BadRequest`
    #[tracing::instrument(skip_all, fields(%material_id, %key, %actor))]
    pub async fn validate_response(
        &self,
        material_id: &MaterialId,
        key: &ResponseKey,
        validity: Validity,
        actor: ActorId,
    ) -> Result<MaterialWorkflow, CoreError> {
        let is_valid = matches!(validity, Validity::Valid);
        let (workflow, ()) = self
            .modify(material_id, |workflow, _now| match validity {
                Validity::Valid => workflow.mark_response_valid(key),
                Validity::Invalid(message) => workflow.mark_response_invalid(key, message),
            })
            .await?;

        log_business_event!(
            category: event::category::RESPONSE,
            action: event::action::RESPONSE_VALIDATED,
            entity: event::entity_type::QUESTIONNAIRE_RESPONSE => key,
            actor: actor,
            result: event::result_of(is_valid),
            "回答妥当性判定"
        );

        Ok(workflow)
    }
}
