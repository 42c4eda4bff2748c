//! # マテリアルワークフロー（集約ルート）
//!
//! マテリアル 1 件の質問票・問い合わせ対応の進捗を管理する。
//! 状態遷移は [`WorkflowState`] の遷移表で検証し、問い合わせ・質問票回答を所有する。
//!
//! ## 不変条件
//!
//! - `state` は検証済みの遷移によってのみ変わる
//! - `completed_at` が設定されているのは `state == COMPLETED` のときだけ
//! - COMPLETED は終端で、以後の遷移は一切許可されない
//! - 回答のキー（ステップ + フィールド）はワークフロー内で一意
//!
//! 件数や経過日数などの派生値はキャッシュせず、呼び出しのたびに所有コレクションから計算する。

use chrono::{DateTime, Utc};

use super::{
    policy::{PermissiveTransitionPolicy, TransitionPolicy},
    query::{NewQuery, Query, QueryId},
    response::{
        NewQuestionnaireResponse,
        QuestionnaireResponse,
        QuestionnaireResponseId,
        ResponseKey,
    },
    state::{QueryTeam, WorkflowState},
};
use crate::{
    DomainError,
    clock::{advance_strictly, whole_days_between},
    sla::SlaPolicy,
    value_objects::{ActorId, MaterialId, MaterialName, PlantCode, Version},
};

/// 状態遷移の監査記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from:  WorkflowState,
    pub to:    WorkflowState,
    pub actor: ActorId,
    pub at:    DateTime<Utc>,
}

/// マテリアルワークフローエンティティ
///
/// ## 楽観的ロック
///
/// 変更操作のたびに `version` をインクリメントする。
/// リポジトリは読み込み時の version と保存先の version を比較し、
/// 一致しない場合は競合として扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialWorkflow {
    material_id: MaterialId,
    material_name: MaterialName,
    assigned_plant: PlantCode,
    initiated_by: ActorId,
    state: WorkflowState,
    version: Version,
    created_at: DateTime<Utc>,
    last_modified: DateTime<Utc>,
    last_modified_by: ActorId,
    extended_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    queries: Vec<Query>,
    responses: Vec<QuestionnaireResponse>,
    transitions: Vec<StateTransition>,
}

/// マテリアルワークフローの新規作成パラメータ
pub struct NewMaterialWorkflow {
    pub material_id:    MaterialId,
    pub material_name:  MaterialName,
    pub assigned_plant: PlantCode,
    pub initiated_by:   ActorId,
    pub now:            DateTime<Utc>,
}

/// マテリアルワークフローの DB 復元パラメータ
///
/// 所有コレクションを含めて完全に読み込まれていることを前提とする。
pub struct MaterialWorkflowRecord {
    pub material_id: MaterialId,
    pub material_name: MaterialName,
    pub assigned_plant: PlantCode,
    pub initiated_by: ActorId,
    pub state: WorkflowState,
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub last_modified_by: ActorId,
    pub extended_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub queries: Vec<Query>,
    pub responses: Vec<QuestionnaireResponse>,
    pub transitions: Vec<StateTransition>,
}

impl MaterialWorkflow {
    /// 新しいワークフローを作成する（初期状態: JVC_PENDING）
    pub fn new(params: NewMaterialWorkflow) -> Self {
        Self {
            material_id: params.material_id,
            material_name: params.material_name,
            assigned_plant: params.assigned_plant,
            last_modified_by: params.initiated_by.clone(),
            initiated_by: params.initiated_by,
            state: WorkflowState::INITIAL,
            version: Version::initial(),
            created_at: params.now,
            last_modified: params.now,
            extended_at: None,
            completed_at: None,
            queries: Vec::new(),
            responses: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// 既存のデータから復元する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 不変条件違反
    ///   （COMPLETED と completed_at の不一致、他ワークフローの子エンティティ、回答キーの重複など）
    pub fn from_db(record: MaterialWorkflowRecord) -> Result<Self, DomainError> {
        match (record.state, record.completed_at) {
            (WorkflowState::Completed, None) => {
                return Err(DomainError::Validation(
                    "COMPLETED のワークフローには completed_at が必要です".to_string(),
                ));
            }
            (state, Some(_)) if state != WorkflowState::Completed => {
                return Err(DomainError::Validation(format!(
                    "{state} のワークフローに completed_at が設定されています"
                )));
            }
            _ => {}
        }

        if record.last_modified < record.created_at {
            return Err(DomainError::Validation(
                "last_modified が created_at より前になっています".to_string(),
            ));
        }

        if let Some(query) = record
            .queries
            .iter()
            .find(|q| q.workflow_id() != &record.material_id)
        {
            return Err(DomainError::Validation(format!(
                "問い合わせ {} は別のワークフロー（{}）に属しています",
                query.id(),
                query.workflow_id()
            )));
        }

        for (i, response) in record.responses.iter().enumerate() {
            if response.workflow_id() != &record.material_id {
                return Err(DomainError::Validation(format!(
                    "回答 {} は別のワークフロー（{}）に属しています",
                    response.id(),
                    response.workflow_id()
                )));
            }
            if record.responses[..i]
                .iter()
                .any(|other| other.key() == response.key())
            {
                return Err(DomainError::Validation(format!(
                    "回答キーが重複しています: {}",
                    response.key()
                )));
            }
        }

        Ok(Self {
            material_id: record.material_id,
            material_name: record.material_name,
            assigned_plant: record.assigned_plant,
            initiated_by: record.initiated_by,
            state: record.state,
            version: record.version,
            created_at: record.created_at,
            last_modified: record.last_modified,
            last_modified_by: record.last_modified_by,
            extended_at: record.extended_at,
            completed_at: record.completed_at,
            queries: record.queries,
            responses: record.responses,
            transitions: record.transitions,
        })
    }

    // Getter メソッド

    pub fn material_id(&self) -> &MaterialId {
        &self.material_id
    }

    pub fn material_name(&self) -> &MaterialName {
        &self.material_name
    }

    pub fn assigned_plant(&self) -> &PlantCode {
        &self.assigned_plant
    }

    pub fn initiated_by(&self) -> &ActorId {
        &self.initiated_by
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn last_modified_by(&self) -> &ActorId {
        &self.last_modified_by
    }

    pub fn extended_at(&self) -> Option<DateTime<Utc>> {
        self.extended_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn responses(&self) -> &[QuestionnaireResponse] {
        &self.responses
    }

    /// 状態遷移の監査記録（古い順）
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    // 状態遷移

    /// `target` への遷移が遷移表で許可されているか
    pub fn can_transition_to(&self, target: WorkflowState) -> bool {
        self.state.can_transition_to(target)
    }

    /// 状態を遷移させる（操作者による制限なし）
    ///
    /// # Errors
    ///
    /// - `DomainError::IllegalTransition`: 遷移表にない場合（何も変更しない）
    pub fn transition_to(
        &mut self,
        target: WorkflowState,
        actor: ActorId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.transition_to_with(&PermissiveTransitionPolicy, target, actor, now)
    }

    /// 遷移ポリシーを適用して状態を遷移させる
    ///
    /// 成功時の副作用:
    /// - `last_modified` を必ず前に進め、`last_modified_by` を記録する
    /// - 問い合わせ状態から PLANT_PENDING に戻る場合は `extended_at` を設定する
    /// - COMPLETED に入る場合は `completed_at` を設定する
    /// - 監査記録を追加し、version をインクリメントする
    ///
    /// # Errors
    ///
    /// - `DomainError::IllegalTransition`: 遷移表にない場合
    /// - `DomainError::Forbidden`: ポリシーが拒否した場合
    ///
    /// いずれの場合も何も変更しない。
    pub fn transition_to_with(
        &mut self,
        policy: &dyn TransitionPolicy,
        target: WorkflowState,
        actor: ActorId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let from = self.state;
        if !from.can_transition_to(target) {
            return Err(DomainError::IllegalTransition { from, to: target });
        }
        policy.authorize(self, target, &actor)?;

        let at = advance_strictly(self.last_modified, now);
        if from.is_query_state() && target == WorkflowState::PlantPending {
            self.extended_at = Some(at);
        }
        if target == WorkflowState::Completed {
            self.completed_at = Some(at);
        }
        self.state = target;
        self.transitions.push(StateTransition {
            from,
            to: target,
            actor: actor.clone(),
            at,
        });
        self.last_modified = at;
        self.last_modified_by = actor;
        self.version = self.version.next();
        Ok(())
    }

    // 問い合わせ

    /// 問い合わせを起票する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 完了済みのワークフローの場合
    pub fn raise_query(&mut self, params: NewQuery) -> Result<QueryId, DomainError> {
        if self.state.is_terminal_state() {
            return Err(DomainError::Validation(
                "完了済みのワークフローには問い合わせを起票できません".to_string(),
            ));
        }

        let actor = params.raised_by.clone();
        let now = params.now;
        let query = Query::new(self.material_id.clone(), params);
        let id = query.id().clone();
        self.queries.push(query);
        self.touch(actor, now);
        Ok(id)
    }

    pub fn query(&self, id: &QueryId) -> Option<&Query> {
        self.queries.iter().find(|q| q.id() == id)
    }

    /// 問い合わせを解決する
    ///
    /// # Errors
    ///
    /// - `DomainError::NotFound`: このワークフローに存在しない問い合わせ
    /// - `DomainError::AlreadyResolved`: 解決済み
    /// - `DomainError::Validation`: 回答が空
    pub fn resolve_query(
        &mut self,
        id: &QueryId,
        response: impl Into<String>,
        actor: ActorId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let query = self
            .queries
            .iter_mut()
            .find(|q| q.id() == id)
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "Query",
                id:          id.to_string(),
            })?;
        query.resolve(response, actor.clone(), now)?;
        self.touch(actor, now);
        Ok(())
    }

    pub fn open_queries_count(&self) -> usize {
        self.queries.iter().filter(|q| q.is_open()).count()
    }

    pub fn resolved_queries_count(&self) -> usize {
        self.queries.iter().filter(|q| !q.is_open()).count()
    }

    pub fn total_queries_count(&self) -> usize {
        self.queries.len()
    }

    pub fn has_open_queries(&self) -> bool {
        self.queries.iter().any(Query::is_open)
    }

    /// 指定チームに割り当てられた未解決の問い合わせ
    pub fn open_queries_for(&self, team: QueryTeam) -> impl Iterator<Item = &Query> {
        self.queries
            .iter()
            .filter(move |q| q.is_open() && q.assigned_team() == team)
    }

    // 質問票回答

    /// 回答を追加する
    ///
    /// # Errors
    ///
    /// - `DomainError::Conflict`: 同じステップ・フィールドの回答が既にある場合
    pub fn add_response(
        &mut self,
        params: NewQuestionnaireResponse,
    ) -> Result<QuestionnaireResponseId, DomainError> {
        let key = ResponseKey::new(params.step_number, params.field_name.clone());
        if self.response(&key).is_some() {
            return Err(DomainError::Conflict(format!("回答は既に存在します: {key}")));
        }

        let actor = params.modified_by.clone();
        let now = params.now;
        let response = QuestionnaireResponse::new(self.material_id.clone(), params);
        let id = response.id().clone();
        self.responses.push(response);
        self.touch(actor, now);
        Ok(id)
    }

    pub fn response(&self, key: &ResponseKey) -> Option<&QuestionnaireResponse> {
        self.responses.iter().find(|r| r.key() == key)
    }

    /// 回答の値を確定する
    pub fn update_response_value(
        &mut self,
        key: &ResponseKey,
        value: Option<String>,
        actor: ActorId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.response_mut(key)?
            .update_value(value, actor.clone(), now);
        self.touch(actor, now);
        Ok(())
    }

    /// 回答を下書き保存する
    pub fn save_response_draft(
        &mut self,
        key: &ResponseKey,
        value: Option<String>,
        actor: ActorId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.response_mut(key)?.save_draft(value, actor.clone(), now);
        self.touch(actor, now);
        Ok(())
    }

    pub fn mark_response_invalid(
        &mut self,
        key: &ResponseKey,
        message: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.response_mut(key)?.mark_invalid(message)?;
        self.version = self.version.next();
        Ok(())
    }

    pub fn mark_response_valid(&mut self, key: &ResponseKey) -> Result<(), DomainError> {
        self.response_mut(key)?.mark_valid();
        self.version = self.version.next();
        Ok(())
    }

    /// 必須なのに未回答の回答一覧
    pub fn required_empty_responses(&self) -> Vec<&QuestionnaireResponse> {
        self.responses
            .iter()
            .filter(|r| r.is_required_and_empty())
            .collect()
    }

    fn response_mut(&mut self, key: &ResponseKey) -> Result<&mut QuestionnaireResponse, DomainError> {
        self.responses
            .iter_mut()
            .find(|r| r.key() == key)
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "QuestionnaireResponse",
                id:          key.to_string(),
            })
    }

    // 派生値

    /// 作成から完了（未完了なら `now`）までの経過日数
    pub fn days_pending(&self, now: DateTime<Utc>) -> i64 {
        whole_days_between(self.created_at, self.completed_at.unwrap_or(now))
    }

    /// 未完了のまま SLA の期限を超えているか
    pub fn is_overdue(&self, now: DateTime<Utc>, policy: &SlaPolicy) -> bool {
        self.completed_at.is_none() && self.days_pending(now) > policy.workflow_overdue_days()
    }

    fn touch(&mut self, actor: ActorId, now: DateTime<Utc>) {
        self.last_modified = advance_strictly(self.last_modified, now);
        self.last_modified_by = actor;
        self.version = self.version.next();
    }
}
