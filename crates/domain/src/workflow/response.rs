//! # 質問票回答
//!
//! ワークフローの 1 ステップ・1 フィールドに対する回答（下書きまたは確定）。
//!
//! 状態列挙は持たず、属性で振る舞いが決まる:
//! - `update_value` は確定値として保存し、下書きフラグを下ろす
//! - `save_draft` は下書きとして保存する（妥当性は問わない）
//! - 妥当性（[`Validity`]）は下書き／確定とは独立して付け外しできる

use chrono::{DateTime, Utc};

use crate::{
    DomainError,
    clock::advance_strictly,
    value_objects::{ActorId, FieldName, MaterialId, StepNumber},
};

define_entity_id! {
    /// 質問票回答 ID
    pub struct QuestionnaireResponseId;
}

/// フィールド型の既定値
pub const DEFAULT_FIELD_TYPE: &str = "TEXT";

/// 回答のキー（ステップ番号 + フィールド名）
///
/// ワークフロー内で一意。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    pub step_number: StepNumber,
    pub field_name:  FieldName,
}

impl ResponseKey {
    pub fn new(step_number: StepNumber, field_name: FieldName) -> Self {
        Self {
            step_number,
            field_name,
        }
    }
}

impl std::fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {}/{}", self.step_number, self.field_name)
    }
}

/// 回答の妥当性
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Valid,
    /// 不正（理由メッセージ付き）
    Invalid(String),
}

/// 質問票回答エンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionnaireResponse {
    id: QuestionnaireResponseId,
    workflow_id: MaterialId,
    key: ResponseKey,
    field_value: Option<String>,
    field_type: String,
    is_draft: bool,
    is_required: bool,
    modified_by: ActorId,
    created_at: DateTime<Utc>,
    last_modified: DateTime<Utc>,
    validity: Validity,
}

/// 質問票回答の新規作成パラメータ
pub struct NewQuestionnaireResponse {
    pub id: QuestionnaireResponseId,
    pub step_number: StepNumber,
    pub field_name: FieldName,
    pub field_value: Option<String>,
    /// 未指定（または空白）の場合は [`DEFAULT_FIELD_TYPE`]
    pub field_type: Option<String>,
    pub is_draft: bool,
    pub is_required: bool,
    pub modified_by: ActorId,
    pub now: DateTime<Utc>,
}

/// 質問票回答の DB 復元パラメータ
pub struct QuestionnaireResponseRecord {
    pub id: QuestionnaireResponseId,
    pub workflow_id: MaterialId,
    pub step_number: StepNumber,
    pub field_name: FieldName,
    pub field_value: Option<String>,
    pub field_type: String,
    pub is_draft: bool,
    pub is_required: bool,
    pub modified_by: ActorId,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub is_valid: bool,
    pub validation_message: Option<String>,
}

impl QuestionnaireResponse {
    pub(crate) fn new(workflow_id: MaterialId, params: NewQuestionnaireResponse) -> Self {
        let field_type = params
            .field_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_FIELD_TYPE.to_string());

        Self {
            id: params.id,
            workflow_id,
            key: ResponseKey::new(params.step_number, params.field_name),
            field_value: params.field_value,
            field_type,
            is_draft: params.is_draft,
            is_required: params.is_required,
            modified_by: params.modified_by,
            created_at: params.now,
            last_modified: params.now,
            validity: Validity::Valid,
        }
    }

    /// 既存のデータから復元する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 妥当性フラグとメッセージが矛盾している場合、
    ///   または `last_modified` が `created_at` より前の場合
    pub fn from_db(record: QuestionnaireResponseRecord) -> Result<Self, DomainError> {
        let validity = match (record.is_valid, record.validation_message) {
            (true, None) => Validity::Valid,
            (false, Some(message)) => Validity::Invalid(message),
            (true, Some(_)) => {
                return Err(DomainError::Validation(
                    "妥当な回答に validation_message が設定されています".to_string(),
                ));
            }
            (false, None) => {
                return Err(DomainError::Validation(
                    "不正な回答には validation_message が必要です".to_string(),
                ));
            }
        };
        if record.last_modified < record.created_at {
            return Err(DomainError::Validation(
                "last_modified が created_at より前になっています".to_string(),
            ));
        }

        Ok(Self {
            id: record.id,
            workflow_id: record.workflow_id,
            key: ResponseKey::new(record.step_number, record.field_name),
            field_value: record.field_value,
            field_type: record.field_type,
            is_draft: record.is_draft,
            is_required: record.is_required,
            modified_by: record.modified_by,
            created_at: record.created_at,
            last_modified: record.last_modified,
            validity,
        })
    }

    // Getter メソッド

    pub fn id(&self) -> &QuestionnaireResponseId {
        &self.id
    }

    pub fn workflow_id(&self) -> &MaterialId {
        &self.workflow_id
    }

    pub fn key(&self) -> &ResponseKey {
        &self.key
    }

    pub fn step_number(&self) -> StepNumber {
        self.key.step_number
    }

    pub fn field_name(&self) -> &FieldName {
        &self.key.field_name
    }

    pub fn field_value(&self) -> Option<&str> {
        self.field_value.as_deref()
    }

    pub fn field_type(&self) -> &str {
        &self.field_type
    }

    pub fn is_draft(&self) -> bool {
        self.is_draft
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn modified_by(&self) -> &ActorId {
        &self.modified_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.validity, Validity::Valid)
    }

    pub fn validation_message(&self) -> Option<&str> {
        match &self.validity {
            Validity::Valid => None,
            Validity::Invalid(message) => Some(message),
        }
    }

    // 派生値

    /// 値が未設定または空白のみか
    pub fn is_empty(&self) -> bool {
        self.field_value
            .as_deref()
            .is_none_or(|v| v.trim().is_empty())
    }

    /// 必須なのに未回答か
    pub fn is_required_and_empty(&self) -> bool {
        self.is_required && self.is_empty()
    }

    // ビジネスロジックメソッド

    /// 確定値として保存する（下書きフラグを下ろす）
    pub fn update_value(
        &mut self,
        value: Option<String>,
        actor: ActorId,
        now: DateTime<Utc>,
    ) {
        self.field_value = value;
        self.is_draft = false;
        self.touch(actor, now);
    }

    /// 下書きとして保存する（妥当性は問わない）
    pub fn save_draft(&mut self, value: Option<String>, actor: ActorId, now: DateTime<Utc>) {
        self.field_value = value;
        self.is_draft = true;
        self.touch(actor, now);
    }

    /// 不正としてマークする
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 理由メッセージが空の場合
    pub fn mark_invalid(&mut self, message: impl Into<String>) -> Result<(), DomainError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(DomainError::Validation(
                "不正の理由メッセージは必須です".to_string(),
            ));
        }
        self.validity = Validity::Invalid(message);
        Ok(())
    }

    /// 妥当としてマークする（メッセージは破棄）
    pub fn mark_valid(&mut self) {
        self.validity = Validity::Valid;
    }

    fn touch(&mut self, actor: ActorId, now: DateTime<Utc>) {
        self.modified_by = actor;
        self.last_modified = advance_strictly(self.last_modified, now);
    }
}
