//! # 問い合わせ
//!
//! ワークフローのステップ・フィールドに対して起票される質問。
//! 担当チームが回答することで解決され、解決は一度きり（OPEN → RESOLVED）。
//!
//! 解決済みの情報（回答・解決者・解決日時）は ADT で保持し、
//! 「解決済みなのに回答がない」状態を型レベルで防止する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use super::state::QueryTeam;
use crate::{
    DomainError,
    clock::whole_days_between,
    sla::SlaPolicy,
    value_objects::{ActorId, FieldName, MaterialId, PriorityLevel, QueryQuestion, StepNumber},
};

define_entity_id! {
    /// 問い合わせ ID
    pub struct QueryId;
}

/// 問い合わせステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    /// 未解決
    Open,
    /// 解決済み
    Resolved,
}

impl QueryStatus {
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl std::str::FromStr for QueryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "RESOLVED" => Ok(Self::Resolved),
            _ => Err(DomainError::Validation(format!("不正な問い合わせステータス: {s}"))),
        }
    }
}

/// 問い合わせの状態（ADT）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    /// 未解決
    Open,
    /// 解決済み
    Resolved(QueryResolution),
}

/// 解決済み状態の固有フィールド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResolution {
    pub response:    String,
    pub resolved_by: ActorId,
    pub resolved_at: DateTime<Utc>,
}

/// 問い合わせエンティティ
///
/// ちょうど 1 つの [`MaterialWorkflow`](super::MaterialWorkflow) に所有される。
/// 所有元へは `workflow_id` で参照し、ポインタは持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    id: QueryId,
    workflow_id: MaterialId,
    question: QueryQuestion,
    step_number: Option<StepNumber>,
    field_name: Option<FieldName>,
    assigned_team: QueryTeam,
    priority_level: PriorityLevel,
    raised_by: ActorId,
    created_at: DateTime<Utc>,
    state: QueryState,
}

/// 問い合わせの新規作成パラメータ
///
/// 所有元のワークフロー ID は [`MaterialWorkflow::raise_query`](super::MaterialWorkflow::raise_query)
/// が補う。
pub struct NewQuery {
    pub id: QueryId,
    pub question: QueryQuestion,
    pub step_number: Option<StepNumber>,
    pub field_name: Option<FieldName>,
    pub assigned_team: QueryTeam,
    pub priority_level: PriorityLevel,
    pub raised_by: ActorId,
    pub now: DateTime<Utc>,
}

/// 問い合わせの DB 復元パラメータ
///
/// DB スキーマのフラット構造を表現する。`from_db()` で不変条件を検証して ADT に変換する。
pub struct QueryRecord {
    pub id: QueryId,
    pub workflow_id: MaterialId,
    pub question: QueryQuestion,
    pub step_number: Option<StepNumber>,
    pub field_name: Option<FieldName>,
    pub assigned_team: QueryTeam,
    pub priority_level: PriorityLevel,
    pub raised_by: ActorId,
    pub status: QueryStatus,
    pub response: Option<String>,
    pub resolved_by: Option<ActorId>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Query {
    pub(crate) fn new(workflow_id: MaterialId, params: NewQuery) -> Self {
        Self {
            id: params.id,
            workflow_id,
            question: params.question,
            step_number: params.step_number,
            field_name: params.field_name,
            assigned_team: params.assigned_team,
            priority_level: params.priority_level,
            raised_by: params.raised_by,
            created_at: params.now,
            state: QueryState::Open,
        }
    }

    /// 既存のデータから復元する
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: RESOLVED なのに回答・解決者・解決日時のいずれかが欠けている、
    ///   または OPEN なのに解決情報が残っている場合
    pub fn from_db(record: QueryRecord) -> Result<Self, DomainError> {
        let state = match record.status {
            QueryStatus::Open => {
                if record.response.is_some()
                    || record.resolved_by.is_some()
                    || record.resolved_at.is_some()
                {
                    return Err(DomainError::Validation(
                        "OPEN の問い合わせに解決情報が含まれています".to_string(),
                    ));
                }
                QueryState::Open
            }
            QueryStatus::Resolved => {
                let response = record.response.ok_or_else(|| {
                    DomainError::Validation("RESOLVED の問い合わせには response が必要です".to_string())
                })?;
                let resolved_by = record.resolved_by.ok_or_else(|| {
                    DomainError::Validation(
                        "RESOLVED の問い合わせには resolved_by が必要です".to_string(),
                    )
                })?;
                let resolved_at = record.resolved_at.ok_or_else(|| {
                    DomainError::Validation(
                        "RESOLVED の問い合わせには resolved_at が必要です".to_string(),
                    )
                })?;
                QueryState::Resolved(QueryResolution {
                    response,
                    resolved_by,
                    resolved_at,
                })
            }
        };

        Ok(Self {
            id: record.id,
            workflow_id: record.workflow_id,
            question: record.question,
            step_number: record.step_number,
            field_name: record.field_name,
            assigned_team: record.assigned_team,
            priority_level: record.priority_level,
            raised_by: record.raised_by,
            created_at: record.created_at,
            state,
        })
    }

    // Getter メソッド

    pub fn id(&self) -> &QueryId {
        &self.id
    }

    pub fn workflow_id(&self) -> &MaterialId {
        &self.workflow_id
    }

    pub fn question(&self) -> &QueryQuestion {
        &self.question
    }

    pub fn step_number(&self) -> Option<StepNumber> {
        self.step_number
    }

    pub fn field_name(&self) -> Option<&FieldName> {
        self.field_name.as_ref()
    }

    pub fn assigned_team(&self) -> QueryTeam {
        self.assigned_team
    }

    pub fn priority_level(&self) -> PriorityLevel {
        self.priority_level
    }

    pub fn raised_by(&self) -> &ActorId {
        &self.raised_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> QueryStatus {
        match self.state {
            QueryState::Open => QueryStatus::Open,
            QueryState::Resolved(_) => QueryStatus::Resolved,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.status().is_resolved()
    }

    pub fn response(&self) -> Option<&str> {
        self.resolution().map(|r| r.response.as_str())
    }

    pub fn resolved_by(&self) -> Option<&ActorId> {
        self.resolution().map(|r| &r.resolved_by)
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolution().map(|r| r.resolved_at)
    }

    /// 状態への直接アクセス（パターンマッチ用）
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    fn resolution(&self) -> Option<&QueryResolution> {
        match &self.state {
            QueryState::Resolved(resolution) => Some(resolution),
            QueryState::Open => None,
        }
    }

    // 派生値

    /// 起票から解決（未解決なら `now`）までの経過日数
    pub fn days_open(&self, now: DateTime<Utc>) -> i64 {
        whole_days_between(self.created_at, self.resolved_at().unwrap_or(now))
    }

    /// 未解決のまま SLA の期限を超えているか
    pub fn is_overdue(&self, now: DateTime<Utc>, policy: &SlaPolicy) -> bool {
        self.is_open() && self.days_open(now) > policy.query_overdue_days()
    }

    /// 未解決かつ、優先度が閾値以上またはエスカレーション日数に達しているか
    pub fn is_high_priority(&self, now: DateTime<Utc>, policy: &SlaPolicy) -> bool {
        self.is_open()
            && (self.priority_level >= policy.high_priority_level()
                || self.days_open(now) >= policy.query_escalation_days())
    }

    // ビジネスロジックメソッド

    /// 問い合わせを解決する
    ///
    /// # Errors
    ///
    /// - `DomainError::AlreadyResolved`: 既に解決済みの場合（何も変更しない）
    /// - `DomainError::Validation`: 回答が空の場合
    pub fn resolve(
        &mut self,
        response: impl Into<String>,
        resolved_by: ActorId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.status().is_resolved() {
            return Err(DomainError::AlreadyResolved {
                query_id: self.id.to_string(),
            });
        }

        let response = response.into();
        if response.trim().is_empty() {
            return Err(DomainError::Validation(
                "問い合わせへの回答は必須です".to_string(),
            ));
        }

        self.state = QueryState::Resolved(QueryResolution {
            response,
            resolved_by,
            resolved_at: now,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[fixture]
    fn open_query(now: DateTime<Utc>) -> Query {
        Query::new(
            MaterialId::new("CHEM-001").unwrap(),
            NewQuery {
                id: QueryId::new(),
                question: QueryQuestion::new("引火点の測定方法を教えてください").unwrap(),
                step_number: Some(StepNumber::new(2).unwrap()),
                field_name: Some(FieldName::new("flash_point").unwrap()),
                assigned_team: QueryTeam::Cqs,
                priority_level: PriorityLevel::default(),
                raised_by: ActorId::new("jvc.reviewer").unwrap(),
                now,
            },
        )
    }

    fn record_from(query: &Query) -> QueryRecord {
        QueryRecord {
            id: query.id().clone(),
            workflow_id: query.workflow_id().clone(),
            question: query.question().clone(),
            step_number: query.step_number(),
            field_name: query.field_name().cloned(),
            assigned_team: query.assigned_team(),
            priority_level: query.priority_level(),
            raised_by: query.raised_by().clone(),
            status: query.status(),
            response: query.response().map(String::from),
            resolved_by: query.resolved_by().cloned(),
            resolved_at: query.resolved_at(),
            created_at: query.created_at(),
        }
    }

    #[rstest]
    fn test_新規作成時はopen(open_query: Query) {
        assert_eq!(open_query.status(), QueryStatus::Open);
        assert!(open_query.response().is_none());
        assert!(open_query.resolved_by().is_none());
        assert!(open_query.resolved_at().is_none());
    }

    #[rstest]
    fn test_解決後の状態(mut open_query: Query, now: DateTime<Utc>) {
        let resolved_at = now + Duration::days(1);

        open_query
            .resolve(
                "Flash point is 65°C",
                ActorId::new("cqs.member").unwrap(),
                resolved_at,
            )
            .unwrap();

        assert_eq!(open_query.status(), QueryStatus::Resolved);
        assert_eq!(open_query.response(), Some("Flash point is 65°C"));
        assert_eq!(open_query.resolved_by().map(ActorId::as_str), Some("cqs.member"));
        assert_eq!(open_query.resolved_at(), Some(resolved_at));
    }

    #[rstest]
    fn test_二度目の解決はエラーで解決情報は変わらない(mut open_query: Query, now: DateTime<Utc>) {
        open_query
            .resolve("Flash point is 65°C", ActorId::new("cqs.member").unwrap(), now)
            .unwrap();
        let before = open_query.clone();

        let result = open_query.resolve(
            "別の回答",
            ActorId::new("someone.else").unwrap(),
            now + Duration::days(3),
        );

        assert!(matches!(result, Err(DomainError::AlreadyResolved { .. })));
        assert_eq!(open_query, before);
    }

    #[rstest]
    fn test_空の回答では解決できない(mut open_query: Query, now: DateTime<Utc>) {
        let result = open_query.resolve("   ", ActorId::new("cqs.member").unwrap(), now);

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(open_query.status(), QueryStatus::Open);
    }

    #[rstest]
    fn test_未解決の経過日数は現在時刻まで(open_query: Query, now: DateTime<Utc>) {
        assert_eq!(open_query.days_open(now), 0);
        assert_eq!(open_query.days_open(now + Duration::hours(23)), 0);
        assert_eq!(open_query.days_open(now + Duration::days(4)), 4);
    }

    #[rstest]
    fn test_解決済みの経過日数は解決日時で止まる(mut open_query: Query, now: DateTime<Utc>) {
        open_query
            .resolve("回答", ActorId::new("cqs.member").unwrap(), now + Duration::days(2))
            .unwrap();

        assert_eq!(open_query.days_open(now + Duration::days(30)), 2);
    }

    #[rstest]
    #[case(3, false)]
    #[case(4, true)]
    fn test_期限超過は閾値を超えた場合のみ(
        open_query: Query,
        now: DateTime<Utc>,
        #[case] elapsed_days: i64,
        #[case] expected: bool,
    ) {
        let policy = SlaPolicy::default();

        assert_eq!(
            open_query.is_overdue(now + Duration::days(elapsed_days), &policy),
            expected
        );
    }

    #[rstest]
    fn test_解決済みは期限超過にも高優先度にもならない(mut open_query: Query, now: DateTime<Utc>) {
        let policy = SlaPolicy::default();
        open_query
            .resolve("回答", ActorId::new("cqs.member").unwrap(), now + Duration::days(10))
            .unwrap();

        let later = now + Duration::days(20);
        assert!(!open_query.is_overdue(later, &policy));
        assert!(!open_query.is_high_priority(later, &policy));
    }

    #[rstest]
    fn test_優先度が閾値以上なら即座に高優先度(now: DateTime<Utc>) {
        let query = Query::new(
            MaterialId::new("CHEM-002").unwrap(),
            NewQuery {
                id: QueryId::new(),
                question: QueryQuestion::new("SDS の版数は？").unwrap(),
                step_number: None,
                field_name: None,
                assigned_team: QueryTeam::Tech,
                priority_level: PriorityLevel::new(5).unwrap(),
                raised_by: ActorId::new("jvc.reviewer").unwrap(),
                now,
            },
        );

        assert!(query.is_high_priority(now, &SlaPolicy::default()));
    }

    #[rstest]
    fn test_エスカレーション日数に達すると高優先度(open_query: Query, now: DateTime<Utc>) {
        let policy = SlaPolicy::default();

        assert!(!open_query.is_high_priority(now + Duration::days(4), &policy));
        assert!(open_query.is_high_priority(now + Duration::days(5), &policy));
    }

    // --- from_db() 不変条件バリデーション ---

    #[rstest]
    fn test_from_db_往復で同一になる(mut open_query: Query, now: DateTime<Utc>) {
        assert_eq!(Query::from_db(record_from(&open_query)).unwrap(), open_query);

        open_query
            .resolve("回答", ActorId::new("cqs.member").unwrap(), now)
            .unwrap();
        assert_eq!(Query::from_db(record_from(&open_query)).unwrap(), open_query);
    }

    #[rstest]
    fn test_from_db_resolvedで回答欠損はエラー(open_query: Query, now: DateTime<Utc>) {
        let result = Query::from_db(QueryRecord {
            status: QueryStatus::Resolved,
            response: None,
            resolved_by: Some(ActorId::new("cqs.member").unwrap()),
            resolved_at: Some(now),
            ..record_from(&open_query)
        });

        assert!(result.is_err());
    }

    #[rstest]
    fn test_from_db_resolvedで解決日時欠損はエラー(open_query: Query) {
        let result = Query::from_db(QueryRecord {
            status: QueryStatus::Resolved,
            response: Some("回答".to_string()),
            resolved_by: Some(ActorId::new("cqs.member").unwrap()),
            resolved_at: None,
            ..record_from(&open_query)
        });

        assert!(result.is_err());
    }

    #[rstest]
    fn test_from_db_openで解決情報があるとエラー(open_query: Query) {
        let result = Query::from_db(QueryRecord {
            response: Some("回答".to_string()),
            ..record_from(&open_query)
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_ステータスの述語() {
        assert!(QueryStatus::Resolved.is_resolved());
        assert!(!QueryStatus::Open.is_resolved());
        assert_eq!(QueryStatus::Open.to_string(), "OPEN");
    }

    #[test]
    fn test_ステータスの文字列変換() {
        assert_eq!("RESOLVED".parse::<QueryStatus>().unwrap(), QueryStatus::Resolved);
        assert_eq!(
            "closed".parse::<QueryStatus>().unwrap_err().to_string(),
            "バリデーションエラー: 不正な問い合わせステータス: closed"
        );
    }
}
