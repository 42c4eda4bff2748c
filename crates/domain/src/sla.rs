//! # SLA ポリシー
//!
//! 問い合わせ・ワークフローの期限超過や高優先度の判定に使う閾値。
//! 判定は読み取り時に計算するのみで、ドメイン層がタイムアウトを強制することはない。

use serde::{Deserialize, Serialize};

use crate::{DomainError, value_objects::PriorityLevel};

/// SLA 閾値
///
/// 値は設定から読み込まれる（Core Service の `CoreConfig::sla_policy()`）。
/// 未設定時は [`Default`] の値を使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaPolicy {
    /// 未解決の問い合わせがこの日数を超えたら期限超過
    query_overdue_days:    i64,
    /// 未解決の問い合わせがこの日数に達したら高優先度に格上げ
    query_escalation_days: i64,
    /// この優先度以上の問い合わせは常に高優先度
    high_priority_level:   PriorityLevel,
    /// 未完了のワークフローがこの日数を超えたら期限超過
    workflow_overdue_days: i64,
}

impl SlaPolicy {
    /// 閾値を指定して作成する
    ///
    /// # Errors
    ///
    /// - 日数が負の場合
    /// - エスカレーション日数が期限超過日数より短い場合
    pub fn new(
        query_overdue_days: i64,
        query_escalation_days: i64,
        high_priority_level: PriorityLevel,
        workflow_overdue_days: i64,
    ) -> Result<Self, DomainError> {
        if query_overdue_days < 0 || query_escalation_days < 0 || workflow_overdue_days < 0 {
            return Err(DomainError::Validation(
                "SLA の日数は 0 以上である必要があります".to_string(),
            ));
        }
        if query_escalation_days < query_overdue_days {
            return Err(DomainError::Validation(format!(
                "エスカレーション日数（{query_escalation_days}）は期限超過日数（{query_overdue_days}）以上である必要があります"
            )));
        }
        Ok(Self {
            query_overdue_days,
            query_escalation_days,
            high_priority_level,
            workflow_overdue_days,
        })
    }

    pub fn query_overdue_days(&self) -> i64 {
        self.query_overdue_days
    }

    pub fn query_escalation_days(&self) -> i64 {
        self.query_escalation_days
    }

    pub fn high_priority_level(&self) -> PriorityLevel {
        self.high_priority_level
    }

    pub fn workflow_overdue_days(&self) -> i64 {
        self.workflow_overdue_days
    }
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self {
            query_overdue_days:    3,
            query_escalation_days: 5,
            high_priority_level:   PriorityLevel::HIGH,
            workflow_overdue_days: 14,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_デフォルト値() {
        let policy = SlaPolicy::default();

        assert_eq!(policy.query_overdue_days(), 3);
        assert_eq!(policy.query_escalation_days(), 5);
        assert_eq!(policy.high_priority_level().as_u8(), 4);
        assert_eq!(policy.workflow_overdue_days(), 14);
    }

    #[test]
    fn test_負の日数は拒否される() {
        let result = SlaPolicy::new(-1, 5, PriorityLevel::default(), 14);

        assert!(result.is_err());
    }

    #[test]
    fn test_エスカレーションが期限超過より短いと拒否される() {
        let result = SlaPolicy::new(5, 2, PriorityLevel::default(), 14);

        assert_eq!(
            result.unwrap_err().to_string(),
            "バリデーションエラー: エスカレーション日数（2）は期限超過日数（5）以上である必要があります"
        );
    }
}
