//! # ワークフロー状態と担当チーム
//!
//! ワークフローの状態集合と遷移表、問い合わせ担当チームとの対応を定義する。
//!
//! ## 遷移表
//!
//! ```text
//! JVC_PENDING ──▶ PLANT_PENDING ──▶ COMPLETED（終端）
//!                   │    ▲
//!                   ▼    │
//!               CQS_PENDING
//!
//! TECH_PENDING ──▶ PLANT_PENDING
//! ```
//!
//! 問い合わせ状態（CQS / TECH）から PLANT_PENDING に戻る遷移は
//! プラントの作業期間の「延長」として扱う。

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::DomainError;

/// ワークフロー状態
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    EnumIter,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    /// JVC 確認待ち（初期状態）
    JvcPending,
    /// プラント回答待ち
    PlantPending,
    /// CQS 問い合わせ対応待ち
    CqsPending,
    /// 技術問い合わせ対応待ち
    TechPending,
    /// 完了
    Completed,
}

impl WorkflowState {
    /// 新規ワークフローの初期状態
    pub const INITIAL: Self = Self::JvcPending;

    /// 問い合わせ対応中の状態か
    pub fn is_query_state(self) -> bool {
        matches!(self, Self::CqsPending | Self::TechPending)
    }

    /// 終端状態か（以後の遷移は一切許可されない）
    pub fn is_terminal_state(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// `target` への遷移が遷移表で許可されているか
    pub fn can_transition_to(self, target: Self) -> bool {
        use WorkflowState::*;

        matches!(
            (self, target),
            (JvcPending, PlantPending)
                | (PlantPending, CqsPending)
                | (PlantPending, Completed)
                | (CqsPending, PlantPending)
                | (TechPending, PlantPending)
        )
    }

    /// この状態から遷移可能な状態の一覧
    pub fn legal_targets(self) -> Vec<Self> {
        Self::iter().filter(|t| self.can_transition_to(*t)).collect()
    }

    /// この状態に対応する問い合わせ担当チーム
    pub fn query_team(self) -> Option<QueryTeam> {
        QueryTeam::from_workflow_state(self)
    }
}

impl std::str::FromStr for WorkflowState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JVC_PENDING" => Ok(Self::JvcPending),
            "PLANT_PENDING" => Ok(Self::PlantPending),
            "CQS_PENDING" => Ok(Self::CqsPending),
            "TECH_PENDING" => Ok(Self::TechPending),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(DomainError::Validation(format!("不正なワークフロー状態: {s}"))),
        }
    }
}

/// 問い合わせ担当チーム
///
/// 各チームはちょうど 1 つのワークフロー状態に対応し、
/// 起票された問い合わせがワークフローをどの状態で止めるかを決める。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    EnumIter,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryTeam {
    /// 化学品品質安全（CQS）チーム
    Cqs,
    /// 技術チーム
    Tech,
}

impl QueryTeam {
    /// チームに対応するワークフロー状態
    pub fn corresponding_workflow_state(self) -> WorkflowState {
        match self {
            Self::Cqs => WorkflowState::CqsPending,
            Self::Tech => WorkflowState::TechPending,
        }
    }

    /// ワークフロー状態から担当チームを逆引きする（問い合わせ状態以外は None）
    pub fn from_workflow_state(state: WorkflowState) -> Option<Self> {
        Self::iter().find(|team| team.corresponding_workflow_state() == state)
    }
}

impl std::str::FromStr for QueryTeam {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CQS" => Ok(Self::Cqs),
            "TECH" => Ok(Self::Tech),
            _ => Err(DomainError::Validation(format!("不正な問い合わせ担当チーム: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    use WorkflowState::*;

    #[rstest]
    #[case(JvcPending, PlantPending)]
    #[case(PlantPending, CqsPending)]
    #[case(PlantPending, Completed)]
    #[case(CqsPending, PlantPending)]
    #[case(TechPending, PlantPending)]
    fn test_遷移表に載っている遷移は許可される(
        #[case] from: WorkflowState,
        #[case] to: WorkflowState,
    ) {
        assert!(from.can_transition_to(to));
    }

    #[test]
    fn test_遷移表にない組み合わせはすべて拒否される() {
        let legal = [
            (JvcPending, PlantPending),
            (PlantPending, CqsPending),
            (PlantPending, Completed),
            (CqsPending, PlantPending),
            (TechPending, PlantPending),
        ];

        for from in WorkflowState::iter() {
            for to in WorkflowState::iter() {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} → {to}"
                );
            }
        }
    }

    #[test]
    fn test_完了状態からはどこにも遷移できない() {
        assert!(Completed.legal_targets().is_empty());
        assert!(WorkflowState::iter().all(|t| !Completed.can_transition_to(t)));
    }

    #[test]
    fn test_自己遷移は許可されない() {
        assert!(WorkflowState::iter().all(|s| !s.can_transition_to(s)));
    }

    #[test]
    fn test_遷移可能な状態の一覧() {
        assert_eq!(JvcPending.legal_targets(), vec![PlantPending]);
        assert_eq!(PlantPending.legal_targets(), vec![CqsPending, Completed]);
        assert_eq!(TechPending.legal_targets(), vec![PlantPending]);
    }

    #[rstest]
    #[case(JvcPending, false, false)]
    #[case(PlantPending, false, false)]
    #[case(CqsPending, true, false)]
    #[case(TechPending, true, false)]
    #[case(Completed, false, true)]
    fn test_状態の述語(
        #[case] state: WorkflowState,
        #[case] query: bool,
        #[case] terminal: bool,
    ) {
        assert_eq!(state.is_query_state(), query);
        assert_eq!(state.is_terminal_state(), terminal);
    }

    #[test]
    fn test_担当チームと状態の対応() {
        assert_eq!(QueryTeam::Cqs.corresponding_workflow_state(), CqsPending);
        assert_eq!(QueryTeam::Tech.corresponding_workflow_state(), TechPending);
        assert_eq!(CqsPending.query_team(), Some(QueryTeam::Cqs));
        assert_eq!(TechPending.query_team(), Some(QueryTeam::Tech));
        assert_eq!(PlantPending.query_team(), None);
    }

    #[test]
    fn test_問い合わせ状態はいずれかのチームに対応する() {
        for state in WorkflowState::iter() {
            assert_eq!(state.is_query_state(), state.query_team().is_some());
        }
    }

    #[test]
    fn test_文字列表現の往復() {
        for state in WorkflowState::iter() {
            assert_eq!(WorkflowState::from_str(&state.to_string()).unwrap(), state);
        }
        assert_eq!(PlantPending.to_string(), "PLANT_PENDING");
        assert_eq!(QueryTeam::from_str("TECH").unwrap(), QueryTeam::Tech);
    }

    #[test]
    fn test_不正な文字列はバリデーションエラー() {
        assert_eq!(
            WorkflowState::from_str("plant_pending").unwrap_err().to_string(),
            "バリデーションエラー: 不正なワークフロー状態: plant_pending"
        );
        assert_eq!(
            QueryTeam::from_str("JVC").unwrap_err().to_string(),
            "バリデーションエラー: 不正な問い合わせ担当チーム: JVC"
        );
    }

    #[test]
    fn test_serdeの表現は大文字スネークケース() {
        let json = serde_json::to_string(&CqsPending).unwrap();

        assert_eq!(json, "\"CQS_PENDING\"");
    }
}
