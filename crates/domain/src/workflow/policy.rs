//! # 遷移ポリシー
//!
//! 操作者による状態遷移の可否を判定するフック。
//! 遷移表による合法性チェックの後に呼ばれ、拒否すると遷移は行われない。

use super::{MaterialWorkflow, WorkflowState};
use crate::{DomainError, value_objects::ActorId};

/// 操作者に基づく遷移可否の判定
pub trait TransitionPolicy: Send + Sync {
    /// 遷移を許可する場合は `Ok(())`、拒否する場合は `DomainError::Forbidden` を返す
    fn authorize(
        &self,
        workflow: &MaterialWorkflow,
        target: WorkflowState,
        actor: &ActorId,
    ) -> Result<(), DomainError>;
}

/// すべての遷移を許可するポリシー（既定）
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveTransitionPolicy;

impl TransitionPolicy for PermissiveTransitionPolicy {
    fn authorize(
        &self,
        _workflow: &MaterialWorkflow,
        _target: WorkflowState,
        _actor: &ActorId,
    ) -> Result<(), DomainError> {
        Ok(())
    }
}
