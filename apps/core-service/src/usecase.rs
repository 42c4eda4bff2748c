//! # ユースケース
//!
//! リポジトリとドメインモデルを組み合わせて、ワークフローの業務操作を実装する。

pub(crate) mod helpers;

pub mod workflow;

pub use workflow::{
    CreateWorkflowInput,
    MaterialWorkflowUseCaseImpl,
    OverdueQuery,
    RaiseQueryInput,
    RaisedQuery,
    ResponseInput,
};
