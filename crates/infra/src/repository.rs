//! # リポジトリ
//!
//! 集約の永続化操作を定義するトレイトと、その実装を提供する。
//!
//! - **集約単位の保存**: 問い合わせ・回答はワークフローと一緒に読み書きする
//! - **テスタビリティ**: トレイト経由で差し替え可能

pub mod material_workflow_repository;

pub use material_workflow_repository::{
    InMemoryMaterialWorkflowRepository,
    MaterialWorkflowRepository,
};
