//! # マテリアルワークフロー
//!
//! マテリアルの質問票回答と、CQS・技術チームへの問い合わせ対応を管理する。
//!
//! ## 概念モデル
//!
//! - **MaterialWorkflow**: マテリアル 1 件の進捗（集約ルート）
//! - **Query**: ワークフロー中に起票される問い合わせ
//! - **QuestionnaireResponse**: 質問票の 1 フィールドへの回答
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use matflow_domain::value_objects::{ActorId, MaterialId, MaterialName, PlantCode};
//! use matflow_domain::workflow::{MaterialWorkflow, NewMaterialWorkflow, WorkflowState};
//!
//! let mut workflow = MaterialWorkflow::new(NewMaterialWorkflow {
//!     material_id: MaterialId::new("CHEM-001")?,
//!     material_name: MaterialName::new("Isopropyl alcohol")?,
//!     assigned_plant: PlantCode::new("PLANT-JP01")?,
//!     initiated_by: ActorId::new("jvc.reviewer")?,
//!     now: chrono::Utc::now(),
//! });
//! assert_eq!(workflow.state(), WorkflowState::JvcPending);
//!
//! workflow.transition_to(
//!     WorkflowState::PlantPending,
//!     ActorId::new("jvc.reviewer")?,
//!     chrono::Utc::now(),
//! )?;
//! assert_eq!(workflow.state(), WorkflowState::PlantPending);
//! # Ok(())
//! # }
//! ```

mod material;
mod policy;
mod query;
mod response;
mod state;

pub use material::*;
pub use policy::*;
pub use query::*;
pub use response::*;
pub use state::*;
