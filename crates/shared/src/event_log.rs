//! # ビジネスイベントログ
//!
//! ワークフロー・問い合わせ・質問票回答に対する業務操作を、監査で抽出しやすい
//! 構造化ログとして出力する。
//!
//! すべてのイベントは `event.kind = "business_event"` を持ち、JSON 出力では
//! `jq 'select(.["event.kind"] == "business_event")'` で絞り込める。
//! 残りのフィールド（`event.category` / `event.action` / `event.entity_type` /
//! `event.entity_id` / `event.actor_id` / `event.result`）はマクロ引数で必ず指定させる。

/// ビジネスイベントを `INFO` レベルで出力する
///
/// エンティティ ID と操作者 ID は `Display` で記録する。
///
/// ```rust
/// use matflow_shared::{event_log::event, log_business_event};
///
/// let material_id = "CHEM-001";
/// log_business_event!(
///     category: event::category::WORKFLOW,
///     action: event::action::WORKFLOW_CREATED,
///     entity: event::entity_type::MATERIAL_WORKFLOW => material_id,
///     actor: "jvc.reviewer",
///     result: event::result::SUCCESS,
///     "ワークフローを作成しました"
/// );
/// ```
#[macro_export]
macro_rules! log_business_event {
    (
        category: $category:expr,
        action: $action:expr,
        entity: $entity_type:expr => $entity_id:expr,
        actor: $actor:expr,
        result: $result:expr,
        $($message:tt)+
    ) => {
        ::tracing::info!(
            event.kind = $crate::event_log::event::KIND,
            event.category = $category,
            event.action = $action,
            event.entity_type = $entity_type,
            event.entity_id = %$entity_id,
            event.actor_id = %$actor,
            event.result = $result,
            $($message)+
        )
    };
}

/// イベントフィールドの値
pub mod event {
    pub const KIND: &str = "business_event";

    pub mod category {
        pub const WORKFLOW: &str = "workflow";
        pub const QUERY: &str = "query";
        pub const RESPONSE: &str = "response";
    }

    pub mod action {
        pub const WORKFLOW_CREATED: &str = "workflow.created";
        pub const WORKFLOW_TRANSITIONED: &str = "workflow.transitioned";

        pub const QUERY_RAISED: &str = "query.raised";
        pub const QUERY_RESOLVED: &str = "query.resolved";

        pub const RESPONSE_DRAFT_SAVED: &str = "response.draft_saved";
        pub const RESPONSE_SUBMITTED: &str = "response.submitted";
        pub const RESPONSE_VALIDATED: &str = "response.validated";
    }

    pub mod entity_type {
        pub const MATERIAL_WORKFLOW: &str = "material_workflow";
        pub const QUERY: &str = "query";
        pub const QUESTIONNAIRE_RESPONSE: &str = "questionnaire_response";
    }

    pub mod result {
        pub const SUCCESS: &str = "success";
        /// 操作自体は完了したが、業務上の否定的な結果（不正判定など）
        pub const FAILURE: &str = "failure";
    }

    /// 真偽値を `SUCCESS` / `FAILURE` に写像する
    pub fn result_of(ok: bool) -> &'static str {
        if ok { result::SUCCESS } else { result::FAILURE }
    }
}
