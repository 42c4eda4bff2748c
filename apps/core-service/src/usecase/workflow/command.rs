//! ワークフローユースケースの状態変更操作

mod lifecycle;
mod query_resolution;
mod questionnaire;
