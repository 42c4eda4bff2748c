//! # MatFlow Core Service
//!
//! マテリアル質問票ワークフローのユースケース層。
//! リポジトリ・時計・遷移ポリシー・SLA ポリシーを注入して組み立てる。
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`error`] - ユースケース層のエラー
//! - [`usecase`] - ワークフロー操作

pub mod config;
pub mod error;
pub mod usecase;
