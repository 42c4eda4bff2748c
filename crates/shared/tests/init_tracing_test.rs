//! init_tracing 統合テスト
//!
//! グローバル subscriber はプロセスに 1 つしか設定できないため、独立したテストバイナリで検証する。
//!
//! 実行方法:
//! ```bash
//! cargo test -p matflow-shared --features observability --test init_tracing_test
//! ```

use matflow_shared::observability::{LogFormat, TracingConfig, init_tracing};

#[test]
fn test_init_tracing_は一度だけ成功する() {
    let config = TracingConfig::new("matflow-test", LogFormat::Json);

    assert!(init_tracing(&config).is_ok());
    assert!(init_tracing(&config).is_err());
}
