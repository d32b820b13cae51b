//! 日誌初始化（tracing-subscriber）

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日誌
///
/// `RUST_LOG` 優先；未設定時為 `info`，`verbose` 時為 `debug`。
/// 日誌輸出至 stderr，不干擾表格或匯出內容。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_line_number(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 初始化測試用日誌
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
