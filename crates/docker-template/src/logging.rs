use tracing_subscriber::EnvFilter;

/// ログ出力を初期化
///
/// 標準出力はタグ一覧やドライラン結果に使うため、ログは標準エラーに出します。
/// `RUST_LOG` が設定されていればそちらを優先します。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
