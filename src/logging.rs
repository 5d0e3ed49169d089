//! ログ初期化
//!
//! `RUST_LOG` があればそれを優先し、なければ設定ファイルの `log_level`
//! （`--verbose` 指定時は debug）を使う。標準出力はJSON結果に使うため、ログは標準エラーへ出す。

use tracing_subscriber::EnvFilter;

pub fn init(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
