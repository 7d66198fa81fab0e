//! docker-template CLI
//!
//! `docker-template` と `jinja2-render` の2つのコマンドが共有する
//! 設定・アクション・エラー表示をまとめています。

pub mod commands;
pub mod logging;
pub mod settings;

use colored::Colorize;
use docker_template_build::BuildError;
use std::process::ExitCode;

/// エラーを表示し、プロセスの終了コードを決める
///
/// ビルドツールが0以外で終了した場合はその終了コードをそのまま返します。
pub fn report_error(err: &anyhow::Error) -> ExitCode {
    if let Some(build_err) = err.downcast_ref::<BuildError>() {
        eprintln!("{} {}", "Error:".red().bold(), build_err.user_message());
        return match build_err.exit_code() {
            Some(code) => ExitCode::from(u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)),
            None => ExitCode::FAILURE,
        };
    }

    eprintln!("{} {:#}", "Error:".red().bold(), err);
    ExitCode::FAILURE
}
