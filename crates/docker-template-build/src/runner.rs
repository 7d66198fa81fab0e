//! ビルドコマンドの実行

use crate::command::BuildCommand;
use crate::error::{BuildError, BuildResult};
use std::path::PathBuf;
use std::process::Command;
use tracing::info;

/// ビルドコマンドを実行するもの
///
/// 終了コードを返します。0以外の扱いは呼び出し側が決めます。
pub trait CommandRunner {
    fn run(&self, command: &BuildCommand) -> BuildResult<i32>;
}

/// サブプロセスとして実行するランナー
///
/// シェルは経由せず、標準入出力は親プロセスのものを引き継ぎます。
#[derive(Debug, Default)]
pub struct ProcessRunner {
    working_dir: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// ビルドコンテキスト `.` の基準ディレクトリを指定
    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(working_dir.into()),
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &BuildCommand) -> BuildResult<i32> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        info!(command = %command, "Running build tool");

        let status = cmd.status().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BuildError::ToolNotFound(command.program().to_string()),
            _ => BuildError::Spawn {
                program: command.program().to_string(),
                message: e.to_string(),
            },
        })?;

        info!(%status, "Build tool finished");
        status
            .code()
            .ok_or_else(|| BuildError::Terminated(status.to_string()))
    }
}

/// ビルドを実行し、0以外の終了コードを `BuildFailed` にする
pub fn run_build(runner: &dyn CommandRunner, command: &BuildCommand) -> BuildResult<()> {
    match runner.run(command)? {
        0 => Ok(()),
        code => Err(BuildError::BuildFailed {
            program: command.program().to_string(),
            code,
        }),
    }
}
