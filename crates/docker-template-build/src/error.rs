use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build tool not found: {0}")]
    ToolNotFound(String),

    #[error("Failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("Build failed: {program} exited with status {code}")]
    BuildFailed { program: String, code: i32 },

    #[error("Build tool was terminated: {0}")]
    Terminated(String),

    #[error("Pushing requires a target platform, but `--push` was passed to a local build")]
    PushWithoutPlatform,
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::ToolNotFound(program) => {
                format!(
                    "Build tool not found: {}\n\
                     \n\
                     Install it or point --builder / DOCKER_TEMPLATE_BUILDER at another tool\n\
                     (for example `podman`).",
                    program
                )
            }
            BuildError::PushWithoutPlatform => {
                "Pushing is only done by multi-platform builds.\n\
                 \n\
                 Pass --platform (for example `--platform linux/amd64,linux/arm64`)\n\
                 or use `buildx` instead of adding --push to the additional arguments."
                    .to_string()
            }
            _ => format!("{}", self),
        }
    }

    /// プロセスの終了コードとして伝搬すべき値
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildError::BuildFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
