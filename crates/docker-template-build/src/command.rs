//! ビルドコマンドの組み立て
//!
//! 解決済みのタグからイメージ参照を導出し、`docker build` または
//! `docker buildx build` のコマンドを構造化された形で組み立てます。
//! シェルを経由しないため、タグやレジストリの文字列が解釈されることはありません。

use crate::error::{BuildError, BuildResult};
use docker_template_core::ResolvedTarget;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// デフォルトのビルドツール
pub const DEFAULT_PROGRAM: &str = "docker";

/// ビルドツールが暗黙に読むDockerfile名
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

const PULL_FLAG: &str = "--pull";
const PUSH_FLAG: &str = "--push";

/// 実行するビルドコマンド（プログラム名 + 引数列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    program: String,
    args: Vec<String>,
    image_refs: Vec<String>,
    platform: Option<String>,
}

impl BuildCommand {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `-t` で付けるイメージ参照
    pub fn image_refs(&self) -> &[String] {
        &self.image_refs
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    pub fn pushes(&self) -> bool {
        self.args.iter().any(|a| a == PUSH_FLAG)
    }

    pub fn pulls(&self) -> bool {
        self.args.iter().any(|a| a == PULL_FLAG)
    }

    /// 表示用のコマンドライン（必要な引数のみクォート）
    pub fn to_command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_command_line())
    }
}

/// ビルド要求
///
/// `platform` が指定されると buildx によるマルチプラットフォームビルドになり、
/// 常にレジストリへのプッシュを伴います。
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    target: &'a ResolvedTarget,
    platform: Option<String>,
    include_latest: bool,
    explicit_tags: Vec<String>,
    additional_args: Vec<String>,
    dockerfile: Option<PathBuf>,
    program: String,
}

impl<'a> BuildRequest<'a> {
    pub fn new(target: &'a ResolvedTarget) -> Self {
        Self {
            target,
            platform: None,
            include_latest: false,
            explicit_tags: Vec::new(),
            additional_args: Vec::new(),
            dockerfile: None,
            program: DEFAULT_PROGRAM.to_string(),
        }
    }

    /// ターゲットプラットフォーム（例: `linux/amd64,linux/arm64`）
    pub fn platform(mut self, platform: Option<impl Into<String>>) -> Self {
        self.platform = platform.map(Into::into).filter(|p: &String| !p.is_empty());
        self
    }

    /// 短縮タグと `latest` も付ける
    pub fn include_latest(mut self, include_latest: bool) -> Self {
        self.include_latest = include_latest;
        self
    }

    /// 明示的な `name:tag` の一覧（導出されるイメージ参照を置き換える）
    pub fn explicit_tags(mut self, tags: Vec<String>) -> Self {
        self.explicit_tags = tags;
        self
    }

    /// ビルドツールにそのまま渡す追加引数
    pub fn additional_args(mut self, args: Vec<String>) -> Self {
        self.additional_args = args;
        self
    }

    /// レンダリング先のDockerfile（`Dockerfile` 以外なら `-f` を付ける）
    pub fn dockerfile(mut self, dockerfile: Option<PathBuf>) -> Self {
        self.dockerfile = dockerfile;
        self
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// ビルドコマンドを組み立てる
    pub fn build(&self) -> BuildResult<BuildCommand> {
        let image_refs = image_references(self.target, self.include_latest, &self.explicit_tags);

        let mut args: Vec<String> = Vec::new();
        match &self.platform {
            Some(platform) => {
                args.extend(["buildx".to_string(), "build".to_string()]);
                args.push(format!("--platform={}", platform));
                args.push(PULL_FLAG.to_string());
                args.push(PUSH_FLAG.to_string());
            }
            None => {
                args.push("build".to_string());
                args.push(PULL_FLAG.to_string());
            }
        }

        for arg in &self.additional_args {
            match arg.as_str() {
                PULL_FLAG => continue,
                PUSH_FLAG if self.platform.is_some() => continue,
                PUSH_FLAG => return Err(BuildError::PushWithoutPlatform),
                _ => args.push(arg.clone()),
            }
        }

        if let Some(dockerfile) = &self.dockerfile
            && dockerfile.as_os_str() != DEFAULT_DOCKERFILE
        {
            args.push("-f".to_string());
            args.push(dockerfile.display().to_string());
        }

        for image in &image_refs {
            args.push("-t".to_string());
            args.push(image.clone());
        }

        args.push(".".to_string());

        let command = BuildCommand {
            program: self.program.clone(),
            args,
            image_refs,
            platform: self.platform.clone(),
        };
        debug!(command = %command, "Assembled build command");
        Ok(command)
    }
}

/// イメージ参照を導出
///
/// 優先順位:
/// 1. 明示的なタグ指定（`--tag`）
/// 2. `image:primary`（`include_latest` なら `image:short` と `image:latest` も）
///
/// 重複は順序を保ったまま取り除きます。
pub fn image_references(
    target: &ResolvedTarget,
    include_latest: bool,
    explicit_tags: &[String],
) -> Vec<String> {
    if !explicit_tags.is_empty() {
        if include_latest {
            warn!("--latest is ignored when image tags are given explicitly");
        }
        return dedup(explicit_tags.iter().cloned());
    }

    let mut refs = vec![target.reference(&target.primary_tag)];
    if include_latest && target.image_name.is_some() {
        refs.push(target.reference(&target.short_tag));
        refs.push(target.reference("latest"));
    } else if include_latest {
        warn!("--latest needs an image name; only the primary tag is used");
    }
    dedup(refs)
}

fn dedup(refs: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for r in refs {
        if !seen.contains(&r) {
            seen.push(r);
        }
    }
    seen
}

/// シェル用にエスケープ（安全な文字だけなら何もしない）
pub fn shell_quote(s: &str) -> String {
    let is_safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@+%".contains(c));
    if is_safe {
        s.to_string()
    } else {
        // シングルクォートでラップしてエスケープ
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}
