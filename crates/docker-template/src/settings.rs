//! 実行時設定
//!
//! コマンドライン引数（と環境変数）から起動時に一度だけ組み立て、
//! 各アクションへ参照で渡します。

use docker_template_build::DEFAULT_PROGRAM;
use docker_template_core::{
    BuildConfiguration, ConfigSection, ResolutionPolicy, TemplateRenderer, find_configuration,
    load_configuration,
};
use std::path::PathBuf;
use tracing::debug;

/// デフォルトのテンプレートファイル
pub const DEFAULT_TEMPLATE_FILE: &str = "Dockerfile.jinja2";

/// デフォルトの出力ファイル
pub const DEFAULT_OUTPUT_FILE: &str = "Dockerfile";

/// 全アクション共通の設定
#[derive(Debug, Clone)]
pub struct Settings {
    /// テンプレート・出力・ビルドコンテキストの基準ディレクトリ
    pub working_dir: PathBuf,
    /// 明示的に指定された設定ファイル
    pub config_file: Option<PathBuf>,
    pub section: ConfigSection,
}

impl Settings {
    /// カレントディレクトリを基準に作成
    pub fn from_current_dir(section: ConfigSection) -> anyhow::Result<Self> {
        Ok(Self::new(std::env::current_dir()?, section))
    }

    pub fn new(working_dir: impl Into<PathBuf>, section: ConfigSection) -> Self {
        Self {
            working_dir: working_dir.into(),
            config_file: None,
            section,
        }
    }

    pub fn with_config_file(mut self, config_file: Option<PathBuf>) -> Self {
        self.config_file = config_file;
        self
    }

    /// 使用する設定ファイルのパス
    ///
    /// 明示されていなければ基準ディレクトリから探索します。
    pub fn config_path(&self) -> docker_template_core::Result<PathBuf> {
        match &self.config_file {
            Some(path) => Ok(self.working_dir.join(path)),
            None => find_configuration(&self.working_dir, self.section),
        }
    }

    pub fn load_configuration(&self) -> docker_template_core::Result<BuildConfiguration> {
        let path = self.config_path()?;
        debug!(path = %path.display(), section = %self.section, "Using configuration file");
        load_configuration(&path, self.section)
    }

    pub fn renderer(&self) -> TemplateRenderer {
        TemplateRenderer::new(&self.working_dir)
    }
}

/// render / build 共通のオプション
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub tag: String,
    pub template_file: PathBuf,
    pub output: PathBuf,
    pub policy: ResolutionPolicy,
}

impl RenderOptions {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            template_file: PathBuf::from(DEFAULT_TEMPLATE_FILE),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            policy: ResolutionPolicy::default(),
        }
    }
}

/// build 専用のオプション
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub registry: Option<String>,
    pub platform: Option<String>,
    pub include_latest: bool,
    pub explicit_tags: Vec<String>,
    /// 空白で分割済みの追加引数
    pub additional_args: Vec<String>,
    pub dry: bool,
    pub builder: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            registry: None,
            platform: None,
            include_latest: false,
            explicit_tags: Vec::new(),
            additional_args: Vec::new(),
            dry: false,
            builder: DEFAULT_PROGRAM.to_string(),
        }
    }
}

/// `-a "--no-cache --network host"` のような指定を引数ごとに分割
pub fn split_additional_args(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split_whitespace())
        .map(str::to_string)
        .collect()
}
