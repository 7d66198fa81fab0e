#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// テスト用のビルド設定（Python イメージ3種）
pub const BUILD_CONFIGURATION: &str = r#"
BUILDS:
  "3.9.1":
    base: python:3.9.1
  "3.8.6":
    base: python:3.8.6
  "2.7.18":
    base: python:2.7.18
"#;

#[allow(dead_code)]
pub const TEMPLATE: &str = "FROM {{ base }}\n{% if packages is defined %}\nRUN pip install {{ packages | join(sep=\" \") }}\n{% endif %}\n";

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    #[allow(dead_code)]
    /// build_configuration.yaml とテンプレートを置いたプロジェクト
    pub fn with_defaults() -> Self {
        let project = Self::new();
        project.write_file("build_configuration.yaml", BUILD_CONFIGURATION);
        project.write_file("Dockerfile.jinja2", "FROM {{ base }}\n");
        project
    }

    pub fn write_file(&self, name: &str, content: &str) {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[allow(dead_code)]
    pub fn read_file(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.root.path().join(name)).ok()
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// プロジェクトディレクトリで実行するコマンド（環境変数の影響を除く）
    pub fn cmd(&self, bin: &str) -> Command {
        let mut cmd = Command::cargo_bin(bin).unwrap();
        cmd.current_dir(self.path())
            .env_remove("DOCKER_TEMPLATE_CONFIG")
            .env_remove("DOCKER_TEMPLATE_REGISTRY")
            .env_remove("DOCKER_TEMPLATE_BUILDER")
            .env_remove("JINJA2_RENDER_CONTEXTS")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}
