//! テンプレート展開機能
//!
//! Teraを使用してDockerfileテンプレートを展開します。
//! Jinja2 の `trim_blocks` / `lstrip_blocks` 相当の空白処理を行ってから
//! Teraに渡します。

use crate::error::{CoreError, Result};
use crate::model::TemplateContext;
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tera::{Context, Tera};
use tracing::{debug, info};

/// 行頭の空白に続くブロックタグ・コメント（lstrip_blocks）
static LSTRIP_BLOCKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]+(\{[%#])").unwrap());

/// ブロックタグ・コメント直後の改行（trim_blocks）
static TRIM_BLOCKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([%#]\})\r?\n").unwrap());

/// テンプレートレンダラー
///
/// テンプレートと出力ファイルのパスは `base_dir`（通常はカレントディレクトリ）
/// からの相対パスとして解決されます。
pub struct TemplateRenderer {
    base_dir: PathBuf,
}

impl TemplateRenderer {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// 文字列をテンプレートとして展開
    ///
    /// `name` はエラーメッセージに使うテンプレート名です。
    pub fn render_str(&self, name: &Path, source: &str, context: &TemplateContext) -> Result<String> {
        let template_name = name.display().to_string();
        let source = normalize_block_whitespace(source);

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(&template_name, &source)
            .map_err(|e| CoreError::TemplateSyntax {
                file: name.to_path_buf(),
                message: extract_tera_error_detail(&e),
            })?;

        let context = build_context(name, context)?;

        tera.render(&template_name, &context)
            .map_err(|e| CoreError::TemplateRender {
                file: name.to_path_buf(),
                message: extract_tera_error_detail(&e),
            })
    }

    /// ファイルを読み込んでテンプレート展開
    #[tracing::instrument(skip(self, context), fields(template = %template.display()))]
    pub fn render_file(&self, template: &Path, context: &TemplateContext) -> Result<String> {
        let path = self.resolve(template);
        let source = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::TemplateNotFound(template.to_path_buf()),
            _ => CoreError::IoError {
                path: path.clone(),
                message: e.to_string(),
            },
        })?;

        debug!(bytes = source.len(), "Read template");
        self.render_str(template, &source, context)
    }

    /// テンプレートを展開して出力ファイルに書き込む
    ///
    /// 既存のファイルは上書きされます。展開に失敗した場合は何も書き込みません。
    pub fn render_to_file(
        &self,
        template: &Path,
        context: &TemplateContext,
        output: &Path,
    ) -> Result<()> {
        let rendered = self.render_file(template, context)?;

        let output_path = self.resolve(output);
        std::fs::write(&output_path, rendered.as_bytes()).map_err(|e| CoreError::IoError {
            path: output_path.clone(),
            message: e.to_string(),
        })?;

        info!(
            template = %template.display(),
            output = %output_path.display(),
            bytes = rendered.len(),
            "Rendered template"
        );
        Ok(())
    }
}

/// コンテキストをTeraのContextに変換
///
/// null は空のコンテキストとして扱います。
fn build_context(name: &Path, context: &TemplateContext) -> Result<Context> {
    match context {
        serde_json::Value::Null => Ok(Context::new()),
        serde_json::Value::Object(_) => Context::from_value(context.clone())
            .map_err(|_| CoreError::InvalidContext(name.display().to_string())),
        _ => Err(CoreError::InvalidContext(name.display().to_string())),
    }
}

/// Jinja2 の `trim_blocks=True, lstrip_blocks=True` 相当の空白処理
///
/// - 行頭からブロックタグ（`{%`）またはコメント（`{#`）までの空白を除去
/// - ブロックタグ・コメントの直後の改行を1つ除去
///
/// 字句解析はせず文字列パターンで処理するため、式の文字列リテラルや
/// 地のテキストに現れる `%}` / `#}` の直後の改行も除去されます
/// （Jinja2 は本物のブロックタグの後だけを対象にする）。
pub fn normalize_block_whitespace(source: &str) -> Cow<'_, str> {
    match LSTRIP_BLOCKS.replace_all(source, "${1}") {
        Cow::Borrowed(s) => TRIM_BLOCKS.replace_all(s, "${1}"),
        Cow::Owned(s) => Cow::Owned(TRIM_BLOCKS.replace_all(&s, "${1}").into_owned()),
    }
}

/// Teraエラーから詳細情報を抽出
///
/// sourceチェーンをたどり、未定義変数の場合はその名前を示します。
fn extract_tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }

    let full_error = details.join(" | ");

    if full_error.contains("not found in context")
        && let Some(start) = full_error.find("Variable `")
        && let Some(end) = full_error[start..].find("` not found")
    {
        let var_name = &full_error[start + 10..start + end];
        return format!(
            "undefined variable: `{}`\nhint: add it to the context of the selected tag",
            var_name
        );
    }

    full_error
}
