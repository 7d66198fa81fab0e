//! 設定データモデル
//!
//! 設定ファイルから読み込んだタグとテンプレートコンテキストの対応表、
//! およびタグ解決の結果を表す型を定義します。

use std::fmt;

/// テンプレートに渡すコンテキスト（任意のキー/値データ）
pub type TemplateContext = serde_json::Value;

/// 設定ファイル内のセクション名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    /// `BUILDS` セクション（docker-template）
    Builds,
    /// `CONTEXTS` セクション（jinja2-render）
    Contexts,
}

impl ConfigSection {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigSection::Builds => "BUILDS",
            ConfigSection::Contexts => "CONTEXTS",
        }
    }

    /// セクション名として受け付けるか（大文字・小文字表記の両方を許可）
    pub fn matches(&self, key: &str) -> bool {
        key == self.name() || key == self.name().to_lowercase()
    }

    /// 設定ファイル探索時のファイル名（拡張子なし）
    pub fn default_stem(&self) -> &'static str {
        match self {
            ConfigSection::Builds => "build_configuration",
            ConfigSection::Contexts => "contexts",
        }
    }
}

impl fmt::Display for ConfigSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// タグ名 → テンプレートコンテキストの対応表
///
/// 挿入順を保持します（serde_json の `preserve_order`）。
/// 呼び出しごとに一度だけ構築され、以降は読み取り専用です。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildConfiguration {
    entries: serde_json::Map<String, TemplateContext>,
}

impl BuildConfiguration {
    pub fn new(entries: serde_json::Map<String, TemplateContext>) -> Self {
        Self { entries }
    }

    /// タグ名を挿入順に返す
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, tag: &str) -> Option<&TemplateContext> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, TemplateContext)> for BuildConfiguration {
    fn from_iter<I: IntoIterator<Item = (String, TemplateContext)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// 要求されたタグ文字列の解決方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// `name:tag` を最初の `:` で分割し、タグ部分でコンテキストを引く
    #[default]
    SplitOnFirstColon,
    /// 文字列全体をコンテキストのキー兼イメージタグとして扱う
    WholeStringKey,
}

/// タグ解決の結果
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    /// コンテキストを引いたキー
    pub context_key: String,
    pub context: TemplateContext,
    /// レジストリ付きのイメージ名（`WholeStringKey` では None）
    pub image_name: Option<String>,
    /// `3.9.1` のような完全なタグ
    pub primary_tag: String,
    /// 最後の `.` 区切りを落としたタグ（`3.9.1` → `3.9`）
    pub short_tag: String,
}

impl ResolvedTarget {
    /// `image:tag` 形式の参照を作る
    ///
    /// イメージ名がない場合はタグそのものを参照として使います。
    pub fn reference(&self, tag: &str) -> String {
        match &self.image_name {
            Some(name) => format!("{}:{}", name, tag),
            None => tag.to_string(),
        }
    }
}
