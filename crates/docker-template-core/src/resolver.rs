//! タグ解決
//!
//! 要求されたタグ文字列（`name:tag` 形式）を設定と照合し、
//! テンプレートコンテキストとイメージ名・タグを導出します。

use crate::error::{CoreError, Result};
use crate::model::{BuildConfiguration, ResolutionPolicy, ResolvedTarget};
use tracing::debug;

/// 利用可能なタグを挿入順に列挙
///
/// 呼び出すたびに設定から新しいイテレータを作るため、何度でも列挙できます。
pub fn list_tags(config: &BuildConfiguration) -> impl Iterator<Item = &str> + '_ {
    config.tags()
}

/// `name:tag` を最初の `:` で分割
///
/// 2つ目以降の `:` はタグ側に含まれます（`a:b:c` → `("a", "b:c")`）。
pub fn split_name_tag(requested: &str) -> Result<(&str, &str)> {
    match requested.split_once(':') {
        Some((name, tag)) if !name.is_empty() && !tag.is_empty() => Ok((name, tag)),
        _ => Err(CoreError::MalformedTag(requested.to_string())),
    }
}

/// 短縮タグ（最後の `.` 区切りを落としたタグ）
///
/// `3.9.1` → `3.9`、`2.7.18-slim` → `2.7`、ドットを含まない `latest` はそのまま。
pub fn short_tag(tag: &str) -> &str {
    match tag.rsplit_once('.') {
        Some((head, _)) if !head.is_empty() => head,
        _ => tag,
    }
}

/// レジストリをイメージ名の前に付ける
pub fn qualify_image_name(name: &str, registry: Option<&str>) -> String {
    match registry.map(|r| r.trim_end_matches('/')) {
        Some(r) if !r.is_empty() => format!("{}/{}", r, name),
        _ => name.to_string(),
    }
}

/// 要求されたタグを解決
///
/// # Arguments
/// * `requested` - コマンドラインで指定されたタグ
/// * `config` - 読み込んだ設定
/// * `registry` - イメージ名に付けるレジストリ
/// * `policy` - タグ文字列の解決方法
#[tracing::instrument(skip(config))]
pub fn resolve(
    requested: &str,
    config: &BuildConfiguration,
    registry: Option<&str>,
    policy: ResolutionPolicy,
) -> Result<ResolvedTarget> {
    match policy {
        ResolutionPolicy::WholeStringKey => {
            let context = lookup(config, requested, requested)?;
            Ok(ResolvedTarget {
                context_key: requested.to_string(),
                context,
                image_name: None,
                primary_tag: requested.to_string(),
                short_tag: short_tag(requested).to_string(),
            })
        }
        ResolutionPolicy::SplitOnFirstColon => {
            let (name, tag) = split_name_tag(requested)?;

            // タグ部分で引き、なければ要求文字列全体で引く
            let key = if config.contains(tag) { tag } else { requested };
            let context = lookup(config, requested, key)?;

            let target = ResolvedTarget {
                context_key: key.to_string(),
                context,
                image_name: Some(qualify_image_name(name, registry)),
                primary_tag: tag.to_string(),
                short_tag: short_tag(tag).to_string(),
            };
            debug!(
                context_key = %target.context_key,
                image = ?target.image_name,
                primary_tag = %target.primary_tag,
                short_tag = %target.short_tag,
                "Resolved tag"
            );
            Ok(target)
        }
    }
}

fn lookup(config: &BuildConfiguration, requested: &str, key: &str) -> Result<serde_json::Value> {
    config
        .get(key)
        .cloned()
        .ok_or_else(|| CoreError::UnknownTag {
            tag: requested.to_string(),
            available: config.tags().map(str::to_string).collect(),
        })
}
