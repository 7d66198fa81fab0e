//! 設定ファイルの読み込み
//!
//! YAML / JSON / KDL の宣言的な設定ファイルから `BUILDS`（または `CONTEXTS`）
//! セクションを取り出し、[`BuildConfiguration`] に変換します。

use crate::error::{CoreError, Result};
use crate::model::{BuildConfiguration, ConfigSection, TemplateContext};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 探索時に試す拡張子（優先順）
const CANDIDATE_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "kdl"];

/// 設定ファイルの形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Kdl,
}

impl ConfigFormat {
    /// 拡張子から形式を判定
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            "kdl" => Some(ConfigFormat::Kdl),
            _ => None,
        }
    }
}

/// 作業ディレクトリから設定ファイルを探す
///
/// `<stem>.yaml`, `<stem>.yml`, `<stem>.json`, `<stem>.kdl` の順に検索します。
/// どれも見つからない場合は最初の候補を `ConfigNotFound` として返します。
pub fn find_configuration(base_dir: &Path, section: ConfigSection) -> Result<PathBuf> {
    let stem = section.default_stem();

    for ext in CANDIDATE_EXTENSIONS {
        let path = base_dir.join(format!("{stem}.{ext}"));
        if path.is_file() {
            debug!(path = %path.display(), "Found configuration file");
            return Ok(path);
        }
    }

    Err(CoreError::ConfigNotFound {
        path: absolute(&base_dir.join(format!("{stem}.{}", CANDIDATE_EXTENSIONS[0]))),
    })
}

/// 設定ファイルを読み込み、指定セクションを取り出す
#[tracing::instrument(skip_all, fields(path = %path.display(), section = %section))]
pub fn load_configuration(path: &Path, section: ConfigSection) -> Result<BuildConfiguration> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| CoreError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CoreError::ConfigNotFound {
            path: absolute(path),
        },
        _ => CoreError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;

    let config = match format {
        ConfigFormat::Yaml => parse_yaml(&content, path, section)?,
        ConfigFormat::Json => parse_json(&content, path, section)?,
        ConfigFormat::Kdl => parse_kdl(&content, path, section)?,
    };

    info!(tag_count = config.len(), "Loaded configuration");
    Ok(config)
}

fn parse_yaml(content: &str, path: &Path, section: ConfigSection) -> Result<BuildConfiguration> {
    let doc: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| parse_error(path, e))?;

    let root = doc
        .as_mapping()
        .ok_or_else(|| parse_error(path, "top level must be a mapping"))?;

    let section_value = root
        .iter()
        .find(|(key, _)| key.as_str().is_some_and(|k| section.matches(k)))
        .map(|(_, value)| value)
        .ok_or_else(|| missing_section(path, section))?;

    // `BUILDS:` だけ書かれた空セクション
    if section_value.is_null() {
        return Ok(BuildConfiguration::default());
    }

    let entries = section_value
        .as_mapping()
        .ok_or_else(|| parse_error(path, format!("`{section}` must be a mapping")))?;

    let mut config = serde_json::Map::new();
    for (key, value) in entries {
        let tag = yaml_key_to_string(key)
            .ok_or_else(|| parse_error(path, format!("unsupported key in `{section}`: {key:?}")))?;
        let context = yaml_to_json(value).map_err(|e| parse_error(path, e))?;
        config.insert(tag, context);
    }

    Ok(BuildConfiguration::new(config))
}

/// YAMLの値をJSON値に変換
///
/// マッピングのキーはどの階層でも `yaml_key_to_string` で文字列にします
/// （`ports: {80: http}` のような整数キーも受け付ける）。タグ付きの値は中身を使います。
fn yaml_to_json(value: &serde_yaml::Value) -> std::result::Result<TemplateContext, String> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => serde_json::Value::Null,
        Yaml::Bool(b) => serde_json::Value::Bool(*b),
        Yaml::Number(n) => yaml_number_to_json(n),
        Yaml::String(s) => serde_json::Value::String(s.clone()),
        Yaml::Sequence(items) => serde_json::Value::Array(
            items
                .iter()
                .map(yaml_to_json)
                .collect::<std::result::Result<_, _>>()?,
        ),
        Yaml::Mapping(entries) => {
            let mut object = serde_json::Map::new();
            for (key, value) in entries {
                let key = yaml_key_to_string(key)
                    .ok_or_else(|| format!("unsupported mapping key: {key:?}"))?;
                object.insert(key, yaml_to_json(value)?);
            }
            serde_json::Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value)?,
    })
}

fn yaml_number_to_json(n: &serde_yaml::Number) -> serde_json::Value {
    if let Some(i) = n.as_i64() {
        serde_json::Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        serde_json::Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// YAMLのキーを文字列に変換
///
/// 引用符なしの `3.9.1` は文字列になりますが、`3.10` は浮動小数点数として
/// 読まれ `3.1` になってしまうため警告を出します。
fn yaml_key_to_string(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => {
            if n.is_f64() {
                warn!(key = %n, "Numeric key was read as a float; quote it to keep the exact spelling");
            }
            Some(n.to_string())
        }
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_json(content: &str, path: &Path, section: ConfigSection) -> Result<BuildConfiguration> {
    let doc: serde_json::Value =
        serde_json::from_str(content).map_err(|e| parse_error(path, e))?;

    let root = doc
        .as_object()
        .ok_or_else(|| parse_error(path, "top level must be an object"))?;

    let section_value = root
        .iter()
        .find(|(key, _)| section.matches(key))
        .map(|(_, value)| value)
        .ok_or_else(|| missing_section(path, section))?;

    match section_value {
        serde_json::Value::Null => Ok(BuildConfiguration::default()),
        serde_json::Value::Object(entries) => Ok(BuildConfiguration::new(entries.clone())),
        _ => Err(parse_error(path, format!("`{section}` must be an object"))),
    }
}

fn parse_kdl(content: &str, path: &Path, section: ConfigSection) -> Result<BuildConfiguration> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e| parse_error(path, e))?;

    let section_node = doc
        .nodes()
        .iter()
        .find(|node| section.matches(node.name().value()))
        .ok_or_else(|| missing_section(path, section))?;

    let Some(children) = section_node.children() else {
        return Ok(BuildConfiguration::default());
    };

    Ok(children
        .nodes()
        .iter()
        .map(|node| (node.name().value().to_string(), kdl_node_to_json(node)))
        .collect())
}

/// KDLノードをJSON値に変換
///
/// - 子ノードあり → 子ノード（とプロパティ）のオブジェクト
/// - プロパティあり → プロパティのオブジェクト
/// - 引数1つ → その値、複数 → 配列、なし → null
fn kdl_node_to_json(node: &kdl::KdlNode) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    let mut arguments = Vec::new();

    for entry in node.entries() {
        let value = kdl_value_to_json(entry.value());
        match entry.name() {
            Some(name) => {
                properties.insert(name.value().to_string(), value);
            }
            None => arguments.push(value),
        }
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            properties.insert(child.name().value().to_string(), kdl_node_to_json(child));
        }
        return serde_json::Value::Object(properties);
    }

    if !properties.is_empty() {
        if !arguments.is_empty() {
            debug!(node = %node.name().value(), "Ignoring positional arguments next to properties");
        }
        return serde_json::Value::Object(properties);
    }

    match arguments.len() {
        0 => serde_json::Value::Null,
        1 => arguments.remove(0),
        _ => serde_json::Value::Array(arguments),
    }
}

fn kdl_value_to_json(value: &kdl::KdlValue) -> serde_json::Value {
    if let Some(s) = value.as_string() {
        serde_json::Value::String(s.to_string())
    } else if let Some(i) = value.as_integer() {
        i64::try_from(i)
            .map(|i| serde_json::Value::Number(i.into()))
            .unwrap_or_else(|_| serde_json::Value::String(i.to_string()))
    } else if let Some(f) = value.as_float() {
        serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    } else if let Some(b) = value.as_bool() {
        serde_json::Value::Bool(b)
    } else {
        serde_json::Value::Null
    }
}

fn parse_error(path: &Path, e: impl std::fmt::Display) -> CoreError {
    CoreError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn missing_section(path: &Path, section: ConfigSection) -> CoreError {
    CoreError::MissingSection {
        path: path.to_path_buf(),
        section: section.name().to_string(),
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_yaml_keeps_order() {
        let temp_dir = tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "build_configuration.yaml",
            r#"
BUILDS:
  "3.9.1":
    base: python:3.9.1
    packages: [git, curl]
  "2.7.18":
    base: python:2.7.18
  "3.8.6":
    base: python:3.8.6
"#,
        );

        let config = load_configuration(&path, ConfigSection::Builds).unwrap();

        let tags: Vec<&str> = config.tags().collect();
        assert_eq!(tags, vec!["3.9.1", "2.7.18", "3.8.6"]);
        assert_eq!(
            config.get("3.9.1").unwrap(),
            &json!({"base": "python:3.9.1", "packages": ["git", "curl"]})
        );
    }

    #[test]
    fn test_load_yaml_lowercase_section() {
        let temp_dir = tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "contexts.yml",
            "contexts:\n  stable:\n    version: 1\n",
        );

        let config = load_configuration(&path, ConfigSection::Contexts).unwrap();
        assert_eq!(config.get("stable").unwrap(), &json!({"version": 1}));
    }

    #[test]
    fn test_load_yaml_numeric_keys() {
        let temp_dir = tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "build_configuration.yaml",
            "BUILDS:\n  3.9.1: {}\n  12: {}\n",
        );

        let config = load_configuration(&path, ConfigSection::Builds).unwrap();
        assert!(config.contains("3.9.1"));
        assert!(config.contains("12"));
    }

    #[test]
    fn test_load_yaml_nested_non_string_keys() {
        let temp_dir = tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "build_configuration.yaml",
            r#"
BUILDS:
  "1.0":
    ports:
      80: http
      443: https
    flags:
      true: enabled
    layers:
      - {1: base}
"#,
        );

        let config = load_configuration(&path, ConfigSection::Builds).unwrap();
        assert_eq!(
            config.get("1.0").unwrap(),
            &json!({
                "ports": {"80": "http", "443": "https"},
                "flags": {"true": "enabled"},
                "layers": [{"1": "base"}]
            })
        );
    }

    #[test]
    fn test_load_yaml_rejects_sequence_key() {
        let temp_dir = tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "build_configuration.yaml",
            "BUILDS:\n  \"1.0\":\n    ? [a, b]\n    : value\n",
        );

        let result = load_configuration(&path, ConfigSection::Builds);
        assert!(matches!(result, Err(CoreError::ConfigParse { .. })));
    }

    #[test]
    fn test_load_json() {
        let temp_dir = tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "build_configuration.json",
            r#"{"BUILDS": {"b": {"x": 1}, "a": {"x": 2}}}"#,
        );

        let config = load_configuration(&path, ConfigSection::Builds).unwrap();
        let tags: Vec<&str> = config.tags().collect();
        assert_eq!(tags, vec!["b", "a"]);
        assert_eq!(config.get("a").unwrap(), &json!({"x": 2}));
    }

    #[test]
    fn test_load_kdl() {
        let temp_dir = tempdir().unwrap();
        let path = write(
            temp_dir.path(),
            "build_configuration.kdl",
            r#"
builds {
    "3.9.1" {
        base "python:3.9.1"
        packages "git" "curl"
        debug #true
        user name="app" uid=1000
    }
    "3.8.6" {
        base "python:3.8.6"
    }
}
"#,
        );

        let config = load_configuration(&path, ConfigSection::Builds).unwrap();

        let tags: Vec<&str> = config.tags().collect();
        assert_eq!(tags, vec!["3.9.1", "3.8.6"]);
        assert_eq!(
            config.get("3.9.1").unwrap(),
            &json!({
                "base": "python:3.9.1",
                "packages": ["git", "curl"],
                "debug": true,
                "user": {"name": "app", "uid": 1000}
            })
        );
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nope.yaml");

        let result = load_configuration(&path, ConfigSection::Builds);
        assert!(matches!(result, Err(CoreError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = tempdir().unwrap();
        let path = write(temp_dir.path(), "build_configuration.py", "BUILDS = {}");

        let result = load_configuration(&path, ConfigSection::Builds);
        assert!(matches!(result, Err(CoreError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_missing_section() {
        let temp_dir = tempdir().unwrap();
        let path = write(temp_dir.path(), "contexts.yaml", "BUILDS:\n  a: {}\n");

        let result = load_configuration(&path, ConfigSection::Contexts);
        match result {
            Err(CoreError::MissingSection { section, .. }) => assert_eq!(section, "CONTEXTS"),
            other => panic!("Expected MissingSection, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_section() {
        let temp_dir = tempdir().unwrap();
        let path = write(temp_dir.path(), "build_configuration.yaml", "BUILDS:\n");

        let config = load_configuration(&path, ConfigSection::Builds).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = write(temp_dir.path(), "build_configuration.yaml", "BUILDS: [unclosed");

        let result = load_configuration(&path, ConfigSection::Builds);
        assert!(matches!(result, Err(CoreError::ConfigParse { .. })));
    }

    #[test]
    fn test_find_configuration_priority() {
        let temp_dir = tempdir().unwrap();
        write(temp_dir.path(), "build_configuration.kdl", "builds {}");
        write(temp_dir.path(), "build_configuration.yml", "BUILDS:\n");

        let found = find_configuration(temp_dir.path(), ConfigSection::Builds).unwrap();
        assert!(found.ends_with("build_configuration.yml"));
    }

    #[test]
    fn test_find_configuration_not_found() {
        let temp_dir = tempdir().unwrap();

        match find_configuration(temp_dir.path(), ConfigSection::Contexts) {
            Err(CoreError::ConfigNotFound { path }) => assert!(path.ends_with("contexts.yaml")),
            other => panic!("Expected ConfigNotFound, got {:?}", other),
        }
    }
}
