use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Cannot find file {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Unsupported configuration format: {}\nhint: use a .yaml, .yml, .json or .kdl file", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse configuration file: {}\nreason: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Configuration file {} does not define a `{section}` section", .path.display())]
    MissingSection { path: PathBuf, section: String },

    #[error("Unknown tag '{tag}'. Available tags: {}", .available.join(", "))]
    UnknownTag { tag: String, available: Vec<String> },

    #[error("Malformed tag '{0}': expected the 'name:tag' format")]
    MalformedTag(String),

    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Template syntax error: {}\nreason: {message}", .file.display())]
    TemplateSyntax { file: PathBuf, message: String },

    #[error("Template render error: {}\nreason: {message}", .file.display())]
    TemplateRender { file: PathBuf, message: String },

    #[error("Context for '{0}' must be a mapping")]
    InvalidContext(String),

    #[error("IO error: {}\nreason: {message}", .path.display())]
    IoError { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
