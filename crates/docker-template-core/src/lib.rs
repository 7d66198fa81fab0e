//! docker-template core
//!
//! 設定ファイルの読み込み、タグの解決、テンプレートの展開を提供します。

pub mod error;
pub mod loader;
pub mod model;
pub mod resolver;
pub mod template;

pub use error::{CoreError, Result};
pub use loader::{ConfigFormat, find_configuration, load_configuration};
pub use model::{BuildConfiguration, ConfigSection, ResolutionPolicy, ResolvedTarget, TemplateContext};
pub use resolver::{list_tags, resolve, short_tag, split_name_tag};
pub use template::TemplateRenderer;
