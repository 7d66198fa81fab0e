pub mod build;
pub mod list_tags;
pub mod render;
