/// R-tree 错误类型
#[derive(Debug, thiserror::Error)]
pub enum RTreeError {
    #[error("Invalid tree configuration: max_entries={max_entries}, min_entries={min_entries} (require 2 <= min_entries <= max_entries / 2)")]
    InvalidConfig {
        max_entries: usize,
        min_entries: usize,
    },
    #[error("Invalid rectangle: {0}")]
    InvalidRectangle(String),
    #[error("Cannot sample an entry from an empty tree")]
    EmptyTree,
    #[error("Tree invariant violated: {0}")]
    Corrupted(String),
    #[error("Failed to load config: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Failed to serialize config: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Failed to export JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RTreeError>;
