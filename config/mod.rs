use crate::error::{RTreeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// R-tree 配置
///
/// 构造之后不可修改；`max_entries` 和 `min_entries` 必须满足 `2 <= m <= M / 2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// 每个节点的最大条目数 M
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// 每个非根节点的最小条目数 m
    #[serde(default = "default_min_entries")]
    pub min_entries: usize,
}

fn default_max_entries() -> usize {
    5
}

fn default_min_entries() -> usize {
    2
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            min_entries: default_min_entries(),
        }
    }
}

impl TreeConfig {
    pub fn new(max_entries: usize, min_entries: usize) -> Result<Self> {
        let config = Self {
            max_entries,
            min_entries,
        };
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    ///
    /// 配置加载顺序（优先级从低到高）：
    /// 1. 默认配置（内嵌的 default.toml）
    /// 2. 用户配置文件（可选，不存在不报错）
    /// 3. 环境变量（RTREE__ 前缀，例如 `RTREE__MAX_ENTRIES=8`）
    ///
    /// ```no_run
    /// use guttman::TreeConfig;
    ///
    /// let config = TreeConfig::from_file("rtree.toml").unwrap();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(
                config::File::from(path.as_ref())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("RTREE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// 验证配置：`2 <= min_entries <= max_entries / 2`
    pub fn validate(&self) -> Result<()> {
        if self.min_entries < 2 || self.min_entries > self.max_entries / 2 {
            return Err(RTreeError::InvalidConfig {
                max_entries: self.max_entries,
                min_entries: self.min_entries,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TreeConfig::default();
        assert_eq!(config.max_entries, 5);
        assert_eq!(config.min_entries, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(TreeConfig::new(4, 2).is_ok());
        assert!(TreeConfig::new(16, 8).is_ok());

        // m 必须至少为 2
        assert!(matches!(
            TreeConfig::new(10, 1),
            Err(RTreeError::InvalidConfig { .. })
        ));
        // m 不能超过 M / 2
        assert!(matches!(
            TreeConfig::new(5, 3),
            Err(RTreeError::InvalidConfig {
                max_entries: 5,
                min_entries: 3
            })
        ));
        assert!(TreeConfig::new(3, 2).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rtree.toml");

        let config = TreeConfig::new(12, 4).unwrap();
        config.save_to_file(&path).unwrap();

        let loaded = TreeConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = TreeConfig::from_file(dir.path().join("missing.toml")).unwrap();
        assert_eq!(loaded, TreeConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "max_entries = 9\n").unwrap();

        let loaded = TreeConfig::from_file(&path).unwrap();
        assert_eq!(loaded.max_entries, 9);
        assert_eq!(loaded.min_entries, 2);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "max_entries = 4\nmin_entries = 3\n").unwrap();

        assert!(matches!(
            TreeConfig::from_file(&path),
            Err(RTreeError::InvalidConfig { .. })
        ));
    }
}
