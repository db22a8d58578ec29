//! IUT 构建配置覆盖
//!
//! `iut_config` 把配置文件名（如 `prj.conf`、`overlay-mesh.conf`）映射到该配置下
//! 需要合入的 Kconfig 覆盖和要运行的测试用例。项目记录可以直接内联这张表，
//! 也可以只写一个预设名（如 `mesh`、`mmdl`），由单独的预设文件整体替换。

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::utils;

use super::FieldViolation;

/// Overrides applied when the IUT is built with one configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IutOverride {
    /// Kconfig 选项，键为选项名
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overlay: BTreeMap<String, String>,
    /// 先合入的 overlay 文件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_overlay: Option<String>,
    /// 在此配置下运行的测试用例或 profile 名
    #[serde(default)]
    pub test_cases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IutConfig {
    entries: BTreeMap<String, IutOverride>,
}

impl IutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, config_file: impl Into<String>, entry: IutOverride) -> Self {
        self.entries.insert(config_file.into(), entry);
        self
    }

    pub fn get(&self, config_file: &str) -> Option<&IutOverride> {
        self.entries.get(config_file)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IutOverride)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 找出某个测试用例所属的配置文件
    pub fn config_for_test_case(&self, test_case: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, entry)| {
                entry
                    .test_cases
                    .iter()
                    .any(|tc| test_case == tc || test_case.starts_with(&format!("{tc}/")))
            })
            .map(|(name, _)| name.as_str())
    }

    pub fn validate(&self) -> Result<(), FieldViolation> {
        for (name, entry) in &self.entries {
            if name.trim().is_empty() {
                return Err(FieldViolation::new("", "config file name must not be empty"));
            }
            if entry.pre_overlay.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(FieldViolation::new(
                    format!("{name}.pre_overlay"),
                    "must not be empty when present",
                ));
            }
        }
        Ok(())
    }
}

/// `iut_config` as written in the document: a preset name or an inline table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IutConfigSource {
    Preset(String),
    Inline(IutConfig),
}

impl IutConfigSource {
    /// 预设被替换之后才有值
    pub fn resolved(&self) -> Option<&IutConfig> {
        match self {
            IutConfigSource::Inline(config) => Some(config),
            IutConfigSource::Preset(_) => None,
        }
    }

    pub fn preset_name(&self) -> Option<&str> {
        match self {
            IutConfigSource::Preset(name) => Some(name),
            IutConfigSource::Inline(_) => None,
        }
    }
}

impl From<IutConfig> for IutConfigSource {
    fn from(config: IutConfig) -> Self {
        IutConfigSource::Inline(config)
    }
}

/// Named default `iut_config` sets, keyed by project type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IutPresets {
    presets: BTreeMap<String, IutConfig>,
}

impl IutPresets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, name: impl Into<String>, config: IutConfig) -> Self {
        self.presets.insert(name.into(), config);
        self
    }

    /// 从 TOML/YAML 文件读取预设，格式由扩展名决定
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let presets: Self = utils::read_document(path)?;
        debug!("Loaded {} iut_config presets from {}", presets.len(), path.display());
        Ok(presets)
    }

    pub fn get(&self, name: &str) -> Option<&IutConfig> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
