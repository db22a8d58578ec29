//! 有序的项目配置列表
//!
//! 记录通过 `ProjectConfigListBuilder` 逐条追加，`build()` 之后列表不可变，
//! 加载过程中不会暴露构造了一半的列表。顺序即声明顺序，也是机器人依次执行的顺序。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::ProjectConfig;
use crate::error::ConfigError;
use crate::loader::Loader;
use crate::utils::{self, DocumentFormat};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfigList {
    projects: Vec<ProjectConfig>,
}

impl ProjectConfigList {
    pub fn builder() -> ProjectConfigListBuilder {
        ProjectConfigListBuilder::new()
    }

    /// Loads a document with the default loader (presets named in the document,
    /// git paths checked against the filesystem).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Loader::new().load(path)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProjectConfig> {
        self.projects.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectConfig> {
        self.projects.iter()
    }

    pub fn as_slice(&self) -> &[ProjectConfig] {
        &self.projects
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.projects.iter().map(|p| p.name.as_str())
    }

    pub fn into_vec(self) -> Vec<ProjectConfig> {
        self.projects
    }

    /// 序列化回文档形式（`projects` 列表），预设已被展开
    pub fn to_document_string(&self, format: DocumentFormat) -> Result<String, ConfigError> {
        utils::to_document_string(self, format)
    }

    /// 序列化为 JSON 值，可选择隐藏密钥字段
    pub fn to_value(&self, redact: bool) -> Result<serde_json::Value, ConfigError> {
        let mut value = serde_json::to_value(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        if redact {
            utils::redact_secrets(&mut value);
        }
        Ok(value)
    }
}

impl<'a> IntoIterator for &'a ProjectConfigList {
    type Item = &'a ProjectConfig;
    type IntoIter = std::slice::Iter<'a, ProjectConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.iter()
    }
}

impl IntoIterator for ProjectConfigList {
    type Item = ProjectConfig;
    type IntoIter = std::vec::IntoIter<ProjectConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.into_iter()
    }
}

/// Collects records in declaration order.
#[derive(Debug, Default)]
pub struct ProjectConfigListBuilder {
    projects: Vec<ProjectConfig>,
}

impl ProjectConfigListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, project: ProjectConfig) -> &mut Self {
        self.projects.push(project);
        self
    }

    pub fn project(mut self, project: ProjectConfig) -> Self {
        self.projects.push(project);
        self
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn build(self) -> ProjectConfigList {
        ProjectConfigList {
            projects: self.projects,
        }
    }
}
