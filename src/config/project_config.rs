//! Represents one automation target of the bot.
//!
//! Optional sections are `None` when the document leaves them out; nothing is
//! inferred from commented-out blocks.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    AutoPtsConfig, FieldViolation, GDriveConfig, GitRepoConfig, IutConfig, IutConfigSource,
    MailConfig, SchedulerConfig,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// 声明标签（原配置里的变量名），只用于诊断信息
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// 项目/平台名，允许多条记录同名
    pub name: String,
    pub auto_pts: AutoPtsConfig,
    pub git: BTreeMap<String, GitRepoConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<MailConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdrive: Option<GDriveConfig>,
    pub iut_config: IutConfigSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerConfig>,
}

impl ProjectConfig {
    /// Fields that must be present in the raw record, as dotted paths.
    pub const REQUIRED_FIELDS: &'static [&'static str] = &[
        "name",
        "auto_pts",
        "auto_pts.project_path",
        "auto_pts.workspace",
        "auto_pts.board",
        "git",
        "iut_config",
    ];

    pub const REQUIRED_GIT_FIELDS: &'static [&'static str] = &["remote", "branch", "path"];
    pub const REQUIRED_MAIL_FIELDS: &'static [&'static str] = &["sender", "smtp_host", "recipients"];
    pub const REQUIRED_GDRIVE_FIELDS: &'static [&'static str] =
        &["root_directory_id", "credentials_file"];

    pub fn fill_defaults(&mut self) {
        self.auto_pts.fill_defaults();
    }

    pub fn validate(&self) -> Result<(), FieldViolation> {
        if self.name.trim().is_empty() {
            return Err(FieldViolation::new("name", "must not be empty"));
        }
        self.auto_pts.validate().map_err(|v| v.within("auto_pts"))?;
        for (repo, config) in &self.git {
            if repo.trim().is_empty() {
                return Err(FieldViolation::new("git", "repository name must not be empty"));
            }
            config.validate().map_err(|v| v.within(&format!("git.{repo}")))?;
        }
        if let Some(mail) = &self.mail {
            mail.validate().map_err(|v| v.within("mail"))?;
        }
        if let Some(gdrive) = &self.gdrive {
            gdrive.validate().map_err(|v| v.within("gdrive"))?;
        }
        if let IutConfigSource::Preset(name) = &self.iut_config {
            if name.trim().is_empty() {
                return Err(FieldViolation::new("iut_config", "preset name must not be empty"));
            }
        }
        if let Some(config) = self.iut_config.resolved() {
            config.validate().map_err(|v| v.within("iut_config"))?;
        }
        Ok(())
    }

    /// 预设替换后的 `iut_config`
    pub fn iut_config(&self) -> Option<&IutConfig> {
        self.iut_config.resolved()
    }

    pub fn repo(&self, name: &str) -> Option<&GitRepoConfig> {
        self.git.get(name)
    }

    /// 用于日志的标识：优先声明标签，否则项目名
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}
