//! Bot project configuration schema.
//!
//! Each submodule describes one section of a project record. Sections only
//! check their own values; record indices and error classes are added by the
//! loader.

pub mod auto_pts_config;
pub mod cli_args;
pub mod gdrive_config;
pub mod git_config;
pub mod iut_config;
pub mod mail_config;
pub mod project_config;
pub mod scheduler_config;

pub use auto_pts_config::{AutoPtsConfig, IutLink};
pub use gdrive_config::GDriveConfig;
pub use git_config::GitRepoConfig;
pub use iut_config::{IutConfig, IutConfigSource, IutOverride, IutPresets};
pub use mail_config::MailConfig;
pub use project_config::ProjectConfig;
pub use scheduler_config::{SchedulerConfig, TimeOfDay, Weekday};

/// 某个字段违反约束，`field` 为相对于记录的点分路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 给字段路径加上所在段的前缀
    pub fn within(mut self, section: &str) -> Self {
        self.field = if self.field.is_empty() {
            section.to_string()
        } else {
            format!("{section}.{}", self.field)
        };
        self
    }
}
