//! Google Drive upload settings (optional section).
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FieldViolation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GDriveConfig {
    /// 上传目录的 Drive ID
    pub root_directory_id: String,
    /// 服务账号凭据文件路径
    pub credentials_file: PathBuf,
}

impl GDriveConfig {
    pub fn validate(&self) -> Result<(), FieldViolation> {
        if self.root_directory_id.trim().is_empty() {
            return Err(FieldViolation::new("root_directory_id", "must not be empty"));
        }
        if self.credentials_file.as_os_str().is_empty() {
            return Err(FieldViolation::new("credentials_file", "must not be empty"));
        }
        Ok(())
    }
}
