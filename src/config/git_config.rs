//! Represents one repository of the `git` section.
//!
//! `update_repo` and `stash_changes` default to `false`: a record that does not
//! ask for it never has its checkout touched.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FieldViolation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepoConfig {
    pub remote: String,
    pub branch: String,
    #[serde(default)]
    pub stash_changes: bool,
    pub path: PathBuf,
    #[serde(default)]
    pub update_repo: bool,
}

impl GitRepoConfig {
    pub fn validate(&self) -> Result<(), FieldViolation> {
        if self.remote.trim().is_empty() {
            return Err(FieldViolation::new("remote", "must not be empty"));
        }
        if self.branch.trim().is_empty() {
            return Err(FieldViolation::new("branch", "must not be empty"));
        }
        if self.path.as_os_str().is_empty() {
            return Err(FieldViolation::new("path", "must not be empty"));
        }
        Ok(())
    }
}
