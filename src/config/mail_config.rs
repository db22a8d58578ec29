//! 邮件报告配置（可选段）
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use regex::Regex;

use super::FieldViolation;

static MAIL_ADDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("mail pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfig {
    pub sender: String,
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// 发件人显示名
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub passwd: String,
    #[serde(default)]
    pub start_tls: bool,
    pub recipients: Vec<String>,
}

fn default_smtp_port() -> u16 {
    587
}

impl MailConfig {
    pub fn validate(&self) -> Result<(), FieldViolation> {
        if !MAIL_ADDR_RE.is_match(&self.sender) {
            return Err(FieldViolation::new(
                "sender",
                format!("`{}` is not a mail address", self.sender),
            ));
        }
        if self.smtp_host.trim().is_empty() {
            return Err(FieldViolation::new("smtp_host", "must not be empty"));
        }
        if self.smtp_port == 0 {
            return Err(FieldViolation::new("smtp_port", "must be non-zero"));
        }
        if self.recipients.is_empty() {
            return Err(FieldViolation::new("recipients", "must list at least one address"));
        }
        for (i, addr) in self.recipients.iter().enumerate() {
            if !MAIL_ADDR_RE.is_match(addr) {
                return Err(FieldViolation::new(
                    format!("recipients[{i}]"),
                    format!("`{addr}` is not a mail address"),
                ));
            }
        }
        Ok(())
    }
}
