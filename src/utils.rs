//! Utility helpers shared by the loader and the CLI.
//!
//! Documents are read as TOML, YAML or JSON (by extension) into any deserializable
//! type or into a generic JSON value, and written back in TOML, YAML or JSON.

use log::error;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;

/// Keys whose values are secrets and are masked in dumps.
pub const SECRET_KEYS: &[&str] = &["passwd", "password", "credentials_file", "token"];

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Toml,
    Yaml,
    Json,
}

impl DocumentFormat {
    /// 根据扩展名判断格式，未知扩展名按 TOML 处理
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            Some("json") => DocumentFormat::Json,
            _ => DocumentFormat::Toml,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Toml => f.write_str("toml"),
            DocumentFormat::Yaml => f.write_str("yaml"),
            DocumentFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(DocumentFormat::Toml),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            "json" => Ok(DocumentFormat::Json),
            other => Err(format!("unsupported document format `{other}`")),
        }
    }
}

/// Parses document text into an arbitrary struct.
///
/// # Parameters
///
/// - `content`: the document text.
/// - `format`: how to parse it.
/// - `origin`: path used in error messages.
///
/// # Errors
///
/// Returns `ConfigError::Parse` if the text is not valid for `format` or does not
/// fit `T`.
pub fn parse_document<T>(content: &str, format: DocumentFormat, origin: &Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let parsed = match format {
        DocumentFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| {
        error!("Failed to parse {format} document {}: {message}", origin.display());
        ConfigError::Parse {
            path: origin.to_path_buf(),
            message,
        }
    })
}

/// Parses document text into a generic JSON value.
///
/// TOML date and time literals (`monday = 10:00:00`) become their string form,
/// so they read the same as the quoted `"10:00:00"`.
pub fn parse_document_value(
    content: &str,
    format: DocumentFormat,
    origin: &Path,
) -> Result<serde_json::Value, ConfigError> {
    if format != DocumentFormat::Toml {
        return parse_document(content, format, origin);
    }
    let mut value: toml::Value = parse_document(content, format, origin)?;
    stringify_datetimes(&mut value);
    serde_json::to_value(value).map_err(|e| ConfigError::Parse {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })
}

fn stringify_datetimes(value: &mut toml::Value) {
    match value {
        toml::Value::Datetime(dt) => *value = toml::Value::String(dt.to_string()),
        toml::Value::Array(items) => items.iter_mut().for_each(stringify_datetimes),
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| stringify_datetimes(v)),
        _ => {}
    }
}

/// Reads a TOML, YAML or JSON file into a generic JSON value.
///
/// # Errors
///
/// Same as [`read_document`].
pub fn read_document_value(path: &Path) -> Result<serde_json::Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document_value(&content, DocumentFormat::from_path(path), path)
}

/// Reads a TOML or YAML file into an arbitrary struct.
///
/// # Errors
///
/// Returns `ConfigError::Io` if the file cannot be read and `ConfigError::Parse`
/// if data parsing fails.
pub fn read_document<T>(path: &Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, DocumentFormat::from_path(path), path)
}

/// Serializes a value in the requested format.
pub fn to_document_string<T>(value: &T, format: DocumentFormat) -> Result<String, ConfigError>
where
    T: Serialize + ?Sized,
{
    match format {
        DocumentFormat::Toml => toml::to_string(value).map_err(|e| ConfigError::Serialize(e.to_string())),
        DocumentFormat::Yaml => serde_yaml::to_string(value).map_err(|e| ConfigError::Serialize(e.to_string())),
        DocumentFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))
        }
    }
}

/// 将所有密钥类字段替换为占位符，返回被替换的点分路径
pub fn redact_secrets(value: &mut serde_json::Value) -> Vec<String> {
    let mut redacted = Vec::new();
    redact_inner(value, String::new(), &mut redacted);
    redacted
}

fn redact_inner(value: &mut serde_json::Value, path: String, redacted: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                let is_secret = SECRET_KEYS.contains(&key.as_str());
                let is_set = child.as_str().is_some_and(|s| !s.is_empty());
                if is_secret && is_set {
                    *child = serde_json::Value::String(REDACTED.to_string());
                    redacted.push(child_path);
                } else {
                    redact_inner(child, child_path, redacted);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for (i, child) in items.iter_mut().enumerate() {
                redact_inner(child, format!("{path}[{i}]"), redacted);
            }
        }
        _ => {}
    }
}
