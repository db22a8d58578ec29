//! 配置加载错误类型
//!
//! 文档级错误（读取、解析、缺少项目列表）直接中止加载；
//! `SchemaError` 只影响对应的记录，`ReferenceError` 只影响对应的项目。

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by the loader.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("document has no top-level `{key}` collection")]
    MissingCollection { key: &'static str },

    #[error("failed to serialize configuration: {0}")]
    Serialize(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// 记录在列表中的位置，错误信息中同时显示下标和声明标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId {
    pub index: usize,
    pub label: Option<String>,
}

impl RecordId {
    pub fn new(index: usize, label: Option<String>) -> Self {
        Self { index, label }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "record #{} ({label})", self.index),
            None => write!(f, "record #{}", self.index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// 缺少必需字段
    MissingField,
    /// 字段类型或结构不符合
    InvalidShape(String),
    /// 字段值违反约束
    Invariant(String),
}

/// A record that does not match the schema. Fatal to that record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{record}: {}", describe_schema(.field, .kind))]
pub struct SchemaError {
    pub record: RecordId,
    /// Dotted field path, e.g. `auto_pts.workspace`. Empty for the record itself.
    pub field: String,
    pub kind: SchemaErrorKind,
}

fn describe_schema(field: &str, kind: &SchemaErrorKind) -> String {
    match kind {
        SchemaErrorKind::MissingField => format!("missing required field `{field}`"),
        SchemaErrorKind::InvalidShape(msg) if field.is_empty() => format!("invalid record: {msg}"),
        SchemaErrorKind::InvalidShape(msg) => format!("invalid `{field}`: {msg}"),
        SchemaErrorKind::Invariant(msg) => format!("`{field}` {msg}"),
    }
}

impl SchemaError {
    pub fn missing(record: RecordId, field: impl Into<String>) -> Self {
        Self {
            record,
            field: field.into(),
            kind: SchemaErrorKind::MissingField,
        }
    }

    pub fn shape(record: RecordId, field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            record,
            field: field.into(),
            kind: SchemaErrorKind::InvalidShape(msg.into()),
        }
    }

    pub fn invariant(record: RecordId, field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            record,
            field: field.into(),
            kind: SchemaErrorKind::Invariant(msg.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `iut_config` 指向的预设不存在
    IutPreset(String),
    /// `git` 仓库路径无法解析
    GitPath { repo: String, path: PathBuf },
}

/// A record whose external references cannot be resolved. Fatal to that project only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{record} (project `{project}`): {}", describe_reference(.kind))]
pub struct ReferenceError {
    pub record: RecordId,
    pub project: String,
    pub kind: ReferenceKind,
}

fn describe_reference(kind: &ReferenceKind) -> String {
    match kind {
        ReferenceKind::IutPreset(name) => format!("unknown iut_config preset `{name}`"),
        ReferenceKind::GitPath { repo, path } => {
            format!("git repository `{repo}` path {} cannot be resolved", path.display())
        }
    }
}

impl ConfigError {
    /// 是否只影响单条记录（宽松模式下可以跳过）
    pub fn is_record_level(&self) -> bool {
        matches!(self, ConfigError::Schema(_) | ConfigError::Reference(_))
    }

    /// 出错记录的下标
    pub fn record_index(&self) -> Option<usize> {
        match self {
            ConfigError::Schema(e) => Some(e.record.index),
            ConfigError::Reference(e) => Some(e.record.index),
            _ => None,
        }
    }
}
