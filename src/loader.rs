//! 项目配置加载器
//!
//! 文档先解析成通用的 JSON 值，再逐条记录处理：
//! 检查必需字段 -> 反序列化 -> 补默认值 -> 校验约束 -> 解析外部引用。
//! 严格模式遇到第一条坏记录就返回错误；宽松模式跳过坏记录并汇总错误。

use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::config::{
    AutoPtsConfig, GDriveConfig, GitRepoConfig, IutConfigSource, IutPresets, MailConfig,
    ProjectConfig, SchedulerConfig,
};
use crate::error::{ConfigError, RecordId, ReferenceError, ReferenceKind, SchemaError};
use crate::project_list::{ProjectConfigList, ProjectConfigListBuilder};
use crate::utils::{self, DocumentFormat};

/// Top-level key holding the list of project records.
pub const COLLECTION_KEY: &str = "projects";
/// Name used by older bot configurations for the same list.
pub const COLLECTION_ALIAS: &str = "BotProjects";
/// Top-level key naming the `iut_config` presets file.
pub const PRESETS_KEY: &str = "iut_presets";

const KNOWN_RECORD_KEYS: &[&str] = &[
    "label",
    "name",
    "auto_pts",
    "git",
    "mail",
    "gdrive",
    "iut_config",
    "scheduler",
];

/// 判断 `git` 段中的仓库路径能否解析到宿主机上的目录
#[cfg_attr(test, mockall::automock)]
pub trait RepoResolver {
    /// Returns the resolved directory of `repo`, or `None` if it cannot be found.
    fn resolve(&self, repo: &str, path: &Path) -> Option<PathBuf>;
}

/// Resolves relative paths against the document directory and requires an existing directory.
#[derive(Debug, Clone)]
pub struct FsRepoResolver {
    base_dir: PathBuf,
}

impl FsRepoResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl RepoResolver for FsRepoResolver {
    fn resolve(&self, _repo: &str, path: &Path) -> Option<PathBuf> {
        let full = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        full.is_dir().then_some(full)
    }
}

/// Records that loaded and records that were skipped, in document order.
#[derive(Debug)]
pub struct LoadOutcome {
    pub projects: ProjectConfigList,
    pub rejected: Vec<ConfigError>,
}

impl LoadOutcome {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Configurable loader for project documents.
pub struct Loader {
    presets: Option<IutPresets>,
    presets_path: Option<PathBuf>,
    resolver: Option<Box<dyn RepoResolver>>,
    check_git_paths: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        Self {
            presets: None,
            presets_path: None,
            resolver: None,
            check_git_paths: true,
        }
    }

    /// 使用已加载的预设，优先于任何预设文件
    pub fn with_presets(mut self, presets: IutPresets) -> Self {
        self.presets = Some(presets);
        self
    }

    /// 使用指定的预设文件，优先于文档中的 `iut_presets`
    pub fn with_presets_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.presets_path = Some(path.into());
        self
    }

    /// 替换默认的文件系统解析器
    pub fn with_resolver(mut self, resolver: Box<dyn RepoResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn check_git_paths(mut self, enabled: bool) -> Self {
        self.check_git_paths = enabled;
        self
    }

    /// Loads a document and fails on the first bad record.
    pub fn load(&self, path: &Path) -> Result<ProjectConfigList, ConfigError> {
        let (document, base_dir) = read_with_base_dir(path)?;
        self.load_value(document, &base_dir, path, true).map(|outcome| outcome.projects)
    }

    /// Loads a document, skipping records that fail with a schema or reference error.
    pub fn load_lenient(&self, path: &Path) -> Result<LoadOutcome, ConfigError> {
        let (document, base_dir) = read_with_base_dir(path)?;
        self.load_value(document, &base_dir, path, false)
    }

    /// 从内存中的文本加载，相对路径以当前目录为基准
    pub fn load_str(&self, content: &str, format: DocumentFormat) -> Result<ProjectConfigList, ConfigError> {
        let origin = Path::new("<memory>");
        let document = utils::parse_document_value(content, format, origin)?;
        self.load_value(document, Path::new("."), origin, true)
            .map(|outcome| outcome.projects)
    }

    pub fn load_str_lenient(&self, content: &str, format: DocumentFormat) -> Result<LoadOutcome, ConfigError> {
        let origin = Path::new("<memory>");
        let document = utils::parse_document_value(content, format, origin)?;
        self.load_value(document, Path::new("."), origin, false)
    }

    fn load_value(
        &self,
        document: Value,
        base_dir: &Path,
        origin: &Path,
        fail_fast: bool,
    ) -> Result<LoadOutcome, ConfigError> {
        let records = collection(&document, origin)?;
        let presets = self.presets_for(&document, base_dir, origin)?;
        let fs_resolver;
        let resolver: Option<&dyn RepoResolver> = match (&self.resolver, self.check_git_paths) {
            (_, false) => None,
            (Some(resolver), true) => Some(resolver.as_ref()),
            (None, true) => {
                fs_resolver = FsRepoResolver::new(base_dir);
                Some(&fs_resolver)
            }
        };

        info!("Loading {} project records from {}", records.len(), origin.display());

        let mut builder = ProjectConfigListBuilder::new();
        let mut rejected = Vec::new();
        for (index, raw) in records.iter().enumerate() {
            match load_record(index, raw, presets.as_ref(), resolver) {
                Ok(project) => {
                    debug!("Loaded record #{index} ({})", project.display_name());
                    builder.push(project);
                }
                Err(e) if fail_fast => return Err(e),
                Err(e) => {
                    warn!("Skipping {e}");
                    rejected.push(e);
                }
            }
        }

        let projects = builder.build();
        warn_duplicate_names(&projects);
        Ok(LoadOutcome { projects, rejected })
    }

    fn presets_for(
        &self,
        document: &Value,
        base_dir: &Path,
        origin: &Path,
    ) -> Result<Option<IutPresets>, ConfigError> {
        if let Some(presets) = &self.presets {
            return Ok(Some(presets.clone()));
        }
        if let Some(path) = &self.presets_path {
            return IutPresets::from_file(path).map(Some);
        }
        match document.get(PRESETS_KEY) {
            Some(Value::String(path)) => {
                let full = base_dir.join(path);
                debug!("Using iut_config presets from {}", full.display());
                IutPresets::from_file(&full).map(Some)
            }
            Some(_) => Err(ConfigError::Parse {
                path: origin.to_path_buf(),
                message: format!("`{PRESETS_KEY}` must be a path"),
            }),
            None => Ok(None),
        }
    }
}

fn read_with_base_dir(path: &Path) -> Result<(Value, PathBuf), ConfigError> {
    let document = utils::read_document_value(path)?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((document, base_dir))
}

fn collection<'a>(document: &'a Value, origin: &Path) -> Result<&'a Vec<Value>, ConfigError> {
    let list = document
        .get(COLLECTION_KEY)
        .or_else(|| document.get(COLLECTION_ALIAS))
        .ok_or(ConfigError::MissingCollection { key: COLLECTION_KEY })?;
    list.as_array().ok_or_else(|| ConfigError::Parse {
        path: origin.to_path_buf(),
        message: format!("`{COLLECTION_KEY}` must be a list of records"),
    })
}

/// Builds one record. Errors carry the record index and its label.
pub fn load_record(
    index: usize,
    raw: &Value,
    presets: Option<&IutPresets>,
    resolver: Option<&dyn RepoResolver>,
) -> Result<ProjectConfig, ConfigError> {
    let label = raw.get("label").and_then(Value::as_str).map(str::to_string);
    let record = RecordId::new(index, label);

    let Some(fields) = raw.as_object() else {
        return Err(SchemaError::shape(record, "", "record must be a table").into());
    };
    for key in fields.keys() {
        if !KNOWN_RECORD_KEYS.contains(&key.as_str()) {
            warn!("{record}: ignoring unknown field `{key}`");
        }
    }

    check_required(&record, raw)?;

    let mut project: ProjectConfig = serde_json::from_value(raw.clone()).map_err(|e| {
        let (field, message) = locate_shape_error(raw).unwrap_or_else(|| (String::new(), e.to_string()));
        SchemaError::shape(record.clone(), field, message)
    })?;

    project.fill_defaults();
    project
        .validate()
        .map_err(|v| SchemaError::invariant(record.clone(), v.field, v.reason))?;

    if let IutConfigSource::Preset(name) = &project.iut_config {
        let config = presets.and_then(|p| p.get(name)).ok_or_else(|| ReferenceError {
            record: record.clone(),
            project: project.name.clone(),
            kind: ReferenceKind::IutPreset(name.clone()),
        })?;
        debug!("{record}: iut_config preset `{name}` has {} entries", config.len());
        project.iut_config = IutConfigSource::Inline(config.clone());
    }

    if let Some(resolver) = resolver {
        for (repo, config) in &project.git {
            match resolver.resolve(repo, &config.path) {
                Some(dir) => debug!("{record}: git repository `{repo}` at {}", dir.display()),
                None => {
                    return Err(ReferenceError {
                        record,
                        project: project.name.clone(),
                        kind: ReferenceKind::GitPath {
                            repo: repo.clone(),
                            path: config.path.clone(),
                        },
                    }
                    .into());
                }
            }
        }
    }

    Ok(project)
}

/// 检查必需字段：缺失时报 MissingField，上级段不是表时报 InvalidShape
fn check_required(record: &RecordId, raw: &Value) -> Result<(), SchemaError> {
    for path in ProjectConfig::REQUIRED_FIELDS {
        require(record, raw, path)?;
    }
    if let Some(repos) = raw.get("git") {
        let repos = table(record, repos, "git")?;
        for (repo, fields) in repos {
            let section = format!("git.{repo}");
            let fields = table(record, fields, &section)?;
            for key in ProjectConfig::REQUIRED_GIT_FIELDS {
                if !is_set(fields.get(*key)) {
                    return Err(SchemaError::missing(record.clone(), format!("{section}.{key}")));
                }
            }
        }
    }
    let optional_sections = [
        ("mail", ProjectConfig::REQUIRED_MAIL_FIELDS),
        ("gdrive", ProjectConfig::REQUIRED_GDRIVE_FIELDS),
    ];
    for (section, keys) in optional_sections {
        let Some(fields) = raw.get(section).filter(|v| !v.is_null()) else {
            continue;
        };
        let fields = table(record, fields, section)?;
        for key in keys {
            if !is_set(fields.get(*key)) {
                return Err(SchemaError::missing(record.clone(), format!("{section}.{key}")));
            }
        }
    }
    Ok(())
}

/// Follows a dotted path. Every section on the way must be a table.
fn require(record: &RecordId, raw: &Value, dotted: &str) -> Result<(), SchemaError> {
    let mut current = raw;
    let mut walked = String::new();
    for key in dotted.split('.') {
        let fields = table(record, current, &walked)?;
        match fields.get(key) {
            Some(next) if !next.is_null() => current = next,
            _ => return Err(SchemaError::missing(record.clone(), dotted)),
        }
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(key);
    }
    Ok(())
}

fn table<'a>(
    record: &RecordId,
    value: &'a Value,
    section: &str,
) -> Result<&'a serde_json::Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::shape(record.clone(), section, "must be a table"))
}

fn is_set(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !v.is_null())
}

/// 反序列化失败时逐段重试，找出出错的段
fn locate_shape_error(raw: &Value) -> Option<(String, String)> {
    fn check<T: serde::de::DeserializeOwned>(raw: &Value, section: &str) -> Option<(String, String)> {
        let value = raw.get(section)?;
        serde_json::from_value::<T>(value.clone())
            .err()
            .map(|e| (section.to_string(), e.to_string()))
    }

    if let Some(repos) = raw.get("git").and_then(Value::as_object) {
        for (repo, value) in repos {
            if let Err(e) = serde_json::from_value::<GitRepoConfig>(value.clone()) {
                return Some((format!("git.{repo}"), e.to_string()));
            }
        }
    }

    check::<String>(raw, "name")
        .or_else(|| check::<AutoPtsConfig>(raw, "auto_pts"))
        .or_else(|| check::<BTreeMap<String, GitRepoConfig>>(raw, "git"))
        .or_else(|| check::<MailConfig>(raw, "mail"))
        .or_else(|| check::<GDriveConfig>(raw, "gdrive"))
        .or_else(|| check::<IutConfigSource>(raw, "iut_config"))
        .or_else(|| check::<SchedulerConfig>(raw, "scheduler"))
        .or_else(|| check::<String>(raw, "label"))
}

fn warn_duplicate_names(projects: &ProjectConfigList) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, project) in projects.iter().enumerate() {
        if let Some(first) = seen.insert(project.name.as_str(), index) {
            warn!(
                "Records #{first} and #{index} share the project name `{}`",
                project.name
            );
        }
    }
}
