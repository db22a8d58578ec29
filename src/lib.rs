//! Configuration schema and loader for the AutoPTS Bluetooth test bot.
//!
//! A bot configuration document lists one record per automation target under
//! the top-level `projects` key. [`Loader`] turns that document into an
//! immutable, ordered [`ProjectConfigList`], filling documented defaults,
//! checking invariants and substituting `iut_config` presets.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ptsbot_config::{Loader, ProjectConfigList};
//!
//! let projects: ProjectConfigList = Loader::new()
//!     .with_presets_file("iut_presets.toml")
//!     .load(Path::new("bot_projects.toml"))?;
//! for project in &projects {
//!     println!("{} on {}", project.name, project.auto_pts.board);
//! }
//! # Ok::<(), ptsbot_config::ConfigError>(())
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod markdown_report;
pub mod project_list;
pub mod utils;

pub use config::{
    AutoPtsConfig, GDriveConfig, GitRepoConfig, IutConfig, IutConfigSource, IutOverride,
    IutLink, IutPresets, MailConfig, ProjectConfig, SchedulerConfig, TimeOfDay, Weekday,
};
pub use error::{ConfigError, RecordId, ReferenceError, ReferenceKind, SchemaError, SchemaErrorKind};
pub use loader::{FsRepoResolver, LoadOutcome, Loader, RepoResolver};
pub use project_list::{ProjectConfigList, ProjectConfigListBuilder};
pub use utils::DocumentFormat;
