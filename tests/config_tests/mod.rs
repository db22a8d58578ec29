mod cli_args_test;
mod loader_test;

use std::path::PathBuf;

/// 仓库自带的示例配置目录
pub fn sample_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}
