use clap::Parser;
use std::path::PathBuf;

use crate::utils::DocumentFormat;

// ptsbot-config - 校验和查看 AutoPTS 机器人的项目配置
#[derive(Parser, Debug)]
#[clap(
    name = "ptsbot-config",
    version,
    about = "Validate and inspect AutoPTS bot project configurations",
    override_usage = "ptsbot-config [OPTIONS] { --validate | --list | --dump }",
    after_help = "MODES:\n  --validate             Load the document and report errors\n  --list                 Print a Markdown summary of the projects\n  --dump                 Print the normalized document\n\nEXAMPLES:\n  ptsbot-config --validate -c bot_projects.toml\n  ptsbot-config --list --lenient --iut-presets iut_presets.toml\n  ptsbot-config --dump --format yaml --no-path-check"
)]
pub struct CliArgs {
    // Project document - TOML or YAML file listing the bot projects
    // 项目配置文件 - 列出机器人项目的 TOML 或 YAML 文件
    #[clap(short = 'c', long = "config", default_value = "bot_projects.toml", help = "Project configuration document")]
    pub config: PathBuf,

    // IUT presets - file with named iut_config sets, overrides the document's `iut_presets`
    // IUT 预设 - 包含命名 iut_config 集合的文件，优先于文档中的 `iut_presets`
    #[clap(long = "iut-presets", help = "File with named iut_config presets")]
    pub iut_presets: Option<PathBuf>,

    // Validate only
    // 仅校验
    #[clap(long = "validate", help = "Load the document and report errors")]
    pub validate: bool,

    // List projects as a Markdown table
    // 以 Markdown 表格列出项目
    #[clap(long = "list", help = "Print a Markdown summary of the projects")]
    pub list: bool,

    // Dump the normalized document
    // 输出补全默认值后的文档
    #[clap(long = "dump", help = "Print the normalized document")]
    pub dump: bool,

    // Output format of --dump
    // --dump 的输出格式
    #[clap(long = "format", default_value = "toml", help = "Output format for --dump (toml, yaml, json)")]
    pub format: DocumentFormat,

    // Keep secrets in --dump output
    // --dump 时不隐藏密钥
    #[clap(long = "show-secrets", help = "Do not redact passwords and credential paths")]
    pub show_secrets: bool,

    // Skip bad records instead of failing
    // 跳过出错的记录而不是直接失败
    #[clap(long = "lenient", help = "Skip records that fail to load")]
    pub lenient: bool,

    // Do not check that git repository paths exist
    // 不检查 git 仓库路径是否存在
    #[clap(long = "no-path-check", help = "Do not check git repository paths")]
    pub no_path_check: bool,

    // Verbose mode - Show more log information
    // 详细模式 - 显示更多日志信息
    #[clap(short = 'v', long = "verbose", help = "Enable verbose logging")]
    pub verbose: bool,

    // Quiet mode - Only show errors
    // 安静模式 - 只显示错误
    #[clap(short = 'q', long = "quiet", help = "Suppress non-essential output")]
    pub quiet: bool,
}

impl CliArgs {
    /// Parse command line arguments
    /// 解析命令行参数
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get log level
    /// 获取日志级别
    pub fn get_log_level(&self) -> &str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// 未指定模式时默认校验
    pub fn validate_only(&self) -> bool {
        self.validate || (!self.list && !self.dump)
    }
}
