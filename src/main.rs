use anyhow::{Context, Result, bail};
use log::{error, info};

use ptsbot_config::config::cli_args::CliArgs;
use ptsbot_config::loader::{LoadOutcome, Loader};
use ptsbot_config::{markdown_report, utils};

fn main() {
    let args = CliArgs::parse_args();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.get_log_level()))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&args) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let mut loader = Loader::new().check_git_paths(!args.no_path_check);
    if let Some(presets) = &args.iut_presets {
        loader = loader.with_presets_file(presets);
    }

    let outcome = if args.lenient {
        loader.load_lenient(&args.config)
    } else {
        loader.load(&args.config).map(|projects| LoadOutcome {
            projects,
            rejected: Vec::new(),
        })
    }
    .with_context(|| format!("无法加载项目配置: {}", args.config.display()))?;

    info!(
        "已加载 {} 个项目，跳过 {} 条记录",
        outcome.projects.len(),
        outcome.rejected.len()
    );

    if args.list {
        print!("{}", markdown_report::render_outcome(&outcome));
    }

    if args.dump {
        let value = outcome
            .projects
            .to_value(!args.show_secrets)
            .context("序列化项目配置失败")?;
        let text = utils::to_document_string(&value, args.format).context("序列化项目配置失败")?;
        print!("{text}");
    }

    if args.validate_only() {
        if outcome.is_clean() {
            println!("{}: {} projects OK", args.config.display(), outcome.projects.len());
        } else {
            for e in &outcome.rejected {
                println!("{e}");
            }
        }
    }

    if !outcome.is_clean() && args.validate_only() {
        bail!("{} records failed to load", outcome.rejected.len());
    }
    Ok(())
}
