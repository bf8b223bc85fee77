//! `ypms`: a thin CLI binary over [`ypms_manager::Manager`]
//! (`SPEC_FULL.md` §6 "[AMBIENT] CLI surface").
//!
//! Scheduling is single-threaded by design (`spec.md` §5): there are no
//! background workers, so a current-thread runtime is sufficient and avoids
//! spinning up a multi-thread pool for a process that's blocked on one HTTP
//! request or subprocess at a time.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands, GuideInvocation, SourcesAction};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use ypms_manager::Manager;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbosity = cli.verbose + u8::from(ypms_manager::debug_env_enabled()) * 2;
    let log_level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = miette::Report::msg(format!("{e:#}"));
            eprintln!("{report:?}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut manager = Manager::new().await?;

    match cli.command {
        Commands::List(args) => {
            let index = manager.list_packages(args.source.as_deref()).await?;
            println!("{}", ypms_core::json::to_json_pretty(&index)?);
        }
        Commands::Info(args) => {
            let info = manager.package_info(&args.package_ref, args.source.as_deref()).await?;
            println!("{}", ypms_core::json::to_json_pretty(&info)?);
        }
        Commands::Install(args) => {
            let env_dir = manager
                .install(
                    &args.package_ref,
                    &args.env,
                    args.version.as_deref(),
                    args.source.as_deref(),
                    args.yes,
                    args.force,
                )
                .await?;
            println!("{}", env_dir.display());
        }
        Commands::Envs => {
            let envs = manager.list_envs().await?;
            if envs.is_empty() {
                println!("no environments");
            } else {
                for env in envs {
                    println!("{env}");
                }
            }
        }
        Commands::Sources(args) => match args.action {
            SourcesAction::List => {
                for (name, url) in manager.sources().list() {
                    println!("{name} -> {url}");
                }
            }
            SourcesAction::Add(add) => {
                manager.add_source(&add.name, &add.config_url).await?;
                println!("added source {}", add.name);
            }
            SourcesAction::Remove(remove) => {
                manager.remove_source(&remove.name).await?;
                println!("removed source {}", remove.name);
            }
        },
        Commands::Refresh => {
            let failures = manager.refresh_sources().await?;
            for (name, err) in &failures {
                eprintln!("refresh failed for {name}: {err}");
            }
            if !failures.is_empty() {
                anyhow::bail!("{} source(s) failed to refresh", failures.len());
            }
            println!("refreshed {} source(s)", manager.sources().list().len());
        }
        Commands::Upgrade(args) => {
            let errors = manager.upgrade(args.env.as_deref(), args.force).await?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                anyhow::bail!("{} package(s) failed to upgrade", errors.len());
            }
            println!("upgrade complete");
        }
        Commands::Autoremove(args) => {
            let errors = manager.autoremove(args.env.as_deref(), args.force).await?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                anyhow::bail!("{} package(s) failed to autoremove", errors.len());
            }
            println!("autoremove complete");
        }
        Commands::Guide(tokens) => {
            let guide_name = tokens.first().cloned().unwrap_or_default();
            let invocation = GuideInvocation::try_parse_from(
                std::iter::once("ypms".to_string()).chain(tokens.into_iter().skip(1)),
            )
            .unwrap_or_else(|e| e.exit());

            let message = manager
                .run(
                    &invocation.package_ref,
                    &guide_name,
                    &invocation.env,
                    invocation.version.as_deref(),
                    invocation.source.as_deref(),
                    invocation.force,
                    invocation.yes,
                )
                .await?;
            println!("{message}");
        }
    }

    Ok(())
}
