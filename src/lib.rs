// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod git;
pub mod logging;
pub mod pipeline;
pub mod secret;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::{parse_duration, ConfigFile};
use crate::engine::{
    spawn_ticker, OverlapBehaviour, PendingRun, PipelineBackend, RunReason, Runtime,
    RuntimeEvent, RuntimeOptions,
};
use crate::exec::ProgramFetcher;
use crate::git::{CommitAuthor, GitCli};
use crate::pipeline::JobSpec;
use crate::secret::ApiKey;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - credential lookup
/// - git backend + fetcher + pipeline backend
/// - interval ticker (scheduled mode) or a single manual trigger (`--once`)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    // Fail before any git or process work if the credential is missing.
    let api_key = ApiKey::from_env(&cfg.fetch.api_key_env)?;

    let behaviour = OverlapBehaviour::from_str(&cfg.schedule.triggered_while_running_behaviour)
        .map_err(|e| anyhow!(e))?;
    let period = parse_duration(&cfg.schedule.interval).map_err(|e| anyhow!(e))?;

    let work_tree = resolve_work_tree(&config_path, &cfg.repo.path);
    let job = JobSpec::from_config(&cfg, work_tree.clone());

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);

    let git = GitCli::new(
        work_tree,
        CommitAuthor {
            name: cfg.publish.author_name.clone(),
            email: cfg.publish.author_email.clone(),
        },
    );
    let fetcher = ProgramFetcher::new(&cfg.fetch, api_key);
    let backend = PipelineBackend::new(job, git, fetcher, rt_tx.clone());

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let _ticker_handle = if args.once {
        info!("manual trigger (--once); will exit when the run completes");
        rt_tx
            .send(RuntimeEvent::RunTriggered {
                reason: RunReason::Manual,
            })
            .await?;
        None
    } else {
        info!(interval = %cfg.schedule.interval, "starting scheduled triggers");
        Some(spawn_ticker(period, rt_tx.clone()))
    };

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };

    let runtime = Runtime::new(backend, PendingRun::new(behaviour), options, rt_rx);
    runtime.run().await
}

/// Resolve the configured work tree path against the config file's
/// directory (so a relative `[repo].path` means "next to the config").
fn resolve_work_tree(config_path: &Path, repo_path: &str) -> PathBuf {
    let repo = PathBuf::from(repo_path);
    if repo.is_absolute() {
        return repo;
    }
    config_path
        .parent()
        .map(|p| p.join(&repo))
        .unwrap_or(repo)
}

/// Simple dry-run output: print the resolved plan without executing.
fn print_dry_run(cfg: &ConfigFile) {
    println!("nowpub dry-run");
    println!("  repo.path = {}", cfg.repo.path);
    println!("  repo.remote = {}", cfg.repo.remote);
    println!("  repo.mainline_branch = {}", cfg.repo.mainline_branch);
    println!("  repo.data_branch = {}", cfg.repo.data_branch);
    println!();
    println!("  fetch.program = {}", cfg.fetch.program);
    println!("  fetch.output_dir = {}", cfg.fetch.output_dir);
    println!("  fetch.api_key_env = {}", cfg.fetch.api_key_env);
    if let Some(ref prepare) = cfg.fetch.prepare {
        println!("  fetch.prepare = {prepare}");
    }
    println!();
    println!("  publish.commit_message = {}", cfg.publish.commit_message);
    println!(
        "  publish.author = {} <{}>",
        cfg.publish.author_name, cfg.publish.author_email
    );
    println!();
    println!("  schedule.interval = {}", cfg.schedule.interval);
    println!(
        "  schedule.triggered_while_running_behaviour = {}",
        cfg.schedule.triggered_while_running_behaviour
    );
}
