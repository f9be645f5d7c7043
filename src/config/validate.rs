// src/config/validate.rs

use std::path::{Component, Path};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::config::model::ConfigFile;
use crate::engine::OverlapBehaviour;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - branch, remote and work-tree fields are non-empty
/// - the data branch differs from the mainline branch
/// - the fetch program and credential variable name are non-empty
/// - the output directory is a relative subdirectory (no `..`, not `.`)
/// - the schedule interval parses and is at least one second
/// - `triggered_while_running_behaviour` is valid ("skip" or "queue")
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_repo(cfg)?;
    validate_fetch(cfg)?;
    validate_publish(cfg)?;
    validate_schedule(cfg)?;
    Ok(())
}

fn validate_repo(cfg: &ConfigFile) -> Result<()> {
    let repo = &cfg.repo;
    for (field, value) in [
        ("path", &repo.path),
        ("remote", &repo.remote),
        ("mainline_branch", &repo.mainline_branch),
        ("data_branch", &repo.data_branch),
    ] {
        if value.trim().is_empty() {
            return Err(anyhow!("[repo].{field} must not be empty"));
        }
    }

    if repo.data_branch == repo.mainline_branch {
        return Err(anyhow!(
            "[repo].data_branch ('{}') must differ from [repo].mainline_branch; \
             the job must never commit to mainline",
            repo.data_branch
        ));
    }

    Ok(())
}

fn validate_fetch(cfg: &ConfigFile) -> Result<()> {
    let fetch = &cfg.fetch;
    if fetch.program.trim().is_empty() {
        return Err(anyhow!("[fetch].program must not be empty"));
    }
    if fetch.api_key_env.trim().is_empty() {
        return Err(anyhow!("[fetch].api_key_env must not be empty"));
    }
    validate_output_dir(&fetch.output_dir)
}

/// The output directory is the only path ever staged, and it is moved
/// aside across the branch switch, so it must be a plain subdirectory of
/// the work tree.
fn validate_output_dir(output_dir: &str) -> Result<()> {
    if output_dir.trim().is_empty() {
        return Err(anyhow!("[fetch].output_dir must not be empty"));
    }

    let path = Path::new(output_dir);
    if path.is_absolute() {
        return Err(anyhow!(
            "[fetch].output_dir must be relative to the work tree (got '{output_dir}')"
        ));
    }

    let mut has_normal = false;
    for comp in path.components() {
        match comp {
            Component::ParentDir => {
                return Err(anyhow!(
                    "[fetch].output_dir must not contain '..' (got '{output_dir}')"
                ));
            }
            Component::Normal(_) => has_normal = true,
            _ => {}
        }
    }
    if !has_normal {
        return Err(anyhow!(
            "[fetch].output_dir must name a subdirectory (got '{output_dir}')"
        ));
    }

    Ok(())
}

fn validate_publish(cfg: &ConfigFile) -> Result<()> {
    let publish = &cfg.publish;
    for (field, value) in [
        ("commit_message", &publish.commit_message),
        ("author_name", &publish.author_name),
        ("author_email", &publish.author_email),
    ] {
        if value.trim().is_empty() {
            return Err(anyhow!("[publish].{field} must not be empty"));
        }
    }
    Ok(())
}

fn validate_schedule(cfg: &ConfigFile) -> Result<()> {
    OverlapBehaviour::from_str(&cfg.schedule.triggered_while_running_behaviour)
        .map_err(|e| anyhow!(e))
        .context("invalid [schedule].triggered_while_running_behaviour")?;

    let interval = cfg
        .schedule
        .effective_interval()
        .map_err(|e| anyhow!(e))
        .context("invalid [schedule].interval")?;

    if interval < Duration::from_secs(1) {
        return Err(anyhow!(
            "[schedule].interval must be at least 1s (got '{}')",
            cfg.schedule.interval
        ));
    }

    Ok(())
}
