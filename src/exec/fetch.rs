// src/exec/fetch.rs

use std::path::Path;

use tracing::debug;

use crate::config::model::FetchSection;
use crate::errors::{Result, RunError};
use crate::exec::process::run_shell;
use crate::secret::ApiKey;

/// Boundary to the external fetch program.
///
/// Production code uses [`ProgramFetcher`]; tests can provide their own
/// implementation that writes snapshot files without spawning processes.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Run the optional environment-setup step. Failure here must abort the
    /// run before any fetch is attempted.
    async fn prepare(&self, work_tree: &Path) -> Result<()>;

    /// Run the fetch program in the work tree. The program's only contract
    /// is: read the credential from its environment, write result files
    /// under the output directory, exit non-zero on failure.
    async fn fetch(&self, work_tree: &Path) -> Result<()>;
}

/// Real fetcher: spawns the configured external program.
pub struct ProgramFetcher {
    program: String,
    prepare: Option<String>,
    api_key_env: String,
    api_key: ApiKey,
}

impl ProgramFetcher {
    pub fn new(fetch: &FetchSection, api_key: ApiKey) -> Self {
        Self {
            program: fetch.program.clone(),
            prepare: fetch.prepare.clone(),
            api_key_env: fetch.api_key_env.clone(),
            api_key,
        }
    }
}

impl Fetcher for ProgramFetcher {
    async fn prepare(&self, work_tree: &Path) -> Result<()> {
        let Some(command) = &self.prepare else {
            debug!("no prepare command configured");
            return Ok(());
        };

        let status = run_shell("prepare", command, work_tree, &[]).await?;
        if !status.success() {
            return Err(RunError::Setup(format!(
                "prepare command exited with code {}",
                status.code().unwrap_or(-1)
            )));
        }
        Ok(())
    }

    async fn fetch(&self, work_tree: &Path) -> Result<()> {
        debug!(credential_var = %self.api_key_env, "passing credential via environment");
        let envs = [(
            self.api_key_env.clone(),
            self.api_key.expose().to_string(),
        )];

        let status = run_shell("fetch", &self.program, work_tree, &envs).await?;
        if !status.success() {
            return Err(RunError::Fetch {
                code: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}
