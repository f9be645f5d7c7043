// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [repo]
/// data_branch = "weather-data"
///
/// [fetch]
/// program = "python3 crawler.py"
///
/// [publish]
/// commit_message = "Update now data"
///
/// [schedule]
/// interval = "1h"
/// ```
///
/// `[repo]` and `[fetch]` are required because they carry the two fields
/// with no sensible default (`data_branch`, `program`); everything else
/// falls back to defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Work tree, remote and branch names from `[repo]`.
    pub repo: RepoSection,

    /// Fetch program contract from `[fetch]`.
    pub fetch: FetchSection,

    /// Commit identity and message from `[publish]`.
    #[serde(default)]
    pub publish: PublishSection,

    /// Trigger cadence and overlap behaviour from `[schedule]`.
    #[serde(default)]
    pub schedule: ScheduleSection,
}

/// `[repo]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSection {
    /// Path to the git work tree the job operates on.
    ///
    /// Relative paths are resolved against the config file's directory.
    #[serde(default = "default_repo_path")]
    pub path: String,

    /// Remote to fetch from and push to.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// The branch the fetch program's own logic lives on.
    #[serde(default = "default_mainline_branch")]
    pub mainline_branch: String,

    /// Long-lived branch that holds the published snapshots.
    pub data_branch: String,
}

fn default_repo_path() -> String {
    ".".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_mainline_branch() -> String {
    "main".to_string()
}

/// `[fetch]` section.
///
/// The fetch program is an opaque external process: invoked with no
/// arguments, given the credential via environment, expected to write its
/// result files under `output_dir` and exit zero on success.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSection {
    /// Shell command line for the fetch program.
    pub program: String,

    /// Directory (relative to the work tree) the fetch program writes to.
    ///
    /// This is the only path the job ever stages and commits.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Name of the environment variable carrying the API credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Optional environment-setup command (e.g. dependency install) run
    /// before the fetch program. Non-zero exit aborts the run before any
    /// data is fetched.
    #[serde(default)]
    pub prepare: Option<String>,
}

fn default_output_dir() -> String {
    "now_data_github".to_string()
}

fn default_api_key_env() -> String {
    "CWB_API_KEY".to_string()
}

/// `[publish]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishSection {
    /// Fixed message used for every snapshot commit.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Fixed commit author identity.
    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,
}

fn default_commit_message() -> String {
    "Update now data".to_string()
}

fn default_author_name() -> String {
    "nowpub bot".to_string()
}

fn default_author_email() -> String {
    "nowpub@users.noreply.github.com".to_string()
}

impl Default for PublishSection {
    fn default() -> Self {
        Self {
            commit_message: default_commit_message(),
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

/// `[schedule]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSection {
    /// Interval between scheduled runs, e.g. `"1h"`, `"30m"`.
    #[serde(default = "default_interval")]
    pub interval: String,

    /// `"skip"` or `"queue"`.
    ///
    /// - `"skip"` (default): a trigger arriving while a run is in flight is
    ///   dropped; the next scheduled trigger is the retry.
    /// - `"queue"`: remember at most one pending run and start it when the
    ///   current run finishes.
    #[serde(
        default = "default_triggered_while_running_behaviour",
        rename = "triggered_while_running_behaviour"
    )]
    pub triggered_while_running_behaviour: String,
}

fn default_interval() -> String {
    "1h".to_string()
}

fn default_triggered_while_running_behaviour() -> String {
    "skip".to_string()
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            triggered_while_running_behaviour: default_triggered_while_running_behaviour(),
        }
    }
}

impl ScheduleSection {
    /// Convenience: the parsed interval duration.
    pub fn effective_interval(&self) -> Result<Duration, String> {
        parse_duration(&self.interval)
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"30m"`, `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
