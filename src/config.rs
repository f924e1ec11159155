//! Runtime configuration.
//!
//! Settings are layered, lowest precedence first: built-in defaults, an
//! optional `issuesync.yaml`, then environment variables (a `.env` in the
//! working directory is loaded first and never overrides real variables).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ports::FileSystem;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "issuesync.yaml";

/// Directory holding the local tracker's state, relative to the work dir.
pub const DEFAULT_STATE_DIR: &str = ".todos";

/// Jira Cloud connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Site URL, e.g. `https://example.atlassian.net`.
    pub url: String,
    /// Account email used for Basic auth.
    pub email: String,
    /// API token used for Basic auth.
    pub api_token: String,
    /// Project key issues are created in and listed from.
    pub project_key: String,
}

impl JiraConfig {
    /// Names of the settings that are still empty.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("url", &self.url),
            ("email", &self.email),
            ("api_token", &self.api_token),
            ("project_key", &self.project_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Local tracker binary.
    pub td_bin: String,
    /// State directory; relative paths resolve against the work dir.
    pub state_dir: Option<PathBuf>,
    /// Jira settings.
    pub jira: JiraConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { td_bin: "td".to_string(), state_dir: None, jira: JiraConfig::default() }
    }
}

impl SyncConfig {
    /// Loads the configuration for `work_dir`.
    ///
    /// `explicit` names a config file that must exist; without it,
    /// `issuesync.yaml` in `work_dir` is used when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or parsed.
    pub fn load(
        fs: &dyn FileSystem,
        work_dir: &Path,
        explicit: Option<&Path>,
    ) -> Result<Self, String> {
        let mut config = match explicit {
            Some(path) => Self::from_file(fs, path)?,
            None => {
                let path = work_dir.join(CONFIG_FILE);
                if fs.exists(&path) {
                    Self::from_file(fs, &path)?
                } else {
                    Self::default()
                }
            }
        };

        let dotenv = work_dir.join(".env");
        if let Err(err) = dotenvy::from_path(&dotenv) {
            if !err.not_found() {
                return Err(format!("Failed to load {}: {err}", dotenv.display()));
            }
        }
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self, String> {
        let contents = fs
            .read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Overrides fields from environment variables returned by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(bin) = var("ISSUESYNC_TD_BIN") {
            self.td_bin = bin;
        }
        if let Some(dir) = var("ISSUESYNC_STATE_DIR") {
            self.state_dir = Some(PathBuf::from(dir));
        }
        for (key, field) in [
            ("JIRA_URL", &mut self.jira.url),
            ("JIRA_EMAIL", &mut self.jira.email),
            ("JIRA_API_TOKEN", &mut self.jira.api_token),
            ("JIRA_PROJECT", &mut self.jira.project_key),
        ] {
            if let Some(value) = var(key) {
                *field = value;
            }
        }
    }

    /// The directory holding `<provider>-sync.json` files.
    #[must_use]
    pub fn state_dir(&self, work_dir: &Path) -> PathBuf {
        match &self.state_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => work_dir.join(dir),
            None => work_dir.join(DEFAULT_STATE_DIR),
        }
    }
}
