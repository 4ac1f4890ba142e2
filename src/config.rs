//! Runtime configuration: where forms are stored and what gets logged.
//!
//! Each setting is taken from the first source that has it: command-line
//! flag, process environment, `.env` file in the working directory, built-in
//! default.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::ConfigError;

pub const DATA_DIR_VAR: &str = "FORMSMITH_DATA_DIR";
pub const LOG_VAR: &str = "FORMSMITH_LOG";
/// Selects an extra `.env.<name>` file layered over `.env`.
pub const ENV_VAR: &str = "FORMSMITH_ENV";
pub const DEFAULT_LOG_FILTER: &str = "formsmith=warn";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Resolve against the real process environment.
    pub fn load(data_dir_flag: Option<PathBuf>, folder: &Path) -> Result<Self, ConfigError> {
        Self::resolve(data_dir_flag, folder, |key| std::env::var(key).ok())
    }

    /// Resolve with `env` standing in for the process environment.
    pub fn resolve<F>(
        data_dir_flag: Option<PathBuf>,
        folder: &Path,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut file_vars = load_env_file(folder, ".env")?;
        let profile = env(ENV_VAR).or_else(|| file_vars.get(ENV_VAR).cloned());
        if let Some(profile) = profile {
            file_vars.extend(load_env_file(folder, &format!(".env.{}", profile))?);
        }

        let lookup = |key: &str| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file_vars.get(key).cloned())
        };

        let data_dir = match data_dir_flag {
            Some(dir) => dir,
            None => match lookup(DATA_DIR_VAR) {
                Some(dir) => expand_home(&dir),
                None => default_data_dir().ok_or(ConfigError::NoDataDir)?,
            },
        };

        let log_filter = lookup(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            data_dir,
            log_filter,
        })
    }
}

/// `~/.formsmith`
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".formsmith"))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

/// Read `KEY=value` pairs from `folder/filename`. A missing file is empty.
pub fn load_env_file(folder: &Path, filename: &str) -> Result<IndexMap<String, String>, ConfigError> {
    let env_file = folder.join(filename);
    if !env_file.exists() {
        return Ok(IndexMap::new());
    }

    let content = std::fs::read_to_string(&env_file).map_err(|source| ConfigError::Read {
        path: env_file.display().to_string(),
        source,
    })?;
    Ok(parse_env(&content))
}

pub fn parse_env(content: &str) -> IndexMap<String, String> {
    let mut vars = IndexMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let value = value.trim().trim_matches('"').trim_matches('\'');
        vars.insert(key.to_string(), value.to_string());
    }
    vars
}
