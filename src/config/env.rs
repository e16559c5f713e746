//! Environment loading: one-shot snapshot of process env plus an optional
//! run-mode specific env file.
//!
//! The snapshot is never written back into the process environment; every
//! later step receives the [`RawEnvironment`] explicitly.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;

/// Variable that selects the run mode.
pub const RUN_MODE_VAR: &str = "APP_ENV";

/// Deployment context. Controls env-file selection and cookie security.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunMode {
    #[default]
    Development,
    Staging,
    Production,
    Test,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Development => "development",
            RunMode::Staging => "staging",
            RunMode::Production => "production",
            RunMode::Test => "test",
        }
    }

    /// Parse the value of `APP_ENV`. Absent or blank means development.
    pub fn from_env_value(value: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(RunMode::Development);
        };
        match raw.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RunMode::Development),
            "staging" => Ok(RunMode::Staging),
            "production" | "prod" => Ok(RunMode::Production),
            "test" => Ok(RunMode::Test),
            _ => Err(AppError::InvalidVar {
                name: RUN_MODE_VAR,
                value: raw.to_string(),
                reason: "expected development, staging, production or test".into(),
            }),
        }
    }

    /// Env file consulted for this mode: `.env` for development,
    /// `.env.<mode>` otherwise.
    pub fn env_file_name(&self) -> String {
        match self {
            RunMode::Development => ".env".to_string(),
            other => format!(".env.{}", other.as_str()),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, RunMode::Production)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of the environment a configuration is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEnvironment {
    mode: RunMode,
    vars: BTreeMap<String, String>,
}

impl RawEnvironment {
    /// Build a snapshot directly from key/value pairs. No I/O.
    pub fn from_pairs<I, K, V>(mode: RunMode, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mode,
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Look up a variable. Empty or whitespace-only values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Reads the env file for a run mode and overlays the process environment.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    mode: RunMode,
    dir: PathBuf,
    include_process_env: bool,
}

impl EnvLoader {
    pub fn new(mode: RunMode, dir: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            dir: dir.into(),
            include_process_env: true,
        }
    }

    /// Toggle the process-environment overlay. Tests turn it off so the
    /// snapshot depends only on the env file.
    pub fn with_process_env(mut self, include: bool) -> Self {
        self.include_process_env = include;
        self
    }

    pub fn env_file_path(&self) -> PathBuf {
        self.dir.join(self.mode.env_file_name())
    }

    /// Produce the snapshot. A missing env file is not an error; a malformed
    /// one is.
    pub fn load(&self) -> Result<RawEnvironment, AppError> {
        let path = self.env_file_path();
        let mut vars = read_env_file(&path)?;

        if self.include_process_env {
            // Process variables win over file entries. Non-UTF-8 entries are skipped.
            vars.extend(
                env::vars_os()
                    .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
            );
        }

        debug!(
            mode = %self.mode,
            env_file = %path.display(),
            vars = vars.len(),
            "environment snapshot loaded"
        );

        Ok(RawEnvironment {
            mode: self.mode,
            vars,
        })
    }
}

/// Resolve the run mode from the process `APP_ENV` and load the snapshot
/// from `dir`.
pub fn load_from_process(dir: &Path) -> Result<RawEnvironment, AppError> {
    let mode_value = env::var(RUN_MODE_VAR).ok();
    let mode = RunMode::from_env_value(mode_value.as_deref())?;
    EnvLoader::new(mode, dir).load()
}

fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>, AppError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(
                env_file = %path.display(),
                "env file not found, using process environment only"
            );
            return Ok(BTreeMap::new());
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(AppError::Io(io::Error::other(format!(
            "{} exists but is not a regular file",
            path.display()
        ))));
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| env_file_error(path, e))?;

    let mut vars = BTreeMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| env_file_error(path, e))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Read failures stay I/O errors; everything else is a malformed file.
fn env_file_error(path: &Path, err: dotenvy::Error) -> AppError {
    match err {
        dotenvy::Error::Io(e) => AppError::Io(e),
        other => AppError::EnvFile {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}
