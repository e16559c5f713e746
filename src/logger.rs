//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after the environment snapshot is loaded so
//! `LOG_LEVEL` from the env file is visible. Output always goes to stderr so
//! stdout stays clean for the JSON descriptor.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Level used when neither the command line nor `LOG_LEVEL` names one.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

/// Where the effective level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSource {
    /// `-v` flags. Overrides `RUST_LOG`.
    Cli,
    /// `LOG_LEVEL` from the snapshot. `RUST_LOG` may refine it.
    Configured,
    Default,
}

/// Pick the effective level: CLI flags, then `LOG_LEVEL`, then [`DEFAULT_LEVEL`].
///
/// `LOG_LEVEL` is validated even when the CLI wins, so a typo in the env file
/// never goes unnoticed.
pub fn resolve_level(
    cli: Option<&str>,
    configured: Option<&str>,
) -> Result<(LevelFilter, LevelSource), AppError> {
    let configured = configured
        .map(|raw| parse_level("LOG_LEVEL", raw))
        .transpose()?;
    if let Some(raw) = cli {
        return Ok((parse_level("command-line", raw)?, LevelSource::Cli));
    }
    Ok(match configured {
        Some(level) => (level, LevelSource::Configured),
        None => (DEFAULT_LEVEL, LevelSource::Default),
    })
}

/// Install the global subscriber and return the level it was built from.
///
/// A level forced on the command line ignores `RUST_LOG`. Otherwise
/// `RUST_LOG` directives apply when present and the resolved level is the
/// fallback.
pub fn init(cli: Option<&str>, configured: Option<&str>) -> Result<LevelFilter, AppError> {
    let (level, source) = resolve_level(cli, configured)?;
    let filter = match source {
        LevelSource::Cli => EnvFilter::new(level.to_string()),
        LevelSource::Configured | LevelSource::Default => EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(level)
}

fn parse_level(origin: &str, raw: &str) -> Result<LevelFilter, AppError> {
    let level = raw.trim();
    if level.is_empty() {
        return Err(AppError::Logger(format!("{origin} log level must not be empty")));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised {origin} log level: '{level}'")))
}
