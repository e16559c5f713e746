//! Typed constants derived from the environment snapshot.
//!
//! [`Constants::derive`] is a pure function of [`RawEnvironment`]: no I/O,
//! no reads of the live process environment.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::env::{RawEnvironment, RunMode};

/// Cookie lifetime in seconds (99 years), identical across run modes.
pub const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365 * 99;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:9000";

/// Which process roles this instance runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerMode {
    #[default]
    Shared,
    Worker,
    Server,
}

impl WorkerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerMode::Shared => "shared",
            WorkerMode::Worker => "worker",
            WorkerMode::Server => "server",
        }
    }
}

/// Fully-resolved configuration constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constants {
    pub run_mode: RunMode,
    pub database_url: String,
    pub database_logging: bool,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub cookie_secret: String,
    /// `None` when unset or blank; the host then scopes cookies to the request host.
    pub cookie_domain: Option<String>,
    pub admin_cors: Vec<String>,
    pub store_cors: Vec<String>,
    pub auth_cors: Vec<String>,
    pub backend_url: String,
    pub disable_admin: bool,
    pub worker_mode: WorkerMode,

    pub sendgrid_api_key: Option<String>,
    /// `SENDGRID_FROM_EMAIL`, falling back to `SENDGRID_FROM`.
    pub sendgrid_from_email: Option<String>,
    pub sendgrid_template_invitation_sent: Option<String>,
    pub sendgrid_template_order_placed: Option<String>,

    pub stripe_api_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,

    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
    pub s3_prefix: Option<String>,
}

impl Constants {
    /// Derive every constant from the snapshot.
    ///
    /// `DATABASE_URL`, `JWT_SECRET` and `COOKIE_SECRET` are required. Provider
    /// secrets are optional here; the providers report them at their own startup.
    pub fn derive(env: &RawEnvironment) -> Result<Self, AppError> {
        Ok(Self {
            run_mode: env.mode(),
            database_url: required(env, "DATABASE_URL")?,
            database_logging: parse_flag(env, "DATABASE_LOGGING", true)?,
            redis_url: optional(env, "REDIS_URL"),
            jwt_secret: required(env, "JWT_SECRET")?,
            cookie_secret: required(env, "COOKIE_SECRET")?,
            cookie_domain: optional(env, "COOKIE_DOMAIN"),
            admin_cors: split_list(env.get("ADMIN_CORS")),
            store_cors: split_list(env.get("STORE_CORS")),
            auth_cors: split_list(env.get("AUTH_CORS")),
            backend_url: optional(env, "BACKEND_PUBLIC_URL")
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            disable_admin: parse_flag(env, "DISABLE_ADMIN", false)?,
            worker_mode: parse_worker_mode(env)?,

            sendgrid_api_key: optional(env, "SENDGRID_API_KEY"),
            sendgrid_from_email: optional(env, "SENDGRID_FROM_EMAIL")
                .or_else(|| optional(env, "SENDGRID_FROM")),
            sendgrid_template_invitation_sent: optional(env, "SENDGRID_TEMPLATE_INVITATION_SENT"),
            sendgrid_template_order_placed: optional(env, "SENDGRID_TEMPLATE_ORDER_PLACED_ID"),

            stripe_api_key: optional(env, "STRIPE_API_KEY"),
            stripe_webhook_secret: optional(env, "STRIPE_WEBHOOK_SECRET"),

            s3_bucket: optional(env, "S3_BUCKET"),
            s3_region: optional(env, "S3_REGION"),
            s3_access_key_id: optional(env, "S3_ACCESS_KEY_ID"),
            s3_secret_access_key: optional(env, "S3_SECRET_ACCESS_KEY"),
            s3_prefix: optional(env, "S3_PREFIX"),
        })
    }

    /// Virtual-hosted AWS endpoint built from bucket and region. `None` when
    /// either is missing.
    pub fn s3_endpoint(&self) -> Option<String> {
        match (&self.s3_bucket, &self.s3_region) {
            (Some(bucket), Some(region)) => {
                Some(format!("https://{bucket}.s3.{region}.amazonaws.com"))
            }
            _ => None,
        }
    }

    /// Cookies are `Secure` only in production.
    pub fn cookie_secure(&self) -> bool {
        self.run_mode.is_production()
    }
}

/// Split a comma-delimited list, trimming segments and dropping empty ones.
/// An absent value yields an empty list.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn optional(env: &RawEnvironment, key: &str) -> Option<String> {
    env.get(key).map(|v| v.trim().to_string())
}

fn required(env: &RawEnvironment, key: &'static str) -> Result<String, AppError> {
    optional(env, key).ok_or(AppError::MissingVar(key))
}

fn parse_flag(env: &RawEnvironment, key: &'static str, default: bool) -> Result<bool, AppError> {
    let Some(raw) = env.get(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::InvalidVar {
            name: key,
            value: raw.to_string(),
            reason: "expected a boolean (true/false, 1/0, yes/no, on/off)".into(),
        }),
    }
}

fn parse_worker_mode(env: &RawEnvironment) -> Result<WorkerMode, AppError> {
    let Some(raw) = env.get("WORKER_MODE") else {
        return Ok(WorkerMode::default());
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "shared" => Ok(WorkerMode::Shared),
        "worker" => Ok(WorkerMode::Worker),
        "server" => Ok(WorkerMode::Server),
        _ => Err(AppError::InvalidVar {
            name: "WORKER_MODE",
            value: raw.to_string(),
            reason: "expected shared, worker or server".into(),
        }),
    }
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Minimal env pairs that satisfy every required constant.
#[cfg(test)]
pub(crate) fn required_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("DATABASE_URL", "postgres://app:pw@localhost:5432/shop"),
        ("JWT_SECRET", "jwt-secret"),
        ("COOKIE_SECRET", "cookie-secret"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(mode: RunMode, extra: &[(&'static str, &'static str)]) -> RawEnvironment {
        let mut pairs = required_pairs();
        pairs.extend_from_slice(extra);
        RawEnvironment::from_pairs(mode, pairs)
    }

    #[test]
    fn split_list_basic() {
        assert_eq!(
            split_list(Some("https://a.com,https://b.com")),
            vec!["https://a.com", "https://b.com"]
        );
    }

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(
            split_list(Some(" https://a.com , ,https://b.com,")),
            vec!["https://a.com", "https://b.com"]
        );
        assert!(split_list(Some("")).is_empty());
        assert!(split_list(Some(" , ")).is_empty());
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn absent_cors_is_empty_list() {
        let c = Constants::derive(&env_with(RunMode::Development, &[])).unwrap();
        assert_eq!(c.admin_cors, Vec::<String>::new());
        assert!(c.store_cors.is_empty());
        assert!(c.auth_cors.is_empty());
    }

    #[test]
    fn defaults_applied() {
        let c = Constants::derive(&env_with(RunMode::Development, &[])).unwrap();
        assert_eq!(c.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(c.worker_mode, WorkerMode::Shared);
        assert!(!c.disable_admin);
        assert!(c.database_logging);
        assert_eq!(c.redis_url, None);
        assert_eq!(c.cookie_domain, None);
    }

    #[test]
    fn missing_required_var_errors() {
        let env = RawEnvironment::from_pairs(
            RunMode::Production,
            [("DATABASE_URL", "postgres://x"), ("COOKIE_SECRET", "c")],
        );
        let err = Constants::derive(&env).unwrap_err();
        assert!(matches!(err, AppError::MissingVar("JWT_SECRET")));
    }

    #[test]
    fn blank_required_var_counts_as_missing() {
        let env = env_with(RunMode::Development, &[("COOKIE_SECRET", "  ")]);
        let err = Constants::derive(&env).unwrap_err();
        assert!(matches!(err, AppError::MissingVar("COOKIE_SECRET")));
    }

    #[test]
    fn flags_parse() {
        for (raw, expected) in [
            ("true", true),
            ("TRUE", true),
            ("1", true),
            ("on", true),
            ("false", false),
            ("0", false),
            ("No", false),
        ] {
            let pairs: Vec<(&'static str, &'static str)> = vec![("DISABLE_ADMIN", raw)];
            let c = Constants::derive(&env_with(RunMode::Test, &pairs)).unwrap();
            assert_eq!(c.disable_admin, expected, "DISABLE_ADMIN={raw}");
        }
    }

    #[test]
    fn bad_flag_errors() {
        let err =
            Constants::derive(&env_with(RunMode::Test, &[("DISABLE_ADMIN", "maybe")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidVar { name: "DISABLE_ADMIN", .. }));
    }

    #[test]
    fn worker_mode_parses() {
        let c = Constants::derive(&env_with(RunMode::Test, &[("WORKER_MODE", "Worker")])).unwrap();
        assert_eq!(c.worker_mode, WorkerMode::Worker);
        let err =
            Constants::derive(&env_with(RunMode::Test, &[("WORKER_MODE", "both")])).unwrap_err();
        assert!(err.to_string().contains("WORKER_MODE"));
    }

    #[test]
    fn sendgrid_from_falls_back() {
        let c = Constants::derive(&env_with(
            RunMode::Test,
            &[("SENDGRID_FROM", "shop@example.com")],
        ))
        .unwrap();
        assert_eq!(c.sendgrid_from_email.as_deref(), Some("shop@example.com"));

        let c = Constants::derive(&env_with(
            RunMode::Test,
            &[
                ("SENDGRID_FROM", "old@example.com"),
                ("SENDGRID_FROM_EMAIL", "new@example.com"),
            ],
        ))
        .unwrap();
        assert_eq!(c.sendgrid_from_email.as_deref(), Some("new@example.com"));
    }

    #[test]
    fn s3_endpoint_from_bucket_and_region() {
        let c = Constants::derive(&env_with(
            RunMode::Production,
            &[("S3_BUCKET", "bkt"), ("S3_REGION", "us-east-1")],
        ))
        .unwrap();
        assert_eq!(
            c.s3_endpoint().as_deref(),
            Some("https://bkt.s3.us-east-1.amazonaws.com")
        );
    }

    #[test]
    fn s3_endpoint_ignores_s3_url() {
        let c = Constants::derive(&env_with(
            RunMode::Production,
            &[
                ("S3_BUCKET", "bkt"),
                ("S3_REGION", "us-east-1"),
                ("S3_URL", "https://cdn.example.com"),
            ],
        ))
        .unwrap();
        assert_eq!(
            c.s3_endpoint().as_deref(),
            Some("https://bkt.s3.us-east-1.amazonaws.com")
        );
    }

    #[test]
    fn s3_endpoint_absent_without_region() {
        let c =
            Constants::derive(&env_with(RunMode::Production, &[("S3_BUCKET", "bkt")])).unwrap();
        assert_eq!(c.s3_endpoint(), None);
    }

    #[test]
    fn cookie_policy_per_mode() {
        assert_eq!(COOKIE_MAX_AGE_SECS, 3_122_064_000);
        for mode in [RunMode::Development, RunMode::Staging, RunMode::Test] {
            let c = Constants::derive(&env_with(mode, &[])).unwrap();
            assert!(!c.cookie_secure(), "{mode} must not set Secure");
        }
        let c = Constants::derive(&env_with(RunMode::Production, &[])).unwrap();
        assert!(c.cookie_secure());
    }

    #[test]
    fn derivation_is_deterministic() {
        let env = env_with(
            RunMode::Staging,
            &[
                ("ADMIN_CORS", "https://admin.example.com"),
                ("REDIS_URL", "redis://cache:6379"),
            ],
        );
        assert_eq!(Constants::derive(&env).unwrap(), Constants::derive(&env).unwrap());
    }
}
