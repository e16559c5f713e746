//! Startup configuration: environment snapshot → constants → boot descriptor.
//!
//! # Module layout
//!
//! - **env**: Run mode, env-file selection and the immutable
//!   `RawEnvironment` snapshot (`EnvLoader`, `load_from_process`).
//! - **constants**: Typed `Constants` derived from the snapshot: defaults,
//!   required secrets, comma-delimited lists, the S3 endpoint.
//! - **types**: Public descriptor structs in the host runtime's JSON shape
//!   (`TopLevelConfig`, `ProjectConfig`, `CookieOptions`, …) and redaction.
//! - **assemble**: `assemble`, the validating factory `define_config`, and
//!   the one-call `bootstrap` pipeline.

pub mod assemble;
pub mod constants;
pub mod env;
pub mod types;

pub use assemble::{BootConfig, assemble, bootstrap, define_config};
pub use constants::{COOKIE_MAX_AGE_SECS, Constants, WorkerMode, split_list};
pub use env::{EnvLoader, RawEnvironment, RunMode, load_from_process};
pub use types::*;
