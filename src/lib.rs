//! Commerce backend startup configuration.
//!
//! Loads an environment snapshot once, derives typed constants, builds the
//! capability module descriptors and validates the assembled boot descriptor
//! the host runtime consumes. Actual payment, email, event-bus, workflow and
//! storage work happens in the external modules these descriptors name.

pub mod config;
pub mod error;
pub mod logger;
pub mod modules;

pub use config::{BootConfig, RawEnvironment, RunMode, bootstrap};
pub use error::AppError;
pub use modules::{Capability, ModuleDescriptor, ProviderDescriptor};
