//! Top-level assembly and the validating factory.
//!
//! `assemble` is a pure merge of constants and module descriptors.
//! `define_config` is the single place where the structure is validated;
//! nothing upstream re-checks it.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::AppError;
use crate::modules::{self, ModuleDescriptor};

use super::constants::{COOKIE_MAX_AGE_SECS, Constants};
use super::env::RawEnvironment;
use super::types::*;

/// A [`TopLevelConfig`] that passed [`define_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct BootConfig {
    inner: TopLevelConfig,
}

impl BootConfig {
    pub fn config(&self) -> &TopLevelConfig {
        &self.inner
    }

    pub fn into_inner(self) -> TopLevelConfig {
        self.inner
    }

    pub fn module(&self, key: modules::Capability) -> Option<&ModuleDescriptor> {
        self.inner.modules.iter().find(|m| m.key == key)
    }

    /// Pretty JSON for the host runtime. Secrets are included unless
    /// `redact` is set.
    pub fn to_json(&self, redact: bool) -> Result<String, AppError> {
        let json = if redact {
            serde_json::to_string_pretty(&self.inner.redacted())?
        } else {
            serde_json::to_string_pretty(&self.inner)?
        };
        Ok(json)
    }
}

/// Merge project settings, admin settings and modules. No I/O, no validation.
pub fn assemble(constants: &Constants) -> TopLevelConfig {
    TopLevelConfig {
        project_config: ProjectConfig {
            database_url: constants.database_url.clone(),
            database_logging: constants.database_logging,
            redis_url: constants.redis_url.clone(),
            worker_mode: constants.worker_mode,
            admin_cors: constants.admin_cors.clone(),
            store_cors: constants.store_cors.clone(),
            auth_cors: constants.auth_cors.clone(),
            cookie_options: CookieOptions {
                domain: constants.cookie_domain.clone(),
                secure: constants.cookie_secure(),
                same_site: SameSite::Lax,
                max_age: COOKIE_MAX_AGE_SECS,
            },
            http: HttpSecrets {
                jwt_secret: constants.jwt_secret.clone(),
                cookie_secret: constants.cookie_secret.clone(),
            },
        },
        admin: AdminConfig {
            backend_url: constants.backend_url.clone(),
            disable: constants.disable_admin,
        },
        modules: modules::build_all(constants),
        plugins: Vec::new(),
    }
}

/// Validate the structure and seal it as a [`BootConfig`].
pub fn define_config(config: TopLevelConfig) -> Result<BootConfig, AppError> {
    let project = &config.project_config;
    require_non_empty("projectConfig.databaseUrl", &project.database_url)?;
    require_non_empty("projectConfig.http.jwtSecret", &project.http.jwt_secret)?;
    require_non_empty("projectConfig.http.cookieSecret", &project.http.cookie_secret)?;
    if project.cookie_options.max_age == 0 {
        return Err(AppError::InvalidConfig(
            "projectConfig.cookie_options.maxAge must be greater than zero".into(),
        ));
    }

    let mut seen = HashSet::new();
    for module in &config.modules {
        if !seen.insert(module.key) {
            return Err(AppError::InvalidConfig(format!(
                "duplicate module key: {}",
                module.key
            )));
        }
        require_non_empty(&format!("modules.{}.resolve", module.key), &module.resolve)?;

        // Holds providers from both `options.providers` and the sibling list.
        let mut provider_ids = HashSet::new();
        for provider in &module.providers {
            require_non_empty(&format!("modules.{}.providers.id", module.key), &provider.id)?;
            if !provider_ids.insert(provider.id.as_str()) {
                return Err(AppError::InvalidConfig(format!(
                    "duplicate provider id '{}' in module {}",
                    provider.id, module.key
                )));
            }
            require_non_empty(
                &format!("modules.{}.providers.{}.resolve", module.key, provider.id),
                &provider.resolve,
            )?;
        }
    }

    for (i, plugin) in config.plugins.iter().enumerate() {
        require_non_empty(&format!("plugins[{i}].resolve"), &plugin.resolve)?;
    }

    debug!(modules = config.modules.len(), plugins = config.plugins.len(), "config validated");
    Ok(BootConfig { inner: config })
}

/// Full pipeline: constants → modules → assembly → validation.
pub fn bootstrap(env: &RawEnvironment) -> Result<BootConfig, AppError> {
    let constants = Constants::derive(env)?;
    let boot = define_config(assemble(&constants))?;

    info!(
        mode = %constants.run_mode,
        worker_mode = constants.worker_mode.as_str(),
        modules = boot.config().modules.len(),
        admin_disabled = constants.disable_admin,
        "boot config assembled"
    );
    Ok(boot)
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidConfig(format!("{field} must not be empty")));
    }
    Ok(())
}
