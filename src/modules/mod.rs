//! Module descriptors: one entry per platform capability.
//!
//! `build(capability, constants)` is the factory. The capability set is a
//! closed enum, so every capability has exactly one builder arm, checked at
//! compile time. Options stay as string-keyed JSON maps: that is the edge
//! where they cross into the external module's own configuration contract.

pub mod providers;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::constants::Constants;

use providers::ProviderError;

// ── Capability ────────────────────────────────────────────────────────────────

/// A kind of backend service the platform requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Notification,
    EventBus,
    WorkflowEngine,
    Payment,
    File,
}

impl Capability {
    /// Fixed deployment order.
    pub const ALL: [Capability; 5] = [
        Capability::Notification,
        Capability::EventBus,
        Capability::WorkflowEngine,
        Capability::Payment,
        Capability::File,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Notification => "notification",
            Capability::EventBus => "event_bus",
            Capability::WorkflowEngine => "workflow_engine",
            Capability::Payment => "payment",
            Capability::File => "file",
        }
    }

    /// Resolution target the host runtime loads for this capability.
    pub fn resolve(&self) -> &'static str {
        match self {
            Capability::Notification => "@medusajs/notification",
            Capability::EventBus => "@medusajs/event-bus-redis",
            Capability::WorkflowEngine => "@medusajs/workflow-engine-redis",
            Capability::Payment => "@medusajs/payment",
            Capability::File => "@medusajs/medusa/file",
        }
    }

    /// Whether the host expects this module's providers under
    /// `options.providers` rather than as a sibling of `options`.
    pub fn nests_providers(&self) -> bool {
        matches!(self, Capability::Notification | Capability::Payment)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Descriptors ───────────────────────────────────────────────────────────────

/// One backend implementation under a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Unique within the parent module (e.g. `"sendgrid"`, `"s3"`).
    pub id: String,
    pub resolve: String,
    pub options: Map<String, Value>,
}

/// Capability → implementation entry in the boot descriptor.
///
/// In memory every provider lives in `providers`. On the wire, capabilities
/// that [nest their providers](Capability::nests_providers) carry the list as
/// `options.providers`; reading accepts either placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireModule", try_from = "WireModule")]
pub struct ModuleDescriptor {
    pub key: Capability,
    pub resolve: String,
    /// Module options, without any provider list.
    pub options: Map<String, Value>,
    pub providers: Vec<ProviderDescriptor>,
}

/// JSON form of [`ModuleDescriptor`].
#[derive(Serialize, Deserialize)]
struct WireModule {
    key: Capability,
    resolve: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    options: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    providers: Vec<ProviderDescriptor>,
}

impl From<ModuleDescriptor> for WireModule {
    fn from(module: ModuleDescriptor) -> Self {
        let ModuleDescriptor {
            key,
            resolve,
            mut options,
            mut providers,
        } = module;
        if key.nests_providers() && !providers.is_empty() {
            let list = providers.drain(..).map(ProviderDescriptor::into_value).collect();
            options.insert(NESTED_PROVIDERS.to_string(), Value::Array(list));
        }
        Self {
            key,
            resolve,
            options,
            providers,
        }
    }
}

impl TryFrom<WireModule> for ModuleDescriptor {
    type Error = serde_json::Error;

    fn try_from(wire: WireModule) -> Result<Self, Self::Error> {
        let WireModule {
            key,
            resolve,
            mut options,
            providers: top_level,
        } = wire;
        let mut providers: Vec<ProviderDescriptor> = match options.remove(NESTED_PROVIDERS) {
            Some(nested) => serde_json::from_value(nested)?,
            None => Vec::new(),
        };
        providers.extend(top_level);
        Ok(Self {
            key,
            resolve,
            options,
            providers,
        })
    }
}

const NESTED_PROVIDERS: &str = "providers";

impl ProviderDescriptor {
    fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), Value::String(self.id));
        map.insert("resolve".into(), Value::String(self.resolve));
        map.insert("options".into(), Value::Object(self.options));
        Value::Object(map)
    }
}

impl ModuleDescriptor {
    fn new(key: Capability) -> Self {
        Self {
            key,
            resolve: key.resolve().to_string(),
            options: Map::new(),
            providers: Vec::new(),
        }
    }

    fn with_options(mut self, options: Value) -> Self {
        if let Value::Object(map) = options {
            self.options = map;
        }
        self
    }

    fn with_provider(mut self, provider: ProviderDescriptor) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider(&self, id: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.id == id)
    }
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// Build the descriptor for one capability. Never fails: absent secrets are
/// written as `null` and left for the provider to reject at its own startup.
pub fn build(capability: Capability, constants: &Constants) -> ModuleDescriptor {
    let module = ModuleDescriptor::new(capability);
    match capability {
        Capability::Notification => {
            module.with_provider(providers::sendgrid::descriptor(constants))
        }
        Capability::EventBus => module.with_options(json!({
            "redisUrl": constants.redis_url,
        })),
        Capability::WorkflowEngine => module.with_options(json!({
            "redis": { "url": constants.redis_url },
        })),
        Capability::Payment => module.with_provider(providers::stripe::descriptor(constants)),
        Capability::File => module.with_provider(providers::s3::descriptor(constants)),
    }
}

/// The full module sequence, one entry per capability, in deployment order.
pub fn build_all(constants: &Constants) -> Vec<ModuleDescriptor> {
    Capability::ALL
        .iter()
        .map(|&capability| build(capability, constants))
        .collect()
}

/// Run every known provider contract against the module sequence and collect
/// the failures. Nothing here stops startup; the providers do that themselves.
pub fn preflight(modules: &[ModuleDescriptor]) -> Vec<ProviderError> {
    modules
        .iter()
        .flat_map(|m| m.providers.iter())
        .filter_map(|p| providers::contract_for(&p.id).map(|c| c.check(p)))
        .filter_map(Result::err)
        .collect()
}
