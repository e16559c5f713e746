//! Provider descriptors and their startup contracts.
//!
//! Each provider module exposes `descriptor(constants)` and a `CONTRACT`.
//! Adding a backend = new module + new entry in [`CONTRACTS`] + a builder
//! arm in [`super::build`].

pub mod s3;
pub mod sendgrid;
pub mod stripe;

use serde_json::Value;
use thiserror::Error;

use super::ProviderDescriptor;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider {provider}: missing required option '{field}'")]
    MissingOption {
        provider: String,
        field: &'static str,
    },
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

// ── Contract ──────────────────────────────────────────────────────────────────

/// Option fields a provider requires at its own startup.
///
/// Assembly never enforces this; it describes what the external module will
/// reject so stubs and the `--check` preflight can report it early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderContract {
    pub id: &'static str,
    pub resolve: &'static str,
    pub required: &'static [&'static str],
}

impl ProviderContract {
    /// First required field that is absent, `null` or an empty string.
    pub fn check(&self, descriptor: &ProviderDescriptor) -> Result<(), ProviderError> {
        match self.missing(descriptor).first() {
            Some(&field) => Err(ProviderError::MissingOption {
                provider: descriptor.id.clone(),
                field,
            }),
            None => Ok(()),
        }
    }

    /// Every required field that is absent, `null` or an empty string.
    pub fn missing(&self, descriptor: &ProviderDescriptor) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|field| is_blank(descriptor.options.get(*field)))
            .collect()
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Every provider this deployment knows how to describe.
pub static CONTRACTS: [&ProviderContract; 3] =
    [&sendgrid::CONTRACT, &stripe::CONTRACT, &s3::CONTRACT];

/// Look up the contract for a provider id.
pub fn contract_for(id: &str) -> Option<&'static ProviderContract> {
    CONTRACTS.iter().copied().find(|c| c.id == id)
}

/// Like [`contract_for`], but an unknown id is an error.
pub fn require_contract(id: &str) -> Result<&'static ProviderContract, ProviderError> {
    contract_for(id).ok_or_else(|| ProviderError::UnknownProvider(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    /// Stand-in for an external provider module: it validates its own
    /// options when it starts, the way the real module would.
    struct StubProvider {
        id: String,
    }

    impl StubProvider {
        fn start(descriptor: &ProviderDescriptor) -> Result<Self, ProviderError> {
            require_contract(&descriptor.id)?.check(descriptor)?;
            Ok(Self { id: descriptor.id.clone() })
        }
    }

    fn descriptor(id: &str, options: Value) -> ProviderDescriptor {
        let options = match options {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        ProviderDescriptor {
            id: id.to_string(),
            resolve: "stub".to_string(),
            options,
        }
    }

    #[test]
    fn contract_lookup() {
        assert_eq!(contract_for("stripe").map(|c| c.id), Some("stripe"));
        assert_eq!(contract_for("s3").map(|c| c.id), Some("s3"));
        assert!(contract_for("paypal").is_none());
        assert!(matches!(require_contract("paypal"), Err(ProviderError::UnknownProvider(_))));
    }

    #[test]
    fn stub_starts_when_contract_satisfied() {
        let d = descriptor("stripe", json!({ "apiKey": "sk_test", "webhookSecret": "whsec" }));
        let stub = StubProvider::start(&d).unwrap();
        assert_eq!(stub.id, "stripe");
    }

    #[test]
    fn stub_fails_at_its_own_startup_on_missing_secret() {
        let d = descriptor("stripe", json!({ "apiKey": "sk_test", "webhookSecret": null }));
        let err = StubProvider::start(&d).err().unwrap();
        assert_eq!(
            err,
            ProviderError::MissingOption { provider: "stripe".into(), field: "webhookSecret" }
        );
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let d = descriptor("sendgrid", json!({ "api_key": " ", "from": "a@b.c" }));
        assert_eq!(sendgrid::CONTRACT.missing(&d), vec!["api_key"]);
    }

    #[test]
    fn unknown_provider_rejected_by_stub() {
        let d = descriptor("carrier-pigeon", json!({}));
        assert!(matches!(StubProvider::start(&d), Err(ProviderError::UnknownProvider(_))));
    }
}
