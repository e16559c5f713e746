//! Stripe payment provider.

use serde_json::{Map, json};

use crate::config::constants::Constants;
use crate::modules::ProviderDescriptor;

use super::ProviderContract;

pub const ID: &str = "stripe";

pub const CONTRACT: ProviderContract = ProviderContract {
    id: ID,
    resolve: "@medusajs/payment-stripe",
    required: &["apiKey", "webhookSecret"],
};

pub fn descriptor(constants: &Constants) -> ProviderDescriptor {
    let mut options = Map::new();
    options.insert("apiKey".to_string(), json!(constants.stripe_api_key));
    options.insert("webhookSecret".to_string(), json!(constants.stripe_webhook_secret));

    ProviderDescriptor {
        id: ID.to_string(),
        resolve: CONTRACT.resolve.to_string(),
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::required_pairs;
    use crate::config::env::{RawEnvironment, RunMode};

    #[test]
    fn key_and_webhook_secret() {
        let mut pairs = required_pairs();
        pairs.push(("STRIPE_API_KEY", "sk_live_1"));
        let c = Constants::derive(&RawEnvironment::from_pairs(RunMode::Production, pairs)).unwrap();

        let d = descriptor(&c);
        assert_eq!(d.resolve, "@medusajs/payment-stripe");
        assert_eq!(d.options["apiKey"], json!("sk_live_1"));
        assert!(d.options["webhookSecret"].is_null());
        assert_eq!(CONTRACT.missing(&d), vec!["webhookSecret"]);
    }
}
