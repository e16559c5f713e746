//! S3-compatible object storage under the file capability.

use serde_json::{Map, json};

use crate::config::constants::Constants;
use crate::modules::ProviderDescriptor;

use super::ProviderContract;

pub const ID: &str = "s3";

pub const CONTRACT: ProviderContract = ProviderContract {
    id: ID,
    resolve: "@medusajs/medusa-file-s3",
    required: &["s3_url", "access_key_id", "secret_access_key", "bucket", "region"],
};

/// `s3_url` is [`Constants::s3_endpoint`]; `prefix` is optional.
pub fn descriptor(constants: &Constants) -> ProviderDescriptor {
    let mut options = Map::new();
    options.insert("s3_url".to_string(), json!(constants.s3_endpoint()));
    options.insert("access_key_id".to_string(), json!(constants.s3_access_key_id));
    options.insert("bucket".to_string(), json!(constants.s3_bucket));
    options.insert("region".to_string(), json!(constants.s3_region));
    options.insert("secret_access_key".to_string(), json!(constants.s3_secret_access_key));
    options.insert("prefix".to_string(), json!(constants.s3_prefix));

    ProviderDescriptor {
        id: ID.to_string(),
        resolve: CONTRACT.resolve.to_string(),
        options,
    }
}
