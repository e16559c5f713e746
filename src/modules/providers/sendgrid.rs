//! SendGrid email provider under the notification capability.

use serde_json::{Map, Value, json};

use crate::config::constants::Constants;
use crate::modules::ProviderDescriptor;

use super::ProviderContract;

pub const ID: &str = "sendgrid";

pub const CONTRACT: ProviderContract = ProviderContract {
    id: ID,
    resolve: "@medusajs/notification-sendgrid",
    required: &["api_key", "from"],
};

/// Email channel with the logical-template → SendGrid-template mapping.
/// `order_placed_template` is only listed when its id is configured.
pub fn descriptor(constants: &Constants) -> ProviderDescriptor {
    let mut templates = Map::new();
    templates.insert(
        "staff_invitation_template".to_string(),
        json!(constants.sendgrid_template_invitation_sent),
    );
    if let Some(id) = &constants.sendgrid_template_order_placed {
        templates.insert("order_placed_template".to_string(), json!(id));
    }

    let mut options = Map::new();
    options.insert("channels".to_string(), json!(["email"]));
    options.insert("api_key".to_string(), json!(constants.sendgrid_api_key));
    options.insert("from".to_string(), json!(constants.sendgrid_from_email));
    options.insert("templates".to_string(), Value::Object(templates));

    ProviderDescriptor {
        id: ID.to_string(),
        resolve: CONTRACT.resolve.to_string(),
        options,
    }
}
