use serde::{Deserialize, Serialize};

use crate::model::scene::DEFAULT_TENANT;

fn default_tenant() -> String {
    DEFAULT_TENANT.to_string()
}

/// A stored prompt template.
///
/// `id` may be sent empty on create; the backend assigns a UUID. `content_md5`
/// and `updated_at` are always computed server-side and ignored on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_tenant")]
    pub tenant: String,
    pub scene: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub content_md5: String,
    #[serde(default)]
    pub updated_at: i64,
}
