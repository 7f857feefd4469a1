use serde::{Deserialize, Serialize};

/// A business context (e.g. "research report") that scopes placeholders and prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub code: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

impl Scene {
    /// A scene known only by its code; the label falls back to the code.
    pub fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            label: code.to_string(),
            description: String::new(),
        }
    }
}

/// The name of the tenant every prompt belongs to unless told otherwise.
pub const DEFAULT_TENANT: &str = "default";

/// An organisational scope for prompt configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl Tenant {
    pub fn default_tenant() -> Self {
        Self {
            code: DEFAULT_TENANT.to_string(),
            name: "Default".to_string(),
        }
    }
}
