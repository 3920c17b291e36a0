use serde::{Deserialize, Serialize};

/// Dashboard operator allowed to sign in
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Operator {
    pub operator_id: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_roles() -> Vec<String> {
    vec!["operator".to_string()]
}

fn default_is_active() -> bool {
    true
}
