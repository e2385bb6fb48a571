use serde::{Deserialize, Serialize};

/// Jira project as returned by the project endpoints.
#[derive(Serialize, Deserialize, Clone)]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: String,
}
