use serde::{Deserialize, Serialize};

/// Scrum or kanban board as returned by the Jira Agile API.
#[derive(Serialize, Deserialize, Clone)]
pub struct Board {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub board_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<BoardLocation>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct BoardLocation {
    #[serde(rename = "projectKey", default)]
    pub project_key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Board {
    /// Key of the project the board belongs to, when Jira reports one.
    pub fn project_key(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.project_key.as_deref())
    }
}
