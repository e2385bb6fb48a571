use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CjmError, Result};

/// Sprint as returned by the Jira Agile API.
#[derive(Serialize, Deserialize, Clone)]
pub struct Sprint {
    pub id: i64,
    pub name: String,
    pub state: String,
    #[serde(rename = "startDate", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(rename = "completeDate", default, skip_serializing_if = "Option::is_none")]
    pub complete_date: Option<String>,
    #[serde(rename = "originBoardId", default, skip_serializing_if = "Option::is_none")]
    pub origin_board_id: Option<i64>,
}

/// Sprint data file tying a working period to a Jira project. All other
/// data files are derived from it.
#[derive(Serialize, Deserialize, Clone)]
pub struct SprintFile {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "start date")]
    pub start_date: NaiveDate,
    #[serde(rename = "end date")]
    pub end_date: NaiveDate,
    #[serde(rename = "comment prefix", default)]
    pub comment_prefix: String,
    pub project: SprintProject,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct SprintProject {
    pub key: String,
    pub name: String,
}

impl SprintFile {
    /// Sprint id, required by the commands that talk to the Jira sprint
    /// resources.
    pub fn id_required(&self, path: &Path) -> Result<i64> {
        self.id.ok_or_else(|| CjmError::MissingSprintFileId {
            path: path.to_path_buf(),
        })
    }

    /// Comment marking issues with the given state, e.g. "AP WW01/Committed".
    pub fn comment(&self, postfix: &str) -> String {
        format!("{}/{}", self.comment_prefix, postfix)
    }
}
