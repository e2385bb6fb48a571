use serde::{Deserialize, Serialize};

use super::Issue;

/// Commitment data file recording what the team signed up for.
#[derive(Serialize, Deserialize, Clone)]
pub struct CommitmentFile {
    pub total: CommitmentTotal,
    pub issues: Vec<CommitmentIssue>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CommitmentTotal {
    pub committed: i64,
}

/// Committed issue together with the way it entered the sprint: picked up
/// from the sprint backlog, marked with a commitment comment, or both.
#[derive(Serialize, Deserialize, Clone)]
pub struct CommitmentIssue {
    #[serde(flatten)]
    pub issue: Issue,
    #[serde(rename = "by sprint")]
    pub by_sprint: bool,
    #[serde(rename = "by comment")]
    pub by_comment: bool,
}
