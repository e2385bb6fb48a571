use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Issue;

/// Delivery data file recording how the sprint ended for each committed
/// or extension issue.
#[derive(Serialize, Deserialize, Clone)]
pub struct DeliveryFile {
    pub total: DeliveryTotal,
    /// Delivered to committed story point ratio, absent when nothing was
    /// committed.
    pub ratio: Option<Decimal>,
    pub issues: Vec<DeliveryIssue>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct DeliveryTotal {
    pub committed: i64,
    pub delivered: i64,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct DeliveryIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub dropped: bool,
    pub extended: bool,
    #[serde(rename = "committed story points")]
    pub committed_story_points: i64,
    #[serde(rename = "delivered story points")]
    pub delivered_story_points: i64,
    pub delivered: bool,
    pub outcome: Outcome,
    pub income: Income,
}

/// How the issue left the sprint.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Done,
    Open,
    Drop,
}

/// How the issue entered the sprint.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Income {
    Commit,
    Extend,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Done => "done",
            Outcome::Open => "open",
            Outcome::Drop => "drop",
        }
    }
}

impl Income {
    pub fn as_str(&self) -> &'static str {
        match self {
            Income::Commit => "commit",
            Income::Extend => "extend",
        }
    }
}
