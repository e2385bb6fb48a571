use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task definition set, converted from CSV and consumed by issue import
/// tooling.
#[derive(Serialize, Deserialize, Clone)]
pub struct TasksFile {
    #[serde(rename = "set id")]
    pub set_id: String,
    pub author: Option<String>,
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Task {
    pub title: String,
    pub summary: String,
    pub idx: i64,
    #[serde(rename = "type name", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(
        rename = "story points",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub story_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic: Option<Epic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<TaskLinks>,
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct Epic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<EpicLink>,
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct EpicLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct TaskLinks {
    pub related: Vec<LinkRef>,
}

/// Reference to another task, either by its position in the set or by an
/// existing Jira issue key.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(untagged)]
pub enum LinkRef {
    Idx(i64),
    Key(String),
}

impl Epic {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.link.is_none()
    }
}

impl EpicLink {
    pub fn is_empty(&self) -> bool {
        self.idx.is_none() && self.key.is_none()
    }
}
