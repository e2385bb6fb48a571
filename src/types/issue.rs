use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CjmError, Result};

/// The issue properties the toolchain works with, extracted from the much
/// larger Jira issue payload.
#[derive(Serialize, Deserialize, Clone)]
pub struct Issue {
    pub id: i64,
    pub key: String,
    pub summary: String,
    #[serde(rename = "assignee id")]
    pub assignee_id: Option<String>,
    #[serde(rename = "story points")]
    pub story_points: Option<i64>,
    pub status: String,
    #[serde(rename = "resolution date")]
    pub resolution_date: Option<String>,
}

#[derive(Deserialize)]
struct RawIssue {
    id: String,
    key: String,
    fields: RawFields,
}

#[derive(Deserialize)]
struct RawFields {
    summary: String,
    #[serde(default)]
    assignee: Option<RawAssignee>,
    status: RawStatus,
    #[serde(default)]
    resolutiondate: Option<String>,
    #[serde(flatten)]
    custom: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawAssignee {
    #[serde(rename = "accountId")]
    account_id: String,
}

#[derive(Deserialize)]
struct RawStatus {
    name: String,
}

impl Issue {
    /// Extract the tailored issue record from a raw Jira issue payload.
    /// Story points live in a server-specific custom field; fractional
    /// estimates are truncated to whole points.
    pub fn extract(value: serde_json::Value, story_points_field: &str) -> Result<Issue> {
        let raw: RawIssue =
            serde_json::from_value(value).map_err(|e| CjmError::Payload(e.to_string()))?;

        let id = raw
            .id
            .parse()
            .map_err(|_| CjmError::Payload(format!("issue id '{}' is not numeric", raw.id)))?;

        let story_points = raw
            .fields
            .custom
            .get(story_points_field)
            .and_then(serde_json::Value::as_f64)
            .map(|v| v as i64);

        Ok(Issue {
            id,
            key: raw.key,
            summary: raw.fields.summary,
            assignee_id: raw.fields.assignee.map(|a| a.account_id),
            story_points,
            status: raw.fields.status.name,
            resolution_date: raw.fields.resolutiondate,
        })
    }

    /// Day the issue was resolved. Jira reports timestamps like
    /// "2023-01-27T16:02:31.000+0100"; anything unparseable counts as
    /// unresolved.
    pub fn resolution_day(&self) -> Option<NaiveDate> {
        let raw = self.resolution_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| raw.split('T').next()?.parse().ok())
    }
}

/// Minimal issue listing record used by the sprint issue listing.
#[derive(Serialize, Clone)]
pub struct IssueBrief {
    pub id: String,
    pub key: String,
    pub summary: String,
}
