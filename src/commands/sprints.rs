use std::path::Path;

use chrono::{Duration, Local};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::SprintFileArgs;
use crate::client::JiraClient;
use crate::config::Config;
use crate::data;
use crate::error::Result;
use crate::output;
use crate::period;
use crate::requests;
use crate::types::{SprintFile, SprintProject};

#[derive(Serialize, Clone)]
struct SprintListing {
    id: i64,
    name: String,
    state: String,
    #[serde(rename = "start date")]
    start_date: Option<String>,
    #[serde(rename = "end date")]
    end_date: Option<String>,
    #[serde(rename = "complete date")]
    complete_date: Option<String>,
}

#[derive(Tabled)]
struct SprintRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
}

pub async fn list(client: &JiraClient, config: &Config, board: Option<i64>) -> Result<()> {
    let board_id = config.board_id(board)?;

    let sprints = requests::sprints(client, board_id).await?;

    // Jira reports sprints a board merely displays; keep its own only
    let listings: Vec<SprintListing> = sprints
        .into_iter()
        .filter(|sprint| sprint.origin_board_id == Some(board_id))
        .map(|sprint| SprintListing {
            id: sprint.id,
            name: sprint.name,
            state: sprint.state,
            start_date: sprint.start_date,
            end_date: sprint.end_date,
            complete_date: sprint.complete_date,
        })
        .collect();

    output::print_table(&listings, |s| SprintRow {
        id: s.id,
        name: s.name.clone(),
        state: s.state.clone(),
        start: s.start_date.as_deref().map(output::format_date_only).unwrap_or_default(),
        end: s.end_date.as_deref().map(output::format_date_only).unwrap_or_default(),
    });

    Ok(())
}

#[derive(Tabled)]
struct IssueBriefRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

pub async fn list_issues(client: &JiraClient, config: &Config, sprint: Option<i64>) -> Result<()> {
    let sprint_id = config.sprint_id(sprint)?;

    let briefs = requests::sprint_issue_briefs(client, sprint_id).await?;

    output::print_table(&briefs, |b| IssueBriefRow {
        id: b.id.clone(),
        key: b.key.clone(),
        summary: b.summary.clone(),
    });

    Ok(())
}

fn start_date(args: &SprintFileArgs) -> chrono::NaiveDate {
    if let Some(date) = args.start {
        return date;
    }

    let monday = period::week_monday(Local::now().date_naive());
    if args.this_week {
        monday
    } else if args.last_week {
        monday - Duration::days(7)
    } else {
        monday + Duration::days(7)
    }
}

pub async fn create_file(client: &JiraClient, config: &Config, args: SprintFileArgs) -> Result<()> {
    let project_key = config.project_key(args.project_key.as_deref())?;
    let project = requests::project(client, &project_key).await?;

    let start = start_date(&args);
    let end = start + Duration::days(args.length - 1);

    let sprint = SprintFile {
        id: args.sprint_id,
        name: format!("{} {}", project.name, period::iso_period_name(start, end)),
        start_date: start,
        end_date: end,
        comment_prefix: String::new(),
        project: SprintProject {
            key: project_key,
            name: project.name,
        },
    };

    output::print_item(&sprint, |s| {
        output::print_kv(vec![
            ("start date", s.start_date.to_string()),
            ("end date", s.end_date.to_string()),
            ("name", s.name.clone()),
            ("project/key", s.project.key.clone()),
            ("project/name", s.project.name.clone()),
        ]);
    });

    Ok(())
}

pub fn print_file(sprint_file: &Path) -> Result<()> {
    let sprint: SprintFile = data::load_json(sprint_file)?;

    output::print_item(&sprint, |s| {
        output::print_kv(vec![
            ("start date", s.start_date.to_string()),
            ("end date", s.end_date.to_string()),
            ("name", s.name.clone()),
            (
                "id",
                s.id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            ("comment prefix", s.comment_prefix.clone()),
            ("project/key", s.project.key.clone()),
            ("project/name", s.project.name.clone()),
        ]);
    });

    Ok(())
}
