use tabled::Tabled;

use crate::aggregate;
use crate::capacity;
use crate::classify::{Summary, COMMITMENT_BANDS};
use crate::cli::{CommitmentArgs, Selector};
use crate::client::JiraClient;
use crate::config::Config;
use crate::data;
use crate::error::Result;
use crate::output::{self, Importance};
use crate::requests;
use crate::types::{
    CapacityFile, CommitmentFile, CommitmentIssue, CommitmentTotal, Issue, SprintFile, TeamFile,
};

const SOURCE_SPRINT: &str = "sprint";
const SOURCE_COMMENT: &str = "comment";

pub async fn create_file(client: &JiraClient, config: &Config, args: CommitmentArgs) -> Result<()> {
    let sprint: SprintFile = data::load_json(&args.sprint_file)?;
    let sprint_id = sprint.id_required(&args.sprint_file)?;

    let team: TeamFile = data::load_json(&data::data_file_path(config, &sprint, "team"))?;
    let capacity_file: CapacityFile =
        data::load_json(&data::data_file_path(config, &sprint, "capacity"))?;

    let include_unassigned = config.include_unassigned(args.include_unassigned);
    let field = requests::story_points_field(client, config.story_points_field()).await?;

    let by_sprint = team.filter_issues(
        requests::issues_by_sprint(client, sprint_id, &field).await?,
        include_unassigned,
    );
    let by_committed = team.filter_issues(
        requests::issues_by_comment(
            client,
            &sprint.project.key,
            &sprint.comment("Committed"),
            &field,
        )
        .await?,
        include_unassigned,
    );
    let by_extended = team.filter_issues(
        requests::issues_by_comment(
            client,
            &sprint.project.key,
            &sprint.comment("Extended"),
            &field,
        )
        .await?,
        include_unassigned,
    );

    let commitment = build_commitment(
        by_sprint,
        by_committed,
        by_extended,
        args.estimated,
        args.commented,
        args.associated,
    );

    output::print_item(&commitment, |c| {
        if args.summary {
            print_summary(&sprint, &team, &capacity_file, c, include_unassigned);
        } else {
            print_issue_list(c, &team);
        }
    });

    Ok(())
}

/// Union the three issue fetches into the commitment record set.
///
/// The committed total covers the whole union; the list filters only shape
/// what gets printed or written out.
fn build_commitment(
    by_sprint: Vec<Issue>,
    by_committed: Vec<Issue>,
    by_extended: Vec<Issue>,
    estimated: Selector,
    commented: Selector,
    associated: Selector,
) -> CommitmentFile {
    let merged = aggregate::union_keyed(
        vec![
            (SOURCE_SPRINT, by_sprint),
            (SOURCE_COMMENT, by_committed),
            (SOURCE_COMMENT, by_extended),
        ],
        |issue| issue.id,
    );

    let total: i64 = merged.iter().filter_map(|s| s.record.story_points).sum();

    let issues: Vec<CommitmentIssue> = merged
        .into_iter()
        .map(|sourced| CommitmentIssue {
            by_sprint: sourced.has_source(SOURCE_SPRINT),
            by_comment: sourced.has_source(SOURCE_COMMENT),
            issue: sourced.record,
        })
        .filter(|entry| estimated.selects(entry.issue.story_points.is_some()))
        .filter(|entry| commented.selects(entry.by_comment))
        .filter(|entry| associated.selects(entry.by_sprint))
        .collect();

    CommitmentFile {
        total: CommitmentTotal { committed: total },
        issues,
    }
}

fn assignee_name(team: &TeamFile, issue: &Issue) -> String {
    issue
        .assignee_id
        .as_deref()
        .and_then(|account| team.person_by_account(account))
        .map(|person| person.full_name())
        .unwrap_or_default()
}

#[derive(Tabled)]
struct CommitmentRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Story Points")]
    story_points: String,
    #[tabled(rename = "Sprint")]
    sprint: String,
    #[tabled(rename = "Comment")]
    comment: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn print_issue_list(commitment: &CommitmentFile, team: &TeamFile) {
    let rows: Vec<CommitmentRow> = commitment
        .issues
        .iter()
        .map(|entry| CommitmentRow {
            id: entry.issue.id,
            key: entry.issue.key.clone(),
            summary: entry.issue.summary.clone(),
            assignee: assignee_name(team, &entry.issue),
            story_points: entry
                .issue
                .story_points
                .map(|sp| sp.to_string())
                .unwrap_or_default(),
            sprint: if entry.by_sprint { "Sprint" } else { "" }.to_string(),
            comment: if entry.by_comment { "Comment" } else { "" }.to_string(),
            status: entry.issue.status.clone(),
        })
        .collect();

    output::print_rows(rows);
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Full Name")]
    caption: String,
    #[tabled(rename = "Commitment")]
    commitment: String,
    #[tabled(rename = "Capacity")]
    capacity: String,
    #[tabled(rename = "Com/Cap Ratio")]
    ratio: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn summary_row(caption: &str, commitment: i64, capacity: i64, importance: Importance) -> SummaryRow {
    let summary = Summary::compute(commitment, capacity, &COMMITMENT_BANDS);

    SummaryRow {
        caption: output::emphasize(caption, importance),
        commitment: output::emphasize(&commitment.to_string(), importance),
        capacity: output::emphasize(&capacity.to_string(), importance),
        ratio: output::emphasize(&output::format_ratio(summary.ratio), importance),
        status: output::status_arrows(summary.status),
    }
}

fn points_total<'a, I>(issues: I) -> i64
where
    I: Iterator<Item = &'a CommitmentIssue>,
{
    issues.filter_map(|entry| entry.issue.story_points).sum()
}

fn print_summary(
    sprint: &SprintFile,
    team: &TeamFile,
    capacity_file: &CapacityFile,
    commitment: &CommitmentFile,
    include_unassigned: bool,
) {
    let calendar = capacity::team_capacity(sprint, capacity_file);
    let capacities: Vec<capacity::PersonCapacity> = capacity_file
        .people
        .iter()
        .map(|person| capacity::person_capacity(&calendar, person))
        .collect();
    let total_capacity: i64 = capacities.iter().map(|c| c.sprint_capacity).sum();

    let assigned = points_total(
        commitment
            .issues
            .iter()
            .filter(|entry| entry.issue.assignee_id.is_some()),
    );
    let unassigned = points_total(
        commitment
            .issues
            .iter()
            .filter(|entry| entry.issue.assignee_id.is_none()),
    );

    let mut people: Vec<_> = team.people.iter().collect();
    people.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));

    let mut rows = Vec::new();

    for person in people {
        let capacity = capacities
            .iter()
            .find(|c| c.account_id == person.account_id)
            .map(|c| c.sprint_capacity)
            .unwrap_or(0);
        let committed = points_total(commitment.issues.iter().filter(|entry| {
            entry.issue.assignee_id.as_deref() == Some(person.account_id.as_str())
        }));

        let importance = if capacity != 0 || committed != 0 {
            Importance::Normal
        } else {
            Importance::Low
        };
        rows.push(summary_row(
            &person.full_name(),
            committed,
            capacity,
            importance,
        ));
    }

    if include_unassigned {
        let importance = if unassigned != 0 {
            Importance::Normal
        } else {
            Importance::Low
        };
        rows.push(summary_row(
            "Unassigned",
            unassigned,
            total_capacity - assigned,
            importance,
        ));
    }

    rows.push(summary_row(
        "Team Summary",
        assigned + unassigned,
        total_capacity,
        Importance::High,
    ));

    output::print_rows(rows);
}
