use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use tabled::Tabled;

use crate::aggregate;
use crate::classify::{Summary, DELIVERY_BANDS};
use crate::cli::DeliveryArgs;
use crate::client::JiraClient;
use crate::config::Config;
use crate::data;
use crate::error::Result;
use crate::output::{self, Importance};
use crate::requests;
use crate::types::{
    CommitmentFile, DeliveryFile, DeliveryIssue, DeliveryTotal, Income, Issue, Outcome, SprintFile,
    TeamFile,
};

pub async fn create_file(client: &JiraClient, config: &Config, args: DeliveryArgs) -> Result<()> {
    let sprint: SprintFile = data::load_json(&args.sprint_file)?;
    let team: TeamFile = data::load_json(&args.team_file)?;
    let commitment: CommitmentFile = data::load_json(&args.commitment_file)?;

    let field = requests::story_points_field(client, config.story_points_field()).await?;

    let committed_keys: Vec<String> = commitment
        .issues
        .iter()
        .map(|entry| entry.issue.key.clone())
        .collect();
    let fetched = requests::issues_by_keys(client, &committed_keys, &field).await?;
    let received: Vec<String> = fetched.iter().map(|issue| issue.key.clone()).collect();
    let missing = aggregate::missing_keys(&committed_keys, &received);
    if !missing.is_empty() {
        output::warn(&format!(
            "Following issues were requested but not included in the response ({})",
            missing.join(", ")
        ));
    }
    let committed: Vec<DeliveryIssue> = fetched.into_iter().map(committed_issue).collect();

    let pattern = extension_comment_pattern(&sprint.comment_prefix)?;
    let mut extended = Vec::new();
    let extension_fetch = team.filter_issues(
        requests::issues_by_comment(
            client,
            &sprint.project.key,
            &sprint.comment("Extended"),
            &field,
        )
        .await?,
        true,
    );
    for issue in extension_fetch {
        let issue = with_coerced_points(issue);
        let texts = requests::matching_comment_texts(client, &issue.key, &pattern).await?;
        let points = extension_committed_points(
            &issue.key,
            issue.story_points.unwrap_or(0),
            &texts,
            &pattern,
            &sprint.comment_prefix,
        );
        extended.push(extended_issue(issue, points));
    }

    let mut issues = join_issue_lists(committed, extended);

    let dropped = requests::issues_by_comment(
        client,
        &sprint.project.key,
        &sprint.comment("Dropped"),
        &field,
    )
    .await?;
    mark_dropped(&mut issues, &dropped);

    let delivered_ids: HashSet<i64> = if args.consider_delivery_comment {
        requests::issues_by_comment(
            client,
            &sprint.project.key,
            &sprint.comment("Delivered"),
            &field,
        )
        .await?
        .into_iter()
        .map(|issue| issue.id)
        .collect()
    } else {
        HashSet::new()
    };

    let allow_late = config.allow_late_delivery(args.allow_late_delivery);
    let delivery = resolve_delivery(issues, &delivered_ids, sprint.end_date, allow_late);

    output::print_item(&delivery, |file| {
        if args.summary {
            print_summary(file, &team);
        } else {
            print_issue_list(file, &team);
        }
    });

    Ok(())
}

fn with_coerced_points(mut issue: Issue) -> Issue {
    issue.story_points = Some(issue.story_points.unwrap_or(0));
    issue
}

fn committed_issue(issue: Issue) -> DeliveryIssue {
    let issue = with_coerced_points(issue);
    DeliveryIssue {
        committed_story_points: issue.story_points.unwrap_or(0),
        issue,
        dropped: false,
        extended: false,
        delivered_story_points: 0,
        delivered: false,
        outcome: Outcome::Open,
        income: Income::Commit,
    }
}

/// The issue must already carry coerced story points; `committed_points`
/// comes from the extension comment.
fn extended_issue(issue: Issue, committed_points: i64) -> DeliveryIssue {
    DeliveryIssue {
        committed_story_points: committed_points,
        issue,
        dropped: false,
        extended: true,
        delivered_story_points: 0,
        delivered: false,
        outcome: Outcome::Open,
        income: Income::Extend,
    }
}

fn extension_comment_pattern(prefix: &str) -> Result<Regex> {
    let pattern = format!(
        r"^{}/Extended \((?P<committed>[0-9]+)/(?P<deliverable>[0-9]+)\)",
        regex::escape(prefix)
    );
    Ok(Regex::new(&pattern)?)
}

/// Committed story points claimed by the issue's extension comment,
/// reconciled against the story points field.
fn extension_committed_points(
    key: &str,
    story_points: i64,
    texts: &[String],
    pattern: &Regex,
    prefix: &str,
) -> i64 {
    let Some(first) = texts.first() else {
        return 0;
    };
    if texts.len() > 1 {
        output::warn(&format!(
            "Issue '{key}' has more than one sprint extension comment. \
             Only the first meaningful one will be used. \
             Delete all erroneous comments for the sprint '{prefix}'"
        ));
    }
    let Some(captures) = pattern.captures(first) else {
        return 0;
    };
    let committed: i64 = captures["committed"].parse().unwrap_or(0);
    let deliverable: i64 = captures["deliverable"].parse().unwrap_or(0);

    if deliverable != story_points {
        output::warn(&format!(
            "Regarding issue {key}: Story point value inconsistency between the story points \
             field ({story_points}) and the sprint extension comment ({committed}/{deliverable}). \
             The value taken from the story points field will be used for reporting purposes \
             and the committed value will be assumed to be 0"
        ));
        return 0;
    }
    if committed > deliverable {
        output::warn(&format!(
            "Regarding issue {key}: According to the sprint extension comment, the number of \
             committed story points ({committed}) is greater than the number of deliverable \
             story points ({deliverable}). The deliverable number of story points will be used \
             in both cases"
        ));
        return deliverable;
    }
    committed
}

/// Merge commitment and extension entries, keyed by issue key. An issue
/// already present in the commitment file keeps its commitment entry.
fn join_issue_lists(
    committed: Vec<DeliveryIssue>,
    extended: Vec<DeliveryIssue>,
) -> Vec<DeliveryIssue> {
    let committed_keys: HashSet<String> = committed
        .iter()
        .map(|entry| entry.issue.key.clone())
        .collect();

    let mut issues = committed;
    for entry in extended {
        if committed_keys.contains(&entry.issue.key) {
            output::warn(&format!(
                "Issue '{}' was found in the commitment data file and at the same time it was \
                 found out to be marked with sprint extension comment. The comment will be ignored",
                entry.issue.key
            ));
        } else {
            issues.push(entry);
        }
    }
    issues.sort_by_key(|entry| entry.issue.id);
    issues
}

fn mark_dropped(issues: &mut [DeliveryIssue], dropped: &[Issue]) {
    for issue in dropped {
        match issues.iter_mut().find(|entry| entry.issue.id == issue.id) {
            Some(entry) => entry.dropped = true,
            None => output::warn(&format!(
                "Issue {} has dropped comment for this sprint, but it doesn't appear to be in \
                 committed or extended issues",
                issue.key
            )),
        }
    }
}

fn resolve_delivery(
    mut issues: Vec<DeliveryIssue>,
    delivered_ids: &HashSet<i64>,
    sprint_end: NaiveDate,
    allow_late: bool,
) -> DeliveryFile {
    let mut total_delivered = 0;

    for entry in &mut issues {
        let done = delivered_ids.contains(&entry.issue.id)
            || (entry.issue.status == "Done"
                && (allow_late
                    || entry
                        .issue
                        .resolution_day()
                        .is_some_and(|day| day <= sprint_end)));
        if done {
            // a dropped issue that still got done keeps its points here
            total_delivered += entry.issue.story_points.unwrap_or(0);
        }

        if entry.dropped {
            entry.committed_story_points = 0;
            entry.outcome = Outcome::Drop;
        } else if done {
            entry.delivered_story_points = entry.issue.story_points.unwrap_or(0);
            entry.delivered = true;
            entry.outcome = Outcome::Done;
        }
    }

    let total_committed: i64 = issues.iter().map(|e| e.committed_story_points).sum();
    let ratio = (total_committed > 0).then(|| {
        let mut ratio = (Decimal::from(total_delivered) / Decimal::from(total_committed))
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
        ratio.rescale(4);
        ratio
    });

    DeliveryFile {
        total: DeliveryTotal {
            committed: total_committed,
            delivered: total_delivered,
        },
        ratio,
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
struct DeliveryRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Committed")]
    committed: i64,
    #[tabled(rename = "Delivered")]
    delivered_points: i64,
    #[tabled(rename = "Current Status")]
    status: String,
    #[tabled(rename = "Income")]
    income: &'static str,
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Extended")]
    extended: bool,
    #[tabled(rename = "Delivered")]
    delivered: bool,
    #[tabled(rename = "Dropped")]
    dropped: bool,
}

fn print_issue_list(delivery: &DeliveryFile, team: &TeamFile) {
    let rows: Vec<DeliveryRow> = delivery
        .issues
        .iter()
        .map(|entry| DeliveryRow {
            id: entry.issue.id,
            key: entry.issue.key.clone(),
            summary: entry.issue.summary.clone(),
            assignee: assignee_name(team, &entry.issue),
            committed: entry.committed_story_points,
            delivered_points: entry.delivered_story_points,
            status: entry.issue.status.clone(),
            income: entry.income.as_str(),
            outcome: entry.outcome.as_str(),
            extended: entry.extended,
            delivered: entry.delivered,
            dropped: entry.dropped,
        })
        .collect();

    output::print_rows(rows);
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Full Name")]
    caption: String,
    #[tabled(rename = "Delivered")]
    delivered: String,
    #[tabled(rename = "Committed")]
    committed: String,
    #[tabled(rename = "Del/Com Ratio")]
    ratio: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn summary_row(caption: &str, delivered: i64, committed: i64, importance: Importance) -> SummaryRow {
    let summary = Summary::compute(delivered, committed, &DELIVERY_BANDS);

    SummaryRow {
        caption: output::emphasize(caption, importance),
        delivered: output::emphasize(&delivered.to_string(), importance),
        committed: output::emphasize(&committed.to_string(), importance),
        ratio: output::emphasize(&output::format_ratio(summary.ratio), importance),
        status: output::status_arrows(summary.status),
    }
}

/// Delivered and committed story point totals for one assignee account,
/// `None` selecting the unassigned issues.
fn person_points(delivery: &DeliveryFile, account: Option<&str>) -> (i64, i64) {
    delivery
        .issues
        .iter()
        .filter(|entry| entry.issue.assignee_id.as_deref() == account)
        .fold((0, 0), |(delivered, committed), entry| {
            (
                delivered + entry.delivered_story_points,
                committed + entry.committed_story_points,
            )
        })
}

fn print_summary(delivery: &DeliveryFile, team: &TeamFile) {
    let mut people: Vec<_> = team.people.iter().collect();
    people.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));

    let mut rows = Vec::new();
    let mut delivered_sum = 0;
    let mut committed_sum = 0;

    for person in people {
        let (delivered, committed) = person_points(delivery, Some(person.account_id.as_str()));
        delivered_sum += delivered;
        committed_sum += committed;

        let importance = if delivered != 0 || committed != 0 {
            Importance::Normal
        } else {
            Importance::Low
        };
        rows.push(summary_row(
            &person.full_name(),
            delivered,
            committed,
            importance,
        ));
    }

    let (unassigned_delivered, unassigned_committed) = person_points(delivery, None);
    if unassigned_delivered != 0 || unassigned_committed != 0 {
        delivered_sum += unassigned_delivered;
        committed_sum += unassigned_committed;
        rows.push(summary_row(
            "Unassigned",
            unassigned_delivered,
            unassigned_committed,
            Importance::Normal,
        ));
    }

    rows.push(summary_row(
        "Team Summary",
        delivered_sum,
        committed_sum,
        Importance::High,
    ));

    output::print_rows(rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: i64, points: Option<i64>, status: &str, resolved: Option<&str>) -> Issue {
        Issue {
            id,
            key: format!("AP-{id}"),
            summary: format!("Issue {id}"),
            assignee_id: Some("acc-1".to_string()),
            story_points: points,
            status: status.to_string(),
            resolution_date: resolved.map(String::from),
        }
    }

    fn sprint_end() -> NaiveDate {
        "2021-01-17".parse().unwrap()
    }

    #[test]
    fn extension_pattern_is_anchored_and_captures_both_numbers() {
        let pattern = extension_comment_pattern("AP 2021-02").unwrap();

        let captures = pattern.captures("AP 2021-02/Extended (3/5)").unwrap();
        assert_eq!(&captures["committed"], "3");
        assert_eq!(&captures["deliverable"], "5");

        assert!(pattern.captures("see AP 2021-02/Extended (3/5)").is_none());
        assert!(pattern.captures("AP 2021-03/Extended (3/5)").is_none());
    }

    #[test]
    fn extension_points_follow_a_consistent_comment() {
        let pattern = extension_comment_pattern("AP").unwrap();
        let texts = vec!["AP/Extended (3/5)".to_string()];

        assert_eq!(
            extension_committed_points("AP-1", 5, &texts, &pattern, "AP"),
            3
        );
    }

    #[test]
    fn inconsistent_extension_comment_zeroes_the_committed_points() {
        let pattern = extension_comment_pattern("AP").unwrap();
        let texts = vec!["AP/Extended (3/5)".to_string()];

        assert_eq!(
            extension_committed_points("AP-1", 8, &texts, &pattern, "AP"),
            0
        );
    }

    #[test]
    fn committed_points_above_deliverable_are_capped() {
        let pattern = extension_comment_pattern("AP").unwrap();
        let texts = vec!["AP/Extended (7/5)".to_string()];

        assert_eq!(
            extension_committed_points("AP-1", 5, &texts, &pattern, "AP"),
            5
        );
    }

    #[test]
    fn missing_extension_comment_means_nothing_committed() {
        let pattern = extension_comment_pattern("AP").unwrap();

        assert_eq!(extension_committed_points("AP-1", 5, &[], &pattern, "AP"), 0);
    }

    #[test]
    fn first_extension_comment_wins_when_several_match() {
        let pattern = extension_comment_pattern("AP").unwrap();
        let texts = vec![
            "AP/Extended (2/5)".to_string(),
            "AP/Extended (4/5)".to_string(),
        ];

        assert_eq!(
            extension_committed_points("AP-1", 5, &texts, &pattern, "AP"),
            2
        );
    }

    #[test]
    fn constructors_coerce_missing_story_points_to_zero() {
        let entry = committed_issue(issue(1, None, "To Do", None));

        assert_eq!(entry.issue.story_points, Some(0));
        assert_eq!(entry.committed_story_points, 0);
    }

    #[test]
    fn commitment_entries_win_the_join() {
        let committed = vec![committed_issue(issue(2, Some(5), "To Do", None))];
        let extended = vec![
            extended_issue(with_coerced_points(issue(2, Some(5), "To Do", None)), 3),
            extended_issue(with_coerced_points(issue(1, Some(2), "To Do", None)), 1),
        ];

        let joined = join_issue_lists(committed, extended);

        let ids: Vec<i64> = joined.iter().map(|entry| entry.issue.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(!joined[1].extended);
        assert_eq!(joined[1].committed_story_points, 5);
    }

    #[test]
    fn unknown_dropped_issues_leave_the_list_untouched() {
        let mut issues = vec![committed_issue(issue(1, Some(5), "To Do", None))];

        mark_dropped(&mut issues, &[issue(9, None, "To Do", None)]);

        assert!(!issues[0].dropped);
    }

    #[test]
    fn resolution_within_the_sprint_counts_as_delivered() {
        let issues = vec![committed_issue(issue(
            1,
            Some(5),
            "Done",
            Some("2021-01-15T10:24:00.000+0100"),
        ))];

        let delivery = resolve_delivery(issues, &HashSet::new(), sprint_end(), false);

        assert_eq!(delivery.total.committed, 5);
        assert_eq!(delivery.total.delivered, 5);
        assert!(delivery.issues[0].delivered);
        assert!(matches!(delivery.issues[0].outcome, Outcome::Done));
        assert_eq!(
            delivery.ratio.map(|r| r.to_string()),
            Some("1.0000".to_string())
        );
    }

    #[test]
    fn late_resolution_counts_only_when_allowed() {
        let make = || {
            vec![committed_issue(issue(
                1,
                Some(5),
                "Done",
                Some("2021-01-20T10:24:00.000+0100"),
            ))]
        };

        let strict = resolve_delivery(make(), &HashSet::new(), sprint_end(), false);
        assert_eq!(strict.total.delivered, 0);
        assert!(matches!(strict.issues[0].outcome, Outcome::Open));

        let lenient = resolve_delivery(make(), &HashSet::new(), sprint_end(), true);
        assert_eq!(lenient.total.delivered, 5);
        assert!(lenient.issues[0].delivered);
    }

    #[test]
    fn delivery_comment_marks_an_unresolved_issue_done() {
        let issues = vec![committed_issue(issue(1, Some(3), "In Progress", None))];
        let delivered_ids: HashSet<i64> = [1].into_iter().collect();

        let delivery = resolve_delivery(issues, &delivered_ids, sprint_end(), false);

        assert_eq!(delivery.total.delivered, 3);
        assert!(delivery.issues[0].delivered);
    }

    #[test]
    fn dropped_issues_leave_the_commitment_but_keep_earned_points() {
        let mut issues = vec![
            committed_issue(issue(
                1,
                Some(5),
                "Done",
                Some("2021-01-15T10:24:00.000+0100"),
            )),
            committed_issue(issue(2, Some(3), "To Do", None)),
        ];
        mark_dropped(&mut issues, &[issue(1, Some(5), "Done", None)]);

        let delivery = resolve_delivery(issues, &HashSet::new(), sprint_end(), false);

        assert!(matches!(delivery.issues[0].outcome, Outcome::Drop));
        assert_eq!(delivery.issues[0].committed_story_points, 0);
        assert_eq!(delivery.issues[0].delivered_story_points, 0);
        assert_eq!(delivery.total.committed, 3);
        assert_eq!(delivery.total.delivered, 5);
    }

    #[test]
    fn ratio_is_absent_without_commitment_and_padded_otherwise() {
        let nothing = resolve_delivery(vec![], &HashSet::new(), sprint_end(), false);
        assert!(nothing.ratio.is_none());

        let issues = vec![
            committed_issue(issue(
                1,
                Some(4),
                "Done",
                Some("2021-01-15T10:24:00.000+0100"),
            )),
            committed_issue(issue(2, Some(1), "To Do", None)),
        ];
        let partial = resolve_delivery(issues, &HashSet::new(), sprint_end(), false);

        assert_eq!(
            partial.ratio.map(|r| r.to_string()),
            Some("0.8000".to_string())
        );
    }
}
