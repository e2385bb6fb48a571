//! Markdown report rendering shared by the generate-*-report commands.

use std::fs;
use std::path::Path;

use chrono::{Days, NaiveDate};
use markdown_builder::Markdown;
use markdown_table::{Heading, HeadingAlignment, MarkdownTable};

use crate::capacity::{self, PersonCapacity, TeamCapacity};
use crate::classify::{Summary, DELIVERY_BANDS};
use crate::client::JiraClient;
use crate::error::{CjmError, Result};
use crate::period;
use crate::types::{CapacityFile, CommitmentFile, DeliveryFile, Income, Outcome, SprintFile};

/// Values shared by every report's head table.
pub struct ReportHead {
    pub client_name: String,
    pub author: String,
    pub date: NaiveDate,
    pub period: String,
}

/// Capacity report pagination preferences.
#[derive(Clone, Copy, Default)]
pub struct CapacityBreaks {
    pub absence_section: bool,
    pub weekly_table: bool,
}

trait MarkdownExt {
    fn head_table(&mut self, rows: Vec<(&str, String)>);
    fn bullets(&mut self, items: &[String]);
    fn data_table(&mut self, headings: Vec<Heading>, rows: Vec<Vec<String>>);
    fn rule(&mut self);
}

impl MarkdownExt for Markdown {
    fn head_table(&mut self, rows: Vec<(&str, String)>) {
        let rows = rows
            .into_iter()
            .map(|(caption, value)| vec![format!("**{caption}**"), value])
            .collect();

        let mut table = MarkdownTable::new(rows);
        table.with_headings(vec![
            Heading::new(String::new(), None),
            Heading::new(String::new(), None),
        ]);

        self.paragraph(table.as_markdown().unwrap_or_default());
    }

    fn bullets(&mut self, items: &[String]) {
        let list: Vec<String> = items.iter().map(|item| format!("- {item}")).collect();
        self.paragraph(list.join("\n"));
    }

    fn data_table(&mut self, headings: Vec<Heading>, rows: Vec<Vec<String>>) {
        let mut table = MarkdownTable::new(rows);
        table.with_headings(headings);
        self.paragraph(table.as_markdown().unwrap_or_default());
    }

    fn rule(&mut self) {
        self.paragraph("---".to_string());
    }
}

fn left(text: &str) -> Heading {
    Heading::new(text.to_string(), None)
}

fn right(text: &str) -> Heading {
    Heading::new(text.to_string(), Some(HeadingAlignment::Right))
}

fn doc_title(project_name: &str, report_type: &str, period: &str) -> String {
    format!("{project_name} Sprint {report_type} ({period})")
}

fn sprint_duration(sprint: &SprintFile) -> String {
    format!("{} to {}", sprint.start_date, sprint.end_date)
}

fn issue_link(client: &JiraClient, key: &str) -> String {
    format!("[{}]({})", key, client.browse_url(key))
}

fn common_head_rows<'a>(
    head: &ReportHead,
    sprint: &SprintFile,
    team: &TeamCapacity,
) -> Vec<(&'a str, String)> {
    vec![
        ("Client", head.client_name.clone()),
        ("Project", sprint.project.name.clone()),
        ("Sprint Weeks", head.period.clone()),
        ("Sprint Duration", sprint_duration(sprint)),
        ("Sprint Workdays", team.effective_workdays().to_string()),
    ]
}

fn author_rows<'a>(head: &ReportHead) -> Vec<(&'a str, String)> {
    vec![
        ("Report Author", head.author.clone()),
        ("Report Date", head.date.to_string()),
    ]
}

fn points(value: Option<i64>) -> String {
    value.map(|points| points.to_string()).unwrap_or_default()
}

/// Render the sprint commitment report.
pub fn commitment_markdown(
    client: &JiraClient,
    head: &ReportHead,
    sprint: &SprintFile,
    capacity_file: &CapacityFile,
    commitment: &CommitmentFile,
) -> String {
    let team = capacity::team_capacity(sprint, capacity_file);
    let sprint_capacity: i64 = capacity_file
        .people
        .iter()
        .map(|p| capacity::person_capacity(&team, p).sprint_capacity)
        .sum();

    let mut doc = Markdown::new();
    doc.header1(doc_title(&sprint.project.name, "Commitment", &head.period));

    let mut rows = common_head_rows(head, sprint, &team);
    rows.extend(author_rows(head));
    doc.head_table(rows);

    doc.header2("Summary".to_string());
    doc.bullets(&[
        format!(
            "**The total number of committed story points is {}.**",
            commitment.total.committed
        ),
        format!("The sprint capacity is {sprint_capacity} story points."),
    ]);

    doc.header2("Committed Task List".to_string());
    let mut task_rows: Vec<Vec<String>> = commitment
        .issues
        .iter()
        .map(|issue| {
            vec![
                issue_link(client, &issue.issue.key),
                issue.issue.summary.clone(),
                points(issue.issue.story_points),
            ]
        })
        .collect();
    let total: i64 = commitment
        .issues
        .iter()
        .filter_map(|issue| issue.issue.story_points)
        .sum();
    task_rows.push(vec![
        "**Total:**".to_string(),
        String::new(),
        total.to_string(),
    ]);
    doc.data_table(
        vec![left("Task Id"), left("Task Title"), right("Story Points")],
        task_rows,
    );

    doc.render()
}

/// Render the sprint delivery report.
pub fn delivery_markdown(
    client: &JiraClient,
    head: &ReportHead,
    sprint: &SprintFile,
    capacity_file: &CapacityFile,
    commitment: &CommitmentFile,
    delivery: &DeliveryFile,
) -> String {
    let team = capacity::team_capacity(sprint, capacity_file);
    let summary = Summary::compute(
        delivery.total.delivered,
        delivery.total.committed,
        &DELIVERY_BANDS,
    );

    let ratio_cell = match summary.ratio {
        Some(ratio) => format!(
            "{}/{} (**{ratio}%**)",
            delivery.total.delivered, delivery.total.committed
        ),
        None => format!("{}/{}", delivery.total.delivered, delivery.total.committed),
    };
    let ratio_bullet = match summary.ratio {
        Some(ratio) => format!("**The sprint delivery ratio is {ratio}%.**"),
        None => "**The sprint delivery ratio is undefined (nothing was committed).**".to_string(),
    };

    let mut doc = Markdown::new();
    doc.header1(doc_title(&sprint.project.name, "Delivery", &head.period));

    let mut rows = common_head_rows(head, sprint, &team);
    rows.push(("Delivery Ratio", ratio_cell));
    rows.extend(author_rows(head));
    doc.head_table(rows);

    doc.header2("Summary".to_string());
    doc.bullets(&[
        format!(
            "The total number of story points originally committed was {}.",
            commitment.total.committed
        ),
        format!(
            "**The number of story points taken for delivery ratio calculation was {}** (the \
             result of all the drops and extensions).",
            delivery.total.committed
        ),
        format!(
            "The total number of delivered story points was {}.",
            delivery.total.delivered
        ),
        ratio_bullet,
    ]);

    doc.header2("Task List".to_string());
    let mut task_rows: Vec<Vec<String>> = delivery
        .issues
        .iter()
        .map(|issue| {
            let outcome = match issue.outcome {
                Outcome::Done => "done",
                Outcome::Open => "not done",
                Outcome::Drop => "dropped",
            };
            let income = match issue.income {
                Income::Extend => " (extended)",
                Income::Commit => "",
            };

            vec![
                issue_link(client, &issue.issue.key),
                issue.issue.summary.clone(),
                issue.committed_story_points.to_string(),
                issue.delivered_story_points.to_string(),
                format!("{outcome}{income}"),
            ]
        })
        .collect();
    let committed: i64 = delivery.issues.iter().map(|i| i.committed_story_points).sum();
    let delivered: i64 = delivery.issues.iter().map(|i| i.delivered_story_points).sum();
    task_rows.push(vec![
        "**Total:**".to_string(),
        String::new(),
        committed.to_string(),
        delivered.to_string(),
        String::new(),
    ]);
    doc.data_table(
        vec![
            left("Task Id"),
            left("Task Title"),
            right("Committed"),
            right("Delivered"),
            left("Note"),
        ],
        task_rows,
    );

    doc.render()
}

/// Render the sprint capacity report.
pub fn capacity_markdown(
    head: &ReportHead,
    sprint: &SprintFile,
    capacity_file: &CapacityFile,
    breaks: CapacityBreaks,
) -> String {
    let team = capacity::team_capacity(sprint, capacity_file);

    let mut people: Vec<PersonCapacity> = capacity_file
        .people
        .iter()
        .filter(|p| p.daily_capacity > 0)
        .map(|p| capacity::person_capacity(&team, p))
        .collect();
    people.sort_by(|a, b| {
        (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
    });

    let mut doc = Markdown::new();
    doc.header1(doc_title(&sprint.project.name, "Capacity", &head.period));

    let mut rows = common_head_rows(head, sprint, &team);
    rows.extend(author_rows(head));
    doc.head_table(rows);

    doc.header2("Personal Capacity".to_string());
    let mut capacity_rows: Vec<Vec<String>> = people
        .iter()
        .map(|person| {
            vec![
                person.full_name(),
                sprint.project.name.clone(),
                person.sprint_workday_count.to_string(),
                person.sprint_capacity.to_string(),
            ]
        })
        .collect();
    let total_workdays: i64 = people.iter().map(|p| p.sprint_workday_count).sum();
    let total_capacity: i64 = people.iter().map(|p| p.sprint_capacity).sum();
    capacity_rows.push(vec![
        "**Total:**".to_string(),
        String::new(),
        total_workdays.to_string(),
        total_capacity.to_string(),
    ]);
    doc.data_table(
        vec![
            left("Engineer Name"),
            left("Team"),
            right("Workdays"),
            right("SP Capacity"),
        ],
        capacity_rows,
    );

    if breaks.absence_section {
        doc.rule();
    }
    doc.header2("Weekly Absence View".to_string());

    let week_count = ((sprint.end_date - sprint.start_date).num_days() + 1) / 7;
    for week in 0..week_count {
        if week > 0 && breaks.weekly_table {
            doc.rule();
        }

        let week_date = sprint.start_date + Days::new(7 * week as u64);
        weekly_table(&mut doc, week_date, &people);
    }

    doc.render()
}

/// One Monday-to-Friday absence table.
fn weekly_table(doc: &mut Markdown, week_date: NaiveDate, people: &[PersonCapacity]) {
    let monday = period::week_monday(week_date);
    let days: Vec<NaiveDate> = (0..5).map(|offset| monday + Days::new(offset)).collect();

    let mut headings = vec![left("Engineer Name")];
    headings.extend(days.iter().map(|day| left(&day.format("%b %d").to_string())));

    let rows: Vec<Vec<String>> = people
        .iter()
        .map(|person| {
            let mut row = vec![person.full_name()];
            row.extend(days.iter().map(|day| {
                if person.holidays.contains(day) {
                    "X".to_string()
                } else {
                    String::new()
                }
            }));
            row
        })
        .collect();

    doc.data_table(headings, rows);
}

/// Write the rendered report document.
pub fn save(path: &Path, markdown: &str) -> Result<()> {
    fs::write(path, markdown).map_err(|source| CjmError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CapacityPerson, CommitmentIssue, CommitmentTotal, DeliveryIssue, DeliveryTotal, Issue,
        SprintProject,
    };
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_client() -> JiraClient {
        JiraClient::with_credentials(
            "https",
            "jira.example.com",
            "user@example.com",
            "token".to_string(),
        )
        .unwrap()
    }

    fn head() -> ReportHead {
        ReportHead {
            client_name: "Acme".to_string(),
            author: "John Smith".to_string(),
            date: date(2021, 1, 20),
            period: "WW02-WW03".to_string(),
        }
    }

    fn sprint() -> SprintFile {
        SprintFile {
            id: Some(7),
            name: "Apollo WW02-WW03".to_string(),
            start_date: date(2021, 1, 11),
            end_date: date(2021, 1, 24),
            comment_prefix: "Apollo WW02-WW03".to_string(),
            project: SprintProject {
                key: "AP".to_string(),
                name: "Apollo".to_string(),
            },
        }
    }

    fn capacity_file() -> CapacityFile {
        CapacityFile {
            people: vec![
                CapacityPerson {
                    code: "JS".to_string(),
                    last_name: "Smith".to_string(),
                    first_name: "John".to_string(),
                    user_name: String::new(),
                    account_id: "acc-1".to_string(),
                    daily_capacity: 1,
                    personal_holidays: vec![date(2021, 1, 13)],
                },
                CapacityPerson {
                    code: "BD".to_string(),
                    last_name: "Doe".to_string(),
                    first_name: "Brian".to_string(),
                    user_name: String::new(),
                    account_id: "acc-2".to_string(),
                    daily_capacity: 0,
                    personal_holidays: vec![],
                },
            ],
            national_holidays: vec![date(2021, 1, 18)],
            additional_holidays: vec![],
        }
    }

    fn issue(id: i64, key: &str, summary: &str, points: Option<i64>) -> Issue {
        Issue {
            id,
            key: key.to_string(),
            summary: summary.to_string(),
            assignee_id: Some("acc-1".to_string()),
            story_points: points,
            status: "Done".to_string(),
            resolution_date: None,
        }
    }

    fn commitment_file() -> CommitmentFile {
        CommitmentFile {
            total: CommitmentTotal { committed: 15 },
            issues: vec![
                CommitmentIssue {
                    issue: issue(1, "AP-1", "Fix the flux capacitor", Some(5)),
                    by_sprint: true,
                    by_comment: false,
                },
                CommitmentIssue {
                    issue: issue(2, "AP-2", "Recalibrate sensors", Some(8)),
                    by_sprint: true,
                    by_comment: true,
                },
            ],
        }
    }

    #[test]
    fn commitment_report_lays_out_title_head_and_tasks() {
        let markdown = commitment_markdown(
            &test_client(),
            &head(),
            &sprint(),
            &capacity_file(),
            &commitment_file(),
        );

        assert!(markdown.contains("# Apollo Sprint Commitment (WW02-WW03)"));
        assert!(markdown.contains("**Client**"));
        assert!(markdown.contains("Acme"));
        assert!(markdown.contains("2021-01-11 to 2021-01-24"));
        // 10 workdays minus one national holiday
        assert!(markdown.contains("9"));
        assert!(markdown.contains(
            "**The total number of committed story points is 15.**"
        ));
        // John: (10 - 1 - 1) * 1; Brian: 0
        assert!(markdown.contains("The sprint capacity is 8 story points."));
        assert!(markdown.contains("## Committed Task List"));
        assert!(markdown.contains("[AP-1](https://jira.example.com/browse/AP-1)"));
        assert!(markdown.contains("Fix the flux capacitor"));
        assert!(markdown.contains("**Total:**"));
    }

    #[test]
    fn delivery_report_shows_the_ratio_and_notes() {
        let delivery = DeliveryFile {
            total: DeliveryTotal {
                committed: 15,
                delivered: 12,
            },
            ratio: Some(dec!(0.8000)),
            issues: vec![
                DeliveryIssue {
                    issue: issue(1, "AP-1", "Fix the flux capacitor", Some(5)),
                    dropped: false,
                    extended: false,
                    committed_story_points: 5,
                    delivered_story_points: 5,
                    delivered: true,
                    outcome: Outcome::Done,
                    income: Income::Commit,
                },
                DeliveryIssue {
                    issue: issue(2, "AP-2", "Recalibrate sensors", Some(8)),
                    dropped: false,
                    extended: true,
                    committed_story_points: 10,
                    delivered_story_points: 7,
                    delivered: false,
                    outcome: Outcome::Open,
                    income: Income::Extend,
                },
            ],
        };

        let markdown = delivery_markdown(
            &test_client(),
            &head(),
            &sprint(),
            &capacity_file(),
            &commitment_file(),
            &delivery,
        );

        assert!(markdown.contains("# Apollo Sprint Delivery (WW02-WW03)"));
        assert!(markdown.contains("12/15 (**80.00%**)"));
        assert!(markdown.contains(
            "The total number of story points originally committed was 15."
        ));
        assert!(markdown.contains("**The sprint delivery ratio is 80.00%.**"));
        assert!(markdown.contains("not done (extended)"));
        assert!(markdown.contains("## Task List"));
    }

    #[test]
    fn delivery_report_handles_an_undefined_ratio() {
        let delivery = DeliveryFile {
            total: DeliveryTotal {
                committed: 0,
                delivered: 0,
            },
            ratio: None,
            issues: vec![],
        };

        let markdown = delivery_markdown(
            &test_client(),
            &head(),
            &sprint(),
            &capacity_file(),
            &commitment_file(),
            &delivery,
        );

        assert!(markdown.contains("undefined"));
        assert!(!markdown.contains("%**)"));
    }

    #[test]
    fn capacity_report_marks_absence_days() {
        let markdown = capacity_markdown(
            &head(),
            &sprint(),
            &capacity_file(),
            CapacityBreaks {
                absence_section: true,
                weekly_table: true,
            },
        );

        assert!(markdown.contains("# Apollo Sprint Capacity (WW02-WW03)"));
        assert!(markdown.contains("## Personal Capacity"));
        // zero daily capacity people are left out
        assert!(!markdown.contains("Doe, Brian"));
        assert!(markdown.contains("Smith, John"));
        assert!(markdown.contains("## Weekly Absence View"));
        assert!(markdown.contains("Jan 11"));
        assert!(markdown.contains("Jan 18"));
        assert!(markdown.contains("X"));
        assert!(markdown.contains("---"));
    }

    #[test]
    fn report_files_are_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commitment_report.md");

        save(&path, "# Report\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# Report\n");
    }
}
