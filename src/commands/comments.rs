use std::collections::HashSet;

use tabled::Tabled;

use crate::cli::{PushCommitmentArgs, PushDeliveryArgs};
use crate::client::JiraClient;
use crate::config::Config;
use crate::data;
use crate::error::Result;
use crate::output;
use crate::requests;
use crate::types::{CommitmentFile, DeliveryFile, Issue, Outcome, SprintFile};

pub async fn push_commitment(
    client: &JiraClient,
    config: &Config,
    args: PushCommitmentArgs,
) -> Result<()> {
    let sprint: SprintFile = data::load_json(&args.sprint_file)?;
    sprint.id_required(&args.sprint_file)?;
    let commitment: CommitmentFile = data::load_json(&args.commitment_file)?;

    let field = requests::story_points_field(client, config.story_points_field()).await?;
    let comment = sprint.comment("Committed");

    let marked_ids: HashSet<i64> =
        requests::issues_by_comment(client, &sprint.project.key, &comment, &field)
            .await?
            .into_iter()
            .map(|issue| issue.id)
            .collect();

    let missing: Vec<(&Issue, String)> = commitment
        .issues
        .iter()
        .filter(|entry| !marked_ids.contains(&entry.issue.id))
        .map(|entry| (&entry.issue, comment.clone()))
        .collect();

    push_or_preview(client, missing, args.preview).await
}

pub async fn push_delivery(
    client: &JiraClient,
    config: &Config,
    args: PushDeliveryArgs,
) -> Result<()> {
    let sprint: SprintFile = data::load_json(&args.sprint_file)?;
    sprint.id_required(&args.sprint_file)?;
    let delivery: DeliveryFile = data::load_json(&args.delivery_file)?;

    let field = requests::story_points_field(client, config.story_points_field()).await?;

    let mut opening_keys = HashSet::new();
    for postfix in ["Committed", "Extended"] {
        let marked = requests::issues_by_comment(
            client,
            &sprint.project.key,
            &sprint.comment(postfix),
            &field,
        )
        .await?;
        opening_keys.extend(marked.into_iter().map(|issue| issue.key));
    }

    let strays: Vec<&Issue> = delivery
        .issues
        .iter()
        .map(|entry| &entry.issue)
        .filter(|issue| !opening_keys.contains(&issue.key))
        .collect();
    if !strays.is_empty() {
        output::warn(
            "Following issues are in the delivery data file but carry no commitment or \
             extension comment for this sprint",
        );
        let rows: Vec<StrayRow> = strays
            .iter()
            .map(|issue| StrayRow {
                id: issue.id,
                key: issue.key.clone(),
                summary: issue.summary.clone(),
            })
            .collect();
        output::print_rows(rows);
    }

    let mut closed_ids = HashSet::new();
    for postfix in ["Delivered", "NotDelivered", "Dropped"] {
        let marked = requests::issues_by_comment(
            client,
            &sprint.project.key,
            &sprint.comment(postfix),
            &field,
        )
        .await?;
        closed_ids.extend(marked.into_iter().map(|issue| issue.id));
    }

    let missing: Vec<(&Issue, String)> = delivery
        .issues
        .iter()
        .filter(|entry| !closed_ids.contains(&entry.issue.id))
        .map(|entry| (&entry.issue, sprint.comment(closing_postfix(entry.outcome))))
        .collect();

    push_or_preview(client, missing, args.preview).await
}

fn closing_postfix(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Done => "Delivered",
        Outcome::Drop => "Dropped",
        Outcome::Open => "NotDelivered",
    }
}

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Comment to be added")]
    comment: String,
}

#[derive(Tabled)]
struct StrayRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

async fn push_or_preview(
    client: &JiraClient,
    missing: Vec<(&Issue, String)>,
    preview: bool,
) -> Result<()> {
    if preview {
        let rows: Vec<PreviewRow> = missing
            .into_iter()
            .map(|(issue, comment)| PreviewRow {
                id: issue.id,
                key: issue.key.clone(),
                summary: issue.summary.clone(),
                comment,
            })
            .collect();
        output::print_rows(rows);
        return Ok(());
    }

    for (issue, comment) in missing {
        tracing::debug!("posting '{}' to issue {}", comment, issue.key);
        requests::add_comment(client, &issue.id.to_string(), &comment).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_comment_follows_the_outcome() {
        assert_eq!(closing_postfix(Outcome::Done), "Delivered");
        assert_eq!(closing_postfix(Outcome::Drop), "Dropped");
        assert_eq!(closing_postfix(Outcome::Open), "NotDelivered");
    }
}
