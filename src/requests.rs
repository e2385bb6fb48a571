//! Jira API operations shared by the commands.

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::JiraClient;
use crate::error::{CjmError, Result};
use crate::types::{Board, Issue, IssueBrief, JiraUser, Project, Sprint};

/// Single project looked up by key.
pub async fn project(client: &JiraClient, key: &str) -> Result<Project> {
    client.get(client.api_url(&format!("project/{key}"))?).await
}

/// All boards visible to the user.
pub async fn boards(client: &JiraClient) -> Result<Vec<Board>> {
    client.get_all_pages(client.agile_url("board")?, &[]).await
}

/// All projects visible to the user.
pub async fn projects(client: &JiraClient) -> Result<Vec<Project>> {
    client
        .get_all_pages(client.api_url("project/search")?, &[])
        .await
}

/// All sprints defined on the given board, including closed ones.
pub async fn sprints(client: &JiraClient, board_id: i64) -> Result<Vec<Sprint>> {
    client
        .get_all_pages(client.agile_url(&format!("board/{board_id}/sprint"))?, &[])
        .await
}

/// Issues associated with the sprint, reduced to their listing fields.
pub async fn sprint_issue_briefs(client: &JiraClient, sprint_id: i64) -> Result<Vec<IssueBrief>> {
    let raw = sprint_issues_raw(client, sprint_id).await?;
    raw.into_iter().map(extract_brief).collect()
}

/// Issues associated with the sprint, with full commitment tracking fields.
pub async fn issues_by_sprint(
    client: &JiraClient,
    sprint_id: i64,
    story_points_field: &str,
) -> Result<Vec<Issue>> {
    let raw = sprint_issues_raw(client, sprint_id).await?;
    raw.into_iter()
        .map(|issue| Issue::extract(issue, story_points_field))
        .collect()
}

/// Issues of the project carrying the given comment text.
pub async fn issues_by_comment(
    client: &JiraClient,
    project_key: &str,
    comment: &str,
    story_points_field: &str,
) -> Result<Vec<Issue>> {
    let jql = format!("project = \"{project_key}\" AND comment ~ \"{comment}\"");
    search_issues(client, &jql, story_points_field).await
}

/// Issues identified by one of the given keys. An empty key list resolves
/// to an empty result without touching the server.
pub async fn issues_by_keys(
    client: &JiraClient,
    issue_keys: &[String],
    story_points_field: &str,
) -> Result<Vec<Issue>> {
    if issue_keys.is_empty() {
        return Ok(Vec::new());
    }

    let jql = format!("key in ({})", issue_keys.join(", "));
    search_issues(client, &jql, story_points_field).await
}

/// Text runs of the issue's comments matching the given pattern.
///
/// Comment bodies arrive as Atlassian document trees; only the text runs
/// of top-level paragraphs are scanned.
pub async fn matching_comment_texts(
    client: &JiraClient,
    issue_key: &str,
    pattern: &Regex,
) -> Result<Vec<String>> {
    let url = client.api_url(&format!("issue/{issue_key}/comment"))?;
    let comments: Vec<Value> = client.get_all_pages(url, &[]).await?;

    let mut matched = Vec::new();

    for comment in &comments {
        let Some(blocks) = comment["body"]["content"].as_array() else {
            continue;
        };
        for block in blocks {
            if block["type"] != "paragraph" {
                continue;
            }
            let Some(runs) = block["content"].as_array() else {
                continue;
            };
            for run in runs {
                if run["type"] != "text" {
                    continue;
                }
                if let Some(text) = run["text"].as_str() {
                    if pattern.is_match(text) {
                        matched.push(text.to_string());
                    }
                }
            }
        }
    }

    Ok(matched)
}

/// Add a plain text comment to the issue.
pub async fn add_comment(client: &JiraClient, issue_key: &str, text: &str) -> Result<()> {
    let url = client.api_url(&format!("issue/{issue_key}/comment"))?;
    client.post(url, &comment_body(text)).await
}

/// Atlassian document tree wrapping a single paragraph of plain text.
fn comment_body(text: &str) -> Value {
    json!({
        "body": {
            "type": "doc",
            "version": 1,
            "content": [
                {
                    "type": "paragraph",
                    "content": [
                        {
                            "text": text,
                            "type": "text"
                        }
                    ]
                }
            ]
        }
    })
}

/// Identifier of the story point issue field, taken from the configuration
/// or detected by listing the server's field definitions.
pub async fn story_points_field(client: &JiraClient, configured: Option<&str>) -> Result<String> {
    if let Some(id) = configured {
        return Ok(id.to_string());
    }

    #[derive(Deserialize)]
    struct Field {
        id: String,
        name: String,
    }

    let fields: Vec<Field> = client.get(client.api_url("field")?).await?;

    fields
        .into_iter()
        .find(|field| field.name == "Story Points")
        .map(|field| field.id)
        .ok_or_else(|| CjmError::UnknownField("Story Points".to_string()))
}

/// All user accounts registered on the server.
pub async fn users(client: &JiraClient) -> Result<Vec<JiraUser>> {
    client.get(client.api_url("users")?).await
}

/// Display name of the given user, falling back to the plain user name
/// when the account lookup finds nothing.
pub async fn user_full_name(client: &JiraClient, user: &str) -> Result<String> {
    let mut url = client.api_url("user/search")?;
    url.query_pairs_mut().append_pair("query", user);

    let found: Option<Vec<JiraUser>> = client.get_optional(url).await?;

    Ok(found
        .and_then(|accounts| accounts.into_iter().next())
        .map(|account| account.display_name)
        .unwrap_or_else(|| user.to_string()))
}

async fn sprint_issues_raw(client: &JiraClient, sprint_id: i64) -> Result<Vec<Value>> {
    client
        .get_all_pages(client.agile_url(&format!("sprint/{sprint_id}/issue"))?, &[])
        .await
}

async fn search_issues(
    client: &JiraClient,
    jql: &str,
    story_points_field: &str,
) -> Result<Vec<Issue>> {
    let raw: Vec<Value> = client
        .post_all_pages(client.api_url("search")?, json!({ "jql": jql }))
        .await?;

    raw.into_iter()
        .map(|issue| Issue::extract(issue, story_points_field))
        .collect()
}

fn extract_brief(issue: Value) -> Result<IssueBrief> {
    #[derive(Deserialize)]
    struct RawBrief {
        id: String,
        key: String,
        fields: RawBriefFields,
    }

    #[derive(Deserialize)]
    struct RawBriefFields {
        summary: String,
    }

    let raw: RawBrief =
        serde_json::from_value(issue).map_err(|e| CjmError::Payload(e.to_string()))?;

    Ok(IssueBrief {
        id: raw.id,
        key: raw.key,
        summary: raw.fields.summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> JiraClient {
        let host = server.uri().trim_start_matches("http://").to_string();
        JiraClient::with_credentials("http", &host, "user@example.com", "token".to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn issues_by_keys_skips_the_request_for_no_keys() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        let issues = issues_by_keys(&client, &[], "customfield_10020")
            .await
            .unwrap();

        assert!(issues.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn issues_by_comment_posts_the_comment_jql() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search"))
            .and(body_partial_json(json!({
                "jql": "project = \"AP\" AND comment ~ \"AP WW02/Committed\""
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "startAt": 0,
                "maxResults": 50,
                "total": 1,
                "issues": [
                    {
                        "id": "10100",
                        "key": "AP-1",
                        "fields": {
                            "summary": "Fix the flux capacitor",
                            "assignee": {"accountId": "acc-1"},
                            "status": {"name": "In Progress"},
                            "resolutiondate": null,
                            "customfield_10020": 5.0
                        }
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let issues = issues_by_comment(&client, "AP", "AP WW02/Committed", "customfield_10020")
            .await
            .unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, 10100);
        assert_eq!(issues[0].story_points, Some(5));
    }

    #[tokio::test]
    async fn comment_texts_are_scanned_per_paragraph_run() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/AP-1/comment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "startAt": 0,
                "maxResults": 50,
                "total": 2,
                "comments": [
                    {
                        "body": {
                            "type": "doc",
                            "content": [
                                {
                                    "type": "paragraph",
                                    "content": [
                                        {"type": "text", "text": "AP WW02/Committed"},
                                        {"type": "text", "text": "unrelated run"}
                                    ]
                                },
                                {"type": "codeBlock", "content": []}
                            ]
                        }
                    },
                    {
                        "body": {
                            "type": "doc",
                            "content": [
                                {
                                    "type": "paragraph",
                                    "content": [
                                        {"type": "text", "text": "some discussion"}
                                    ]
                                }
                            ]
                        }
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let pattern = Regex::new("^AP WW02/Committed$").unwrap();
        let matched = matching_comment_texts(&client, "AP-1", &pattern)
            .await
            .unwrap();

        assert_eq!(matched, vec!["AP WW02/Committed"]);
    }

    #[tokio::test]
    async fn add_comment_wraps_the_text_into_a_document() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/issue/AP-2/comment"))
            .and(body_partial_json(json!({
                "body": {
                    "type": "doc",
                    "version": 1,
                    "content": [
                        {
                            "type": "paragraph",
                            "content": [{"text": "AP WW02/Committed", "type": "text"}]
                        }
                    ]
                }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        add_comment(&client, "AP-2", "AP WW02/Committed")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn story_points_field_is_detected_by_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/field"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "summary", "name": "Summary"},
                {"id": "customfield_10020", "name": "Story Points"}
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);

        let field = story_points_field(&client, None).await.unwrap();
        assert_eq!(field, "customfield_10020");
    }

    #[tokio::test]
    async fn configured_story_points_field_skips_detection() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        let field = story_points_field(&client, Some("customfield_999"))
            .await
            .unwrap();

        assert_eq!(field, "customfield_999");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_story_points_field_is_an_integration_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/field"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "summary", "name": "Summary"}
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);

        let err = story_points_field(&client, None).await.unwrap_err();
        assert!(matches!(err, CjmError::UnknownField(_)));
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn user_full_name_falls_back_to_the_user_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/user/search"))
            .and(query_param("query", "user@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server);

        let name = user_full_name(&client, "user@example.com").await.unwrap();
        assert_eq!(name, "user@example.com");
    }

    #[tokio::test]
    async fn user_full_name_takes_the_first_account_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/user/search"))
            .and(query_param("query", "user@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "accountId": "acc-1",
                    "accountType": "atlassian",
                    "displayName": "John Smith"
                }
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);

        let name = user_full_name(&client, "user@example.com").await.unwrap();
        assert_eq!(name, "John Smith");
    }

    #[tokio::test]
    async fn sprint_briefs_reduce_the_issue_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/agile/1.0/sprint/77/issue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "startAt": 0,
                "maxResults": 50,
                "total": 1,
                "issues": [
                    {
                        "id": "10100",
                        "key": "AP-1",
                        "fields": {
                            "summary": "Fix the flux capacitor",
                            "assignee": null,
                            "status": {"name": "To Do"},
                            "resolutiondate": null
                        }
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let briefs = sprint_issue_briefs(&client, 77).await.unwrap();

        assert_eq!(briefs.len(), 1);
        assert_eq!(briefs[0].id, "10100");
        assert_eq!(briefs[0].key, "AP-1");
        assert_eq!(briefs[0].summary, "Fix the flux capacitor");
    }
}
