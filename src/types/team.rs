use serde::{Deserialize, Serialize};

use crate::types::Issue;

/// Team roster data file.
#[derive(Serialize, Deserialize, Clone)]
pub struct TeamFile {
    pub people: Vec<Person>,
}

/// Roster entry. The code is a short unique tag used to refer to the
/// person in hand-edited files.
#[derive(Serialize, Deserialize, Clone)]
pub struct Person {
    pub code: String,
    #[serde(rename = "last name")]
    pub last_name: String,
    #[serde(rename = "first name")]
    pub first_name: String,
    #[serde(rename = "user name", default)]
    pub user_name: String,
    #[serde(rename = "account id")]
    pub account_id: String,
    #[serde(rename = "daily capacity")]
    pub daily_capacity: i64,
}

impl Person {
    /// Full name in the "Last, First" form used by all listings.
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

impl TeamFile {
    /// Account ids of all team members.
    pub fn account_ids(&self) -> Vec<&str> {
        self.people.iter().map(|p| p.account_id.as_str()).collect()
    }

    pub fn person_by_account(&self, account_id: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.account_id == account_id)
    }

    /// Drop issues not assigned to a team member. Unassigned issues are
    /// kept only on request.
    pub fn filter_issues(&self, issues: Vec<Issue>, include_unassigned: bool) -> Vec<Issue> {
        issues
            .into_iter()
            .filter(|issue| match issue.assignee_id.as_deref() {
                Some(account_id) => self.person_by_account(account_id).is_some(),
                None => include_unassigned,
            })
            .collect()
    }
}

/// User record returned by the Jira user listing endpoint.
#[derive(Serialize, Deserialize, Clone)]
pub struct JiraUser {
    #[serde(rename = "accountId")]
    pub account_id: String,
    #[serde(rename = "accountType")]
    pub account_type: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}
