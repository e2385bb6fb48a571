use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Capacity data file: team-wide holiday calendars plus per-person
/// availability, meant to be hand-tuned after generation.
#[derive(Serialize, Deserialize, Clone)]
pub struct CapacityFile {
    pub people: Vec<CapacityPerson>,
    #[serde(rename = "national holidays", default)]
    pub national_holidays: Vec<NaiveDate>,
    #[serde(rename = "additional holidays", default)]
    pub additional_holidays: Vec<NaiveDate>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CapacityPerson {
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
    #[serde(rename = "personal holidays", default)]
    pub personal_holidays: Vec<NaiveDate>,
}

impl CapacityPerson {
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}
