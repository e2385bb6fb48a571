//! Workday and capacity arithmetic over the sprint calendar.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::types::{CapacityFile, CapacityPerson, SprintFile};

/// Team-wide calendar for one sprint, derived from the sprint and capacity
/// data files.
pub struct TeamCapacity {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub workday_count: i64,
    pub national_holidays: Vec<NaiveDate>,
    pub extra_holidays: Vec<NaiveDate>,
    pub shared_holidays: Vec<NaiveDate>,
}

impl TeamCapacity {
    /// Workdays left after the team-wide holidays.
    pub fn effective_workdays(&self) -> i64 {
        self.workday_count - self.shared_holidays.len() as i64
    }
}

/// Per-person availability within one sprint.
#[derive(Serialize, Clone)]
pub struct PersonCapacity {
    #[serde(rename = "account id")]
    pub account_id: String,
    #[serde(rename = "last name")]
    pub last_name: String,
    #[serde(rename = "first name")]
    pub first_name: String,
    #[serde(rename = "daily capacity")]
    pub daily_capacity: i64,
    #[serde(rename = "personal holidays")]
    pub personal_holidays: Vec<NaiveDate>,
    pub holidays: Vec<NaiveDate>,
    #[serde(rename = "sprint workday count")]
    pub sprint_workday_count: i64,
    #[serde(rename = "sprint capacity")]
    pub sprint_capacity: i64,
}

impl PersonCapacity {
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

fn weekdays_from_ce(date: NaiveDate) -> i64 {
    let days = i64::from(date.num_days_from_ce()) - 1;
    5 * days.div_euclid(7) + days.rem_euclid(7).min(5)
}

/// Weekdays in the half-open range `[start, end)`. Negative when the range
/// is reversed.
pub fn workday_count(start: NaiveDate, end: NaiveDate) -> i64 {
    weekdays_from_ce(end) - weekdays_from_ce(start)
}

/// Dates falling within `[start, end]`, sorted with duplicates removed.
pub fn dates_within(dates: &[NaiveDate], start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut within: Vec<NaiveDate> = dates
        .iter()
        .copied()
        .filter(|d| (start..=end).contains(d))
        .collect();
    within.sort_unstable();
    within.dedup();
    within
}

/// Resolve the team calendar for the sprint covered by the capacity file.
///
/// The shared holiday list concatenates the national and additional lists
/// without cross-list deduplication, so a date present in both is counted
/// twice when workdays are subtracted.
pub fn team_capacity(sprint: &SprintFile, capacity: &CapacityFile) -> TeamCapacity {
    let start_date = sprint.start_date;
    let end_date = sprint.end_date;

    let national_holidays = dates_within(&capacity.national_holidays, start_date, end_date);
    let extra_holidays = dates_within(&capacity.additional_holidays, start_date, end_date);

    let mut shared_holidays: Vec<NaiveDate> = national_holidays
        .iter()
        .chain(extra_holidays.iter())
        .copied()
        .collect();
    shared_holidays.sort_unstable();

    TeamCapacity {
        start_date,
        end_date,
        workday_count: workday_count(start_date, end_date),
        national_holidays,
        extra_holidays,
        shared_holidays,
    }
}

/// Resolve one person's availability against the team calendar.
pub fn person_capacity(team: &TeamCapacity, person: &CapacityPerson) -> PersonCapacity {
    let personal_holidays = dates_within(&person.personal_holidays, team.start_date, team.end_date);

    let mut holidays: Vec<NaiveDate> = team
        .shared_holidays
        .iter()
        .chain(personal_holidays.iter())
        .copied()
        .collect();
    holidays.sort_unstable();

    let sprint_workday_count = team.workday_count
        - team.shared_holidays.len() as i64
        - personal_holidays.len() as i64;

    PersonCapacity {
        account_id: person.account_id.clone(),
        last_name: person.last_name.clone(),
        first_name: person.first_name.clone(),
        daily_capacity: person.daily_capacity,
        personal_holidays,
        holidays,
        sprint_workday_count,
        sprint_capacity: sprint_workday_count * person.daily_capacity,
    }
}
