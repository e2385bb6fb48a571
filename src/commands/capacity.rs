use std::path::Path;

use chrono::{Datelike, NaiveDate};
use tabled::Tabled;

use crate::capacity;
use crate::config::Config;
use crate::data;
use crate::error::Result;
use crate::output;
use crate::types::{CapacityFile, CapacityPerson, SprintFile, TeamFile};

const HOLIDAY_FILE_NAME: &str = "holidays.json";

pub fn create_file(config: &Config, sprint_path: &Path, team_path: &Path) -> Result<()> {
    let sprint: SprintFile = data::load_json(sprint_path)?;
    sprint.id_required(sprint_path)?;
    let team: TeamFile = data::load_json(team_path)?;

    let national_holidays = national_holidays(config, &sprint)?;

    let people: Vec<CapacityPerson> = team
        .people
        .iter()
        .map(|person| CapacityPerson {
            code: person.code.clone(),
            last_name: person.last_name.clone(),
            first_name: person.first_name.clone(),
            user_name: person.user_name.clone(),
            account_id: person.account_id.clone(),
            daily_capacity: person.daily_capacity,
            personal_holidays: Vec::new(),
        })
        .collect();

    let capacity = CapacityFile {
        people,
        national_holidays,
        additional_holidays: Vec::new(),
    };

    output::print_item(&capacity, |file| {
        if !file.national_holidays.is_empty() {
            let holidays: Vec<HolidayRow> = file
                .national_holidays
                .iter()
                .enumerate()
                .map(|(i, date)| HolidayRow {
                    index: i + 1,
                    date: *date,
                })
                .collect();
            output::print_rows(holidays);
        }

        let people: Vec<PersonRow> = file
            .people
            .iter()
            .map(|person| PersonRow {
                account_id: person.account_id.clone(),
                name: format!("{} {}", person.first_name, person.last_name),
                daily_capacity: person.daily_capacity,
            })
            .collect();
        output::print_rows(people);
    });

    Ok(())
}

pub fn print(config: &Config, sprint_path: &Path) -> Result<()> {
    let sprint: SprintFile = data::load_json(sprint_path)?;
    sprint.id_required(sprint_path)?;
    let capacity_file: CapacityFile =
        data::load_json(&data::data_file_path(config, &sprint, "capacity"))?;

    let calendar = capacity::team_capacity(&sprint, &capacity_file);
    let mut people: Vec<capacity::PersonCapacity> = capacity_file
        .people
        .iter()
        .map(|person| capacity::person_capacity(&calendar, person))
        .collect();
    people.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));

    for person in &people {
        if person.sprint_workday_count < 0 {
            output::warn(&format!(
                "Sprint workday count for '{}' is negative ({}). Check the holiday lists in \
                 the capacity data file",
                person.full_name(),
                person.sprint_workday_count
            ));
        }
    }

    output::print_table(&people, |person| CapacityRow {
        last_name: person.last_name.clone(),
        first_name: person.first_name.clone(),
        daily_capacity: person.daily_capacity,
        workdays: person.sprint_workday_count,
        sprint_capacity: person.sprint_capacity,
    });

    Ok(())
}

/// National holidays overlapping the sprint, weekends dropped since they
/// never count as workdays anyway.
fn national_holidays(config: &Config, sprint: &SprintFile) -> Result<Vec<NaiveDate>> {
    let path = config.data_dir().join(HOLIDAY_FILE_NAME);
    if !path.exists() {
        output::warn(&format!(
            "Holiday calendar '{}' not found; assuming no national holidays",
            path.display()
        ));
        return Ok(Vec::new());
    }

    let calendar: Vec<NaiveDate> = data::load_json(&path)?;
    Ok(sprint_holidays(
        &calendar,
        sprint.start_date,
        sprint.end_date,
    ))
}

fn sprint_holidays(calendar: &[NaiveDate], start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    capacity::dates_within(calendar, start, end)
        .into_iter()
        .filter(|date| date.weekday().num_days_from_monday() < 5)
        .collect()
}

#[derive(Tabled)]
struct HolidayRow {
    #[tabled(rename = "")]
    index: usize,
    #[tabled(rename = "Holiday date")]
    date: NaiveDate,
}

#[derive(Tabled)]
struct PersonRow {
    #[tabled(rename = "Account ID")]
    account_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Daily capacity")]
    daily_capacity: i64,
}

#[derive(Tabled)]
struct CapacityRow {
    #[tabled(rename = "Last Name")]
    last_name: String,
    #[tabled(rename = "First Name")]
    first_name: String,
    #[tabled(rename = "Daily Cap.")]
    daily_capacity: i64,
    #[tabled(rename = "Workdays")]
    workdays: i64,
    #[tabled(rename = "Sprint Cap.")]
    sprint_capacity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(text: &str) -> NaiveDate {
        text.parse().unwrap()
    }

    #[test]
    fn sprint_holidays_drop_weekends_and_out_of_range_dates() {
        let calendar = vec![
            day("2021-01-01"), // Friday, before the sprint
            day("2021-01-06"), // Wednesday
            day("2021-01-09"), // Saturday
            day("2021-01-10"), // Sunday
            day("2021-01-13"), // Wednesday
            day("2021-02-01"), // after the sprint
        ];

        let holidays = sprint_holidays(&calendar, day("2021-01-04"), day("2021-01-17"));

        assert_eq!(holidays, vec![day("2021-01-06"), day("2021-01-13")]);
    }

    #[test]
    fn sprint_holidays_come_out_sorted_and_deduplicated() {
        let calendar = vec![day("2021-01-13"), day("2021-01-06"), day("2021-01-13")];

        let holidays = sprint_holidays(&calendar, day("2021-01-04"), day("2021-01-17"));

        assert_eq!(holidays, vec![day("2021-01-06"), day("2021-01-13")]);
    }
}
