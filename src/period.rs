use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;

/// Week numbering used when naming sprint periods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeekSystem {
    Iso,
    Us,
}

/// Day offsets applied to the sprint boundaries before the period name is
/// derived, so reports can label a shifted working window.
#[derive(Deserialize, Default, Clone, Copy, Debug)]
pub struct PeriodOffset {
    #[serde(default)]
    pub lower: i64,
    #[serde(default)]
    pub upper: i64,
}

/// Name of the week span covered by the given dates, e.g. "WW03" or
/// "WW51-WW02".
pub fn period_name(
    start: NaiveDate,
    end: NaiveDate,
    system: WeekSystem,
    offset: PeriodOffset,
) -> String {
    let first = week_number(start + Duration::days(offset.lower), system);
    let last = week_number(end + Duration::days(offset.upper), system);

    if first == last {
        format!("WW{first:02}")
    } else {
        format!("WW{first:02}-WW{last:02}")
    }
}

/// Period name in the form used for sprint names and data file names.
pub fn iso_period_name(start: NaiveDate, end: NaiveDate) -> String {
    period_name(start, end, WeekSystem::Iso, PeriodOffset::default())
}

/// Monday of the week the given date falls into.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_number(date: NaiveDate, system: WeekSystem) -> u32 {
    match system {
        WeekSystem::Iso => date.iso_week().week(),
        WeekSystem::Us => us_week_number(date),
    }
}

/// US-style week number: weeks are counted by the Saturday that closes
/// them, starting from the first Saturday of that Saturday's year.
fn us_week_number(date: NaiveDate) -> u32 {
    let saturday = saturday_on_or_after(date);
    saturday.ordinal0() / 7 + 1
}

fn saturday_on_or_after(date: NaiveDate) -> NaiveDate {
    date + Duration::days(6 - date.weekday().num_days_from_sunday() as i64)
}
