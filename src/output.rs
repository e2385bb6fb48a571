use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::classify::Status;

/// Global output format setting
static OUTPUT_JSON: AtomicBool = AtomicBool::new(false);

pub fn set_json_output(json: bool) {
    OUTPUT_JSON.store(json, Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    OUTPUT_JSON.load(Ordering::Relaxed)
}

/// Print a table or JSON depending on output mode
pub fn print_table<T, R, F>(items: &[T], to_row: F)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
    } else {
        let rows: Vec<R> = items.iter().map(|item| to_row(item)).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
}

/// Print a single item or JSON depending on output mode
pub fn print_item<T: Serialize>(item: &T, display: impl FnOnce(&T)) {
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
    } else {
        display(item);
    }
}

/// Print pre-built rows as a table
pub fn print_rows<R: Tabled>(rows: Vec<R>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Print a value as JSON regardless of the output mode
pub fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Print caption/value pairs as a headerless two column table
pub fn print_kv(rows: Vec<(&str, String)>) {
    let mut builder = Builder::default();
    for (caption, value) in rows {
        builder.push_record([caption.to_string(), value]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

/// Print a message (skipped in JSON mode, or prints simple object)
pub fn print_message(message: &str) {
    if is_json_output() {
        println!(r#"{{"message": "{}"}}"#, message.replace('"', "\\\""));
    } else {
        println!("{message}");
    }
}

/// Print a warning to stderr
pub fn warn(message: &str) {
    eprintln!("{} {}", "WARNING:".yellow(), message);
}

/// Row emphasis used by the summary tables
#[derive(Clone, Copy, PartialEq)]
pub enum Importance {
    Low,
    Normal,
    High,
}

pub fn emphasize(text: &str, importance: Importance) -> String {
    match importance {
        Importance::Low => text.dimmed().to_string(),
        Importance::Normal => text.to_string(),
        Importance::High => text.bold().to_string(),
    }
}

/// Arrow glyphs marking how far a ratio strays from its neutral band
pub fn status_arrows(status: Status) -> String {
    match status {
        Status::Highest => "🡅🡅🡅".bright_red().to_string(),
        Status::Higher => "🡅🡅".red().to_string(),
        Status::High => "🡅".red().dimmed().to_string(),
        Status::Neutral => String::new(),
        Status::Low => "🡇".blue().dimmed().to_string(),
        Status::Lower => "🡇🡇".blue().to_string(),
        Status::Lowest => "🡇🡇🡇".bright_blue().to_string(),
    }
}

/// Format an optional percentage ratio, empty when undefined
pub fn format_ratio(ratio: Option<Decimal>) -> String {
    match ratio {
        Some(value) => format!("{value}%"),
        None => String::new(),
    }
}

/// Format a date string as date only
pub fn format_date_only(iso: &str) -> String {
    use chrono::{DateTime, Utc};

    if let Ok(dt) = iso.parse::<DateTime<Utc>>() {
        dt.format("%Y-%m-%d").to_string()
    } else {
        iso.split('T').next().unwrap_or(iso).to_string()
    }
}
