use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{CjmError, Result};
use crate::output;
use crate::types::{Epic, EpicLink, LinkRef, Task, TaskLinks, TasksFile};

pub fn create_file(config: &Config) -> Result<()> {
    let tasks = TasksFile {
        set_id: Uuid::new_v4().simple().to_string(),
        author: config.user_opt().map(String::from),
        date: chrono::Local::now().date_naive(),
        tasks: Vec::new(),
    };

    output::print_json(&tasks);
    Ok(())
}

pub fn import_file(config: &Config, tasks_path: &Path) -> Result<()> {
    let file = File::open(tasks_path).map_err(|source| CjmError::FileRead {
        path: tasks_path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let columns = Columns::from_headers(reader.headers()?)?;

    let mut tasks = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        tasks.push(parse_task(&columns, &record, i + 1)?);
    }

    output::print_json(&TasksFile {
        set_id: Uuid::new_v4().simple().to_string(),
        author: config.user_opt().map(String::from),
        date: chrono::Local::now().date_naive(),
        tasks,
    });
    Ok(())
}

/// Header positions of the recognized CSV columns; only `title` must be
/// present.
struct Columns {
    title: usize,
    summary: Option<usize>,
    type_name: Option<usize>,
    story_points: Option<usize>,
    epic_name: Option<usize>,
    epic_color: Option<usize>,
    epic_idx: Option<usize>,
    epic_key: Option<usize>,
    related: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        Ok(Columns {
            title: position("title").ok_or(CjmError::CsvMissingColumn { name: "title" })?,
            summary: position("summary"),
            type_name: position("type name"),
            story_points: position("story points"),
            epic_name: position("epic name"),
            epic_color: position("epic color"),
            epic_idx: position("epic idx"),
            epic_key: position("epic key"),
            related: position("related"),
        })
    }
}

fn field<'a>(record: &'a StringRecord, column: Option<usize>) -> Option<&'a str> {
    column
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_task(columns: &Columns, record: &StringRecord, row: usize) -> Result<Task> {
    let title = field(record, Some(columns.title)).ok_or(CjmError::CsvEmptyField {
        row,
        name: "title",
    })?;
    let type_name = field(record, columns.type_name);

    let story_points = match field(record, columns.story_points) {
        Some(value) => Some(value.parse().map_err(|_| CjmError::CsvBadInteger {
            row,
            name: "story points",
            value: value.to_string(),
        })?),
        None if type_name == Some("Epic") => None,
        None => Some(0),
    };

    let epic = Epic {
        name: field(record, columns.epic_name).map(String::from),
        color: field(record, columns.epic_color).map(String::from),
        link: Some(EpicLink {
            idx: field(record, columns.epic_idx).map(String::from),
            key: field(record, columns.epic_key).map(String::from),
        })
        .filter(|link| !link.is_empty()),
    };

    let related: Vec<LinkRef> = field(record, columns.related)
        .unwrap_or("")
        .split(' ')
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<i64>() {
            Ok(idx) => LinkRef::Idx(idx),
            Err(_) => LinkRef::Key(part.to_string()),
        })
        .collect();

    Ok(Task {
        title: title.to_string(),
        summary: field(record, columns.summary).unwrap_or("-").to_string(),
        idx: row as i64,
        type_name: type_name.map(String::from),
        story_points,
        epic: Some(epic).filter(|epic| !epic.is_empty()),
        links: (!related.is_empty()).then_some(TaskLinks { related }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(headers: &[&str], values: &[&str]) -> Result<Task> {
        let header_record = StringRecord::from(headers.to_vec());
        let columns = Columns::from_headers(&header_record)?;
        parse_task(&columns, &StringRecord::from(values.to_vec()), 1)
    }

    #[test]
    fn title_column_is_required() {
        let headers = StringRecord::from(vec!["summary", "story points"]);

        let error = Columns::from_headers(&headers).err().unwrap();

        assert!(matches!(
            error,
            CjmError::CsvMissingColumn { name: "title" }
        ));
    }

    #[test]
    fn empty_title_is_rejected() {
        let error = parse(&["title"], &[" "]).err().unwrap();

        assert!(matches!(
            error,
            CjmError::CsvEmptyField { row: 1, name: "title" }
        ));
    }

    #[test]
    fn bare_row_gets_the_defaults() {
        let task = parse(&["title"], &["Fix the flaky login test"]).unwrap();

        assert_eq!(task.title, "Fix the flaky login test");
        assert_eq!(task.summary, "-");
        assert_eq!(task.idx, 1);
        assert_eq!(task.story_points, Some(0));
        assert!(task.type_name.is_none());
        assert!(task.epic.is_none());
        assert!(task.links.is_none());
    }

    #[test]
    fn epics_default_to_unestimated() {
        let task = parse(&["title", "type name"], &["Billing rework", "Epic"]).unwrap();

        assert_eq!(task.type_name.as_deref(), Some("Epic"));
        assert!(task.story_points.is_none());
    }

    #[test]
    fn explicit_story_points_win_over_the_epic_default() {
        let task = parse(
            &["title", "type name", "story points"],
            &["Billing rework", "Epic", "8"],
        )
        .unwrap();

        assert_eq!(task.story_points, Some(8));
    }

    #[test]
    fn bad_story_points_are_reported_with_the_offending_value() {
        let error = parse(&["title", "story points"], &["Task", "lots"])
            .err()
            .unwrap();

        match error {
            CjmError::CsvBadInteger { row, name, value } => {
                assert_eq!(row, 1);
                assert_eq!(name, "story points");
                assert_eq!(value, "lots");
            }
            _ => panic!("expected a bad integer error"),
        }
    }

    #[test]
    fn epic_link_fields_are_kept_only_when_filled() {
        let task = parse(
            &["title", "epic name", "epic color", "epic idx", "epic key"],
            &["Task", "Billing", "purple", "3", ""],
        )
        .unwrap();

        let epic = task.epic.unwrap();
        assert_eq!(epic.name.as_deref(), Some("Billing"));
        assert_eq!(epic.color.as_deref(), Some("purple"));
        let link = epic.link.unwrap();
        assert_eq!(link.idx.as_deref(), Some("3"));
        assert!(link.key.is_none());
    }

    #[test]
    fn related_links_mix_indices_and_issue_keys() {
        let task = parse(&["title", "related"], &["Task", "2 AP-15  4"]).unwrap();

        assert_eq!(
            task.links.unwrap().related,
            vec![
                LinkRef::Idx(2),
                LinkRef::Key("AP-15".to_string()),
                LinkRef::Idx(4),
            ]
        );
    }
}
