//! Loading, saving and naming of the json data files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{CjmError, Result};
use crate::period;
use crate::types::SprintFile;

/// Load and parse a json data file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| CjmError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|source| CjmError::FileParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value into a pretty-printed json data file.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| CjmError::FileParse {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');

    fs::write(path, text).map_err(|source| CjmError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Default name of a sprint-derived data file,
/// e.g. `apollo_2021-ww02-ww03_commitment.json`.
pub fn default_file_name(sprint: &SprintFile, variant: &str) -> String {
    use chrono::Datelike;

    format!(
        "{}_{}-{}_{}.json",
        sprint.project.name.to_lowercase(),
        sprint.start_date.iso_week().year(),
        period::iso_period_name(sprint.start_date, sprint.end_date).to_lowercase(),
        variant
    )
}

/// Path of a sprint-derived data file within the configured data directory.
pub fn data_file_path(cfg: &Config, sprint: &SprintFile, variant: &str) -> PathBuf {
    cfg.data_dir().join(default_file_name(sprint, variant))
}
