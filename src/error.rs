use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CjmError {
    #[error(
        "Missing Jira user name. Use the '--user' option or the defaults file to specify it"
    )]
    MissingUser,

    #[error(
        "Missing Jira user token. Use the '--token' option or the defaults file to specify it"
    )]
    MissingToken,

    #[error("Missing Jira host name. Use the '--host' option or the defaults file to specify it")]
    MissingHost,

    #[error(
        "Missing project key. Use the '--project-key' option or the defaults file to specify it"
    )]
    MissingProjectKey,

    #[error("Missing board id. Use the '--board' option or the defaults file to specify it")]
    MissingBoardId,

    #[error("Missing sprint id. Use the '--sprint' option or the defaults file to specify it")]
    MissingSprintId,

    #[error("The sprint id is not specified by the sprint data file ('{path}')")]
    MissingSprintFileId { path: PathBuf },

    #[error("Failed to parse defaults file at {path}: {source}")]
    DefaultsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jira request failed (status {status}) for {url}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected Jira response data: {0}")]
    Payload(String),

    #[error("No field named \"{0}\" found on the Jira server")]
    UnknownField(String),

    #[error("Invalid comment pattern: {0}")]
    CommentPattern(#[from] regex::Error),

    #[error("Failed to parse CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("The CSV data is missing a required '{name}' column")]
    CsvMissingColumn { name: &'static str },

    #[error("Row #{row}: The '{name}' field is empty")]
    CsvEmptyField { row: usize, name: &'static str },

    #[error("Row #{row}: The '{name}' field doesn't contain a valid integer ('{value}')")]
    CsvBadInteger {
        row: usize,
        name: &'static str,
        value: String,
    },

    #[error("Failed to parse data file {path}: {source}")]
    FileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CjmError {
    /// Process exit code for the error, grouped by failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            CjmError::MissingUser
            | CjmError::MissingToken
            | CjmError::MissingHost
            | CjmError::MissingProjectKey
            | CjmError::MissingBoardId
            | CjmError::MissingSprintId
            | CjmError::MissingSprintFileId { .. }
            | CjmError::DefaultsParse { .. } => 1,
            CjmError::Http(_) | CjmError::Api { .. } | CjmError::InvalidUrl(_) => 2,
            CjmError::FileRead { .. } | CjmError::FileWrite { .. } => 3,
            CjmError::Payload(_) | CjmError::UnknownField(_) => 4,
            CjmError::CommentPattern(_) => 5,
            CjmError::Csv(_)
            | CjmError::CsvMissingColumn { .. }
            | CjmError::CsvEmptyField { .. }
            | CjmError::CsvBadInteger { .. } => 6,
            CjmError::FileParse { .. } => 7,
        }
    }
}

pub type Result<T> = std::result::Result<T, CjmError>;
