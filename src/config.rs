use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{CjmError, Result};
use crate::output;
use crate::period::{PeriodOffset, WeekSystem};

/// File looked up in the data directory before falling back to the
/// user-level configuration directory.
const DEFAULTS_FILE_NAME: &str = ".cjm.json";

#[derive(Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    pub jira: JiraDefaults,
    #[serde(default)]
    pub project: ProjectDefaults,
    #[serde(default)]
    pub board: BoardDefaults,
    #[serde(default)]
    pub sprint: SprintDefaults,
    #[serde(default)]
    pub client: ClientDefaults,
    #[serde(default)]
    pub path: PathDefaults,
    #[serde(default)]
    pub issue: IssueDefaults,
    #[serde(default)]
    pub report: ReportDefaults,
}

#[derive(Deserialize, Default)]
pub struct JiraDefaults {
    pub scheme: Option<String>,
    pub host: Option<String>,
    #[serde(default)]
    pub user: UserDefaults,
    #[serde(default)]
    pub fields: FieldDefaults,
}

#[derive(Deserialize, Default)]
pub struct UserDefaults {
    pub name: Option<String>,
    pub token: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct FieldDefaults {
    #[serde(rename = "story points")]
    pub story_points: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ProjectDefaults {
    pub key: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct BoardDefaults {
    pub id: Option<i64>,
}

#[derive(Deserialize, Default)]
pub struct SprintDefaults {
    pub id: Option<i64>,
}

#[derive(Deserialize, Default)]
pub struct ClientDefaults {
    pub name: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct PathDefaults {
    pub data: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
pub struct IssueDefaults {
    #[serde(rename = "include unassigned", default)]
    pub include_unassigned: bool,
    #[serde(rename = "allow late delivery", default)]
    pub allow_late_delivery: bool,
}

#[derive(Deserialize, Default)]
pub struct ReportDefaults {
    #[serde(rename = "week numbering system")]
    pub week_numbering_system: Option<String>,
    #[serde(rename = "period offset", default)]
    pub period_offset: PeriodOffset,
    #[serde(default)]
    pub capacity: CapacityReportDefaults,
}

#[derive(Deserialize, Default)]
pub struct CapacityReportDefaults {
    #[serde(rename = "page break", default)]
    pub page_break: PageBreaks,
}

/// Where the capacity report inserts horizontal rules standing in for
/// page breaks.
#[derive(Deserialize, Default, Clone, Copy)]
pub struct PageBreaks {
    #[serde(rename = "absence section", default)]
    pub absence_section: bool,
    #[serde(rename = "weekly table", default)]
    pub weekly_table: bool,
}

impl Defaults {
    /// Load defaults, preferring a project-local file in the data
    /// directory over the user-level configuration directory. A missing
    /// file yields empty defaults; an unreadable one only warns.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let local = data_dir.join(DEFAULTS_FILE_NAME);
        if local.exists() {
            return Self::read(&local);
        }

        if let Some(user_level) = Self::user_level_path() {
            if user_level.exists() {
                return Self::read(&user_level);
            }
        }

        Ok(Defaults::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                output::warn(&format!(
                    "Defaults file '{}' cannot be read ({e})",
                    path.display()
                ));
                return Ok(Defaults::default());
            }
        };

        serde_json::from_str(&contents).map_err(|e| CjmError::DefaultsParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn user_level_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cjm").map(|dirs| dirs.config_dir().join("defaults.json"))
    }
}

/// Resolved settings combining command line options, environment and the
/// defaults file. Flags always win, the defaults file fills the gaps.
pub struct Config {
    defaults: Defaults,
    scheme: Option<String>,
    host: Option<String>,
    user: Option<String>,
    token: Option<String>,
    data_dir: PathBuf,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let defaults_dir = cli.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let defaults = Defaults::load(&defaults_dir)?;

        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| defaults.path.data.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Config {
            defaults,
            scheme: cli.scheme.clone(),
            host: cli.host.clone(),
            user: cli.user.clone(),
            token: cli.token.clone(),
            data_dir,
        })
    }

    pub fn scheme(&self) -> &str {
        self.scheme
            .as_deref()
            .or(self.defaults.jira.scheme.as_deref())
            .unwrap_or("https")
    }

    pub fn host(&self) -> Result<&str> {
        self.host
            .as_deref()
            .or(self.defaults.jira.host.as_deref())
            .ok_or(CjmError::MissingHost)
    }

    pub fn user(&self) -> Result<&str> {
        self.user
            .as_deref()
            .or(self.defaults.jira.user.name.as_deref())
            .ok_or(CjmError::MissingUser)
    }

    /// User name when one is configured, without treating its absence as
    /// an error.
    pub fn user_opt(&self) -> Option<&str> {
        self.user
            .as_deref()
            .or(self.defaults.jira.user.name.as_deref())
    }

    /// API token with the CJM_TOKEN env var taking precedence over the
    /// defaults file.
    pub fn token(&self) -> Result<String> {
        if let Some(token) = self.token.clone() {
            return Ok(token);
        }
        if let Ok(token) = std::env::var("CJM_TOKEN") {
            return Ok(token);
        }

        self.defaults
            .jira
            .user
            .token
            .clone()
            .ok_or(CjmError::MissingToken)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Project key, preferring an explicit argument over the defaults.
    pub fn project_key(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(String::from)
            .or_else(|| self.defaults.project.key.clone())
            .ok_or(CjmError::MissingProjectKey)
    }

    pub fn board_id(&self, explicit: Option<i64>) -> Result<i64> {
        explicit
            .or(self.defaults.board.id)
            .ok_or(CjmError::MissingBoardId)
    }

    pub fn sprint_id(&self, explicit: Option<i64>) -> Result<i64> {
        explicit
            .or(self.defaults.sprint.id)
            .ok_or(CjmError::MissingSprintId)
    }

    pub fn client_name(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(String::from)
            .or_else(|| self.defaults.client.name.clone())
    }

    pub fn story_points_field(&self) -> Option<&str> {
        self.defaults.jira.fields.story_points.as_deref()
    }

    pub fn include_unassigned(&self, flag: bool) -> bool {
        flag || self.defaults.issue.include_unassigned
    }

    pub fn allow_late_delivery(&self, flag: bool) -> bool {
        flag || self.defaults.issue.allow_late_delivery
    }

    pub fn week_system(&self) -> WeekSystem {
        match self.defaults.report.week_numbering_system.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("us") => WeekSystem::Us,
            _ => WeekSystem::Iso,
        }
    }

    pub fn period_offset(&self) -> PeriodOffset {
        self.defaults.report.period_offset
    }

    pub fn page_breaks(&self) -> PageBreaks {
        self.defaults.report.capacity.page_break
    }
}
