use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "cjm")]
#[command(about = "Sprint commitment and delivery bookkeeping for Jira", version)]
#[command(after_help = "EXAMPLES:
    cjm list-boards --project-key AP
    cjm create-sprint-file --next-week > sprint.json
    cjm create-commitment-file sprint.json --summary
    cjm generate-delivery-report sprint.json --client Initech")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Jira user name (usually the account email)
    #[arg(long, global = true, value_name = "NAME")]
    pub user: Option<String>,

    /// Jira API token (the CJM_TOKEN environment variable also works)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Jira server host name
    #[arg(long, global = true, value_name = "HOST")]
    pub host: Option<String>,

    /// URL scheme used to reach the Jira server
    #[arg(long, global = true, value_name = "SCHEME")]
    pub scheme: Option<String>,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Directory holding the data files and the .cjm.json defaults file
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print debug diagnostics and error causes
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Three way issue filter argument.
#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    All,
    Yes,
    No,
}

impl Selector {
    /// Whether an issue with the given property state passes the filter.
    pub fn selects(self, state: bool) -> bool {
        match self {
            Selector::All => true,
            Selector::Yes => state,
            Selector::No => !state,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List scrum boards
    #[command(after_help = "EXAMPLES:
    cjm list-boards --project-key AP
    cjm list-boards --all")]
    ListBoards {
        /// Project to list the boards for
        #[arg(long, value_name = "KEY")]
        project_key: Option<String>,

        /// List boards of every project
        #[arg(long)]
        all: bool,
    },
    /// List projects
    ListProjects,
    /// List the sprints defined on a board
    #[command(after_help = "EXAMPLES:
    cjm list-sprints --board 17")]
    ListSprints {
        /// Identifier of the board to list the sprints for
        #[arg(long, value_name = "ID")]
        board: Option<i64>,
    },
    /// List the issues assigned to a sprint
    #[command(after_help = "EXAMPLES:
    cjm list-sprint-issues --sprint 1234")]
    ListSprintIssues {
        /// Identifier of the sprint to list the issues for
        #[arg(long, value_name = "ID")]
        sprint: Option<i64>,
    },
    /// Create a sprint data file
    #[command(after_help = "EXAMPLES:
    cjm create-sprint-file --next-week --json-output > sprint.json
    cjm create-sprint-file --start 2023-01-16 --length 7 --sprint-id 1234")]
    CreateSprintFile(SprintFileArgs),
    /// Create a team roster from the Jira user directory
    #[command(after_help = "EXAMPLES:
    cjm create-team-file --project-key AP > team.json")]
    CreateTeamFile {
        /// Project the roster is created for
        #[arg(long, value_name = "KEY")]
        project_key: Option<String>,
    },
    /// Derive a capacity file from a sprint and a team roster
    #[command(after_help = "EXAMPLES:
    cjm create-capacity-file sprint.json team.json --json-output > capacity.json")]
    CreateCapacityFile {
        /// Path to the sprint data file
        sprint_file: PathBuf,

        /// Path to the team roster file
        team_file: PathBuf,
    },
    /// Collect the sprint commitment from Jira
    #[command(after_help = "EXAMPLES:
    cjm create-commitment-file sprint.json --json-output > commitment.json
    cjm create-commitment-file sprint.json --summary
    cjm create-commitment-file sprint.json --estimated no")]
    CreateCommitmentFile(CommitmentArgs),
    /// Determine how the sprint commitment was delivered
    #[command(after_help = "EXAMPLES:
    cjm create-delivery-file sprint.json team.json commitment.json --json-output
    cjm create-delivery-file sprint.json team.json commitment.json --summary")]
    CreateDeliveryFile(DeliveryArgs),
    /// Print a sprint data file as a table
    PrintSprint {
        /// Path to the sprint data file
        sprint_file: PathBuf,
    },
    /// Print the per-person sprint capacity
    PrintCapacity {
        /// Path to the sprint data file
        sprint_file: PathBuf,
    },
    /// Add the commitment comment to committed issues that lack it
    #[command(after_help = "EXAMPLES:
    cjm push-commitment-comments sprint.json commitment.json --preview
    cjm push-commitment-comments sprint.json commitment.json")]
    PushCommitmentComments(PushCommitmentArgs),
    /// Add closing comments recording each issue's delivery outcome
    #[command(after_help = "EXAMPLES:
    cjm push-delivery-comments sprint.json delivery.json --preview
    cjm push-delivery-comments sprint.json delivery.json")]
    PushDeliveryComments(PushDeliveryArgs),
    /// Generate the sprint commitment report
    GenerateCommitmentReport(ReportArgs),
    /// Generate the sprint delivery report
    GenerateDeliveryReport(ReportArgs),
    /// Generate the sprint capacity report
    GenerateCapacityReport(ReportArgs),
    /// Print an empty task definition file
    CreateTasksFile,
    /// Convert a CSV task list to a task definition file
    #[command(after_help = "EXAMPLES:
    cjm import-tasks-file tasks.csv > tasks.json")]
    ImportTasksFile {
        /// Path to the CSV task definition list
        tasks_file: PathBuf,
    },
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    cjm completions bash > ~/.bash_completion.d/cjm
    cjm completions zsh > ~/.zfunc/_cjm")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
pub struct SprintFileArgs {
    /// Project with which the sprint is associated
    #[arg(long, value_name = "KEY")]
    pub project_key: Option<String>,

    /// Jira sprint id recorded in the file
    #[arg(long, value_name = "ID")]
    pub sprint_id: Option<i64>,

    /// Start the sprint on next week's Monday (the default)
    #[arg(long, group = "start_day")]
    pub next_week: bool,

    /// Start the sprint on this week's Monday
    #[arg(long, group = "start_day")]
    pub this_week: bool,

    /// Start the sprint on last week's Monday
    #[arg(long, group = "start_day")]
    pub last_week: bool,

    /// Start the sprint on DATE (yyyy-mm-dd)
    #[arg(long, value_name = "DATE", group = "start_day")]
    pub start: Option<NaiveDate>,

    /// Sprint length in days
    #[arg(long, value_name = "DAYS", default_value = "14")]
    pub length: i64,
}

#[derive(Args)]
pub struct CommitmentArgs {
    /// Path to the sprint data file
    pub sprint_file: PathBuf,

    /// Include unassigned issues in the issue list
    #[arg(long)]
    pub include_unassigned: bool,

    /// Filter the issues by the fact of being estimated
    #[arg(long, value_enum, value_name = "WHICH", default_value = "all")]
    pub estimated: Selector,

    /// Filter the issues by the presence of the commitment comment
    #[arg(long, value_enum, value_name = "WHICH", default_value = "all")]
    pub commented: Selector,

    /// Filter the issues by their sprint association
    #[arg(long, value_enum, value_name = "WHICH", default_value = "all")]
    pub associated: Selector,

    /// Show the per-person summary instead of the issue table
    #[arg(long, short = 's')]
    pub summary: bool,
}

#[derive(Args)]
pub struct DeliveryArgs {
    /// Path to the sprint data file
    pub sprint_file: PathBuf,

    /// Path to the team roster file
    pub team_file: PathBuf,

    /// Path to the commitment data file
    pub commitment_file: PathBuf,

    /// Count issues marked with the delivery comment as delivered
    #[arg(long)]
    pub consider_delivery_comment: bool,

    /// Count issues resolved after the sprint end as delivered
    #[arg(long)]
    pub allow_late_delivery: bool,

    /// Show the per-person summary instead of the issue table
    #[arg(long, short = 's')]
    pub summary: bool,
}

#[derive(Args)]
pub struct PushCommitmentArgs {
    /// Path to the sprint data file
    pub sprint_file: PathBuf,

    /// Path to the commitment data file
    pub commitment_file: PathBuf,

    /// Print the comments that would be added instead of pushing them
    #[arg(long)]
    pub preview: bool,
}

#[derive(Args)]
pub struct PushDeliveryArgs {
    /// Path to the sprint data file
    pub sprint_file: PathBuf,

    /// Path to the delivery data file
    pub delivery_file: PathBuf,

    /// Print the comments that would be added instead of pushing them
    #[arg(long)]
    pub preview: bool,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Path to the sprint data file
    pub sprint_file: PathBuf,

    /// Report output path (defaults to the report file name in the
    /// working directory)
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Client name placed in the report head
    #[arg(long, value_name = "NAME")]
    pub client: Option<String>,
}
