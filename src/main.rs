mod aggregate;
mod capacity;
mod classify;
mod cli;
mod client;
mod commands;
mod config;
mod data;
mod error;
mod output;
mod period;
mod report;
mod requests;
mod types;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use crate::cli::{Cli, Commands};
use crate::client::JiraClient;
use crate::config::Config;
use crate::error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    init_tracing(verbose);
    output::set_json_output(cli.json_output);

    if let Err(error) = run(cli).await {
        eprintln!("Error: {error}");
        if verbose {
            let mut source = std::error::Error::source(&error);
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }
        std::process::exit(error.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Completions need neither configuration nor a client
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "cjm", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::from_cli(&cli)?;

    // Commands working purely on local data files
    match &cli.command {
        Commands::PrintSprint { sprint_file } => {
            return commands::sprints::print_file(sprint_file);
        }
        Commands::PrintCapacity { sprint_file } => {
            return commands::capacity::print(&config, sprint_file);
        }
        Commands::CreateCapacityFile {
            sprint_file,
            team_file,
        } => {
            return commands::capacity::create_file(&config, sprint_file, team_file);
        }
        Commands::CreateTasksFile => return commands::tasks::create_file(&config),
        Commands::ImportTasksFile { tasks_file } => {
            return commands::tasks::import_file(&config, tasks_file);
        }
        _ => {}
    }

    let client = JiraClient::new(&config)?;

    match cli.command {
        Commands::ListBoards { project_key, all } => {
            commands::boards::list(&client, &config, project_key.as_deref(), all).await
        }
        Commands::ListProjects => commands::projects::list(&client).await,
        Commands::ListSprints { board } => commands::sprints::list(&client, &config, board).await,
        Commands::ListSprintIssues { sprint } => {
            commands::sprints::list_issues(&client, &config, sprint).await
        }
        Commands::CreateSprintFile(args) => {
            commands::sprints::create_file(&client, &config, args).await
        }
        Commands::CreateTeamFile { project_key } => {
            commands::team::create_file(&client, &config, project_key.as_deref()).await
        }
        Commands::CreateCommitmentFile(args) => {
            commands::commitment::create_file(&client, &config, args).await
        }
        Commands::CreateDeliveryFile(args) => {
            commands::delivery::create_file(&client, &config, args).await
        }
        Commands::PushCommitmentComments(args) => {
            commands::comments::push_commitment(&client, &config, args).await
        }
        Commands::PushDeliveryComments(args) => {
            commands::comments::push_delivery(&client, &config, args).await
        }
        Commands::GenerateCommitmentReport(args) => {
            commands::report::commitment(&client, &config, args).await
        }
        Commands::GenerateDeliveryReport(args) => {
            commands::report::delivery(&client, &config, args).await
        }
        Commands::GenerateCapacityReport(args) => {
            commands::report::capacity(&client, &config, args).await
        }
        // Handled before the client was built
        _ => Ok(()),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cjm=debug")
    } else {
        EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
