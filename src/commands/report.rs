use std::path::PathBuf;

use crate::cli::ReportArgs;
use crate::client::JiraClient;
use crate::config::Config;
use crate::data;
use crate::error::Result;
use crate::output;
use crate::period;
use crate::report::{self, CapacityBreaks, ReportHead};
use crate::requests;
use crate::types::{CapacityFile, CommitmentFile, DeliveryFile, SprintFile};

pub async fn commitment(client: &JiraClient, config: &Config, args: ReportArgs) -> Result<()> {
    let sprint: SprintFile = data::load_json(&args.sprint_file)?;
    let capacity: CapacityFile =
        data::load_json(&data::data_file_path(config, &sprint, "capacity"))?;
    let commitment: CommitmentFile =
        data::load_json(&data::data_file_path(config, &sprint, "commitment"))?;

    let head = report_head(client, config, &args, &sprint).await?;
    let markdown = report::commitment_markdown(client, &head, &sprint, &capacity, &commitment);

    write_report(args.output, "commitment_report.md", &markdown)
}

pub async fn delivery(client: &JiraClient, config: &Config, args: ReportArgs) -> Result<()> {
    let sprint: SprintFile = data::load_json(&args.sprint_file)?;
    let capacity: CapacityFile =
        data::load_json(&data::data_file_path(config, &sprint, "capacity"))?;
    let commitment: CommitmentFile =
        data::load_json(&data::data_file_path(config, &sprint, "commitment"))?;
    let delivery: DeliveryFile =
        data::load_json(&data::data_file_path(config, &sprint, "delivery"))?;

    let head = report_head(client, config, &args, &sprint).await?;
    let markdown =
        report::delivery_markdown(client, &head, &sprint, &capacity, &commitment, &delivery);

    write_report(args.output, "delivery_report.md", &markdown)
}

pub async fn capacity(client: &JiraClient, config: &Config, args: ReportArgs) -> Result<()> {
    let sprint: SprintFile = data::load_json(&args.sprint_file)?;
    let capacity: CapacityFile =
        data::load_json(&data::data_file_path(config, &sprint, "capacity"))?;

    let breaks = config.page_breaks();
    let head = report_head(client, config, &args, &sprint).await?;
    let markdown = report::capacity_markdown(
        &head,
        &sprint,
        &capacity,
        CapacityBreaks {
            absence_section: breaks.absence_section,
            weekly_table: breaks.weekly_table,
        },
    );

    write_report(args.output, "capacity_report.md", &markdown)
}

async fn report_head(
    client: &JiraClient,
    config: &Config,
    args: &ReportArgs,
    sprint: &SprintFile,
) -> Result<ReportHead> {
    Ok(ReportHead {
        client_name: config.client_name(args.client.as_deref()).unwrap_or_default(),
        author: requests::user_full_name(client, config.user()?).await?,
        date: chrono::Local::now().date_naive(),
        period: period::period_name(
            sprint.start_date,
            sprint.end_date,
            config.week_system(),
            config.period_offset(),
        ),
    })
}

fn write_report(output: Option<PathBuf>, default_name: &str, markdown: &str) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(default_name));
    report::save(&path, markdown)?;
    output::print_message(&format!("Report saved to: {}", path.display()));
    Ok(())
}
