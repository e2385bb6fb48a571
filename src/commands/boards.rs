use serde::Serialize;
use tabled::Tabled;

use crate::client::JiraClient;
use crate::config::Config;
use crate::error::Result;
use crate::output;
use crate::requests;

#[derive(Serialize, Clone)]
struct BoardListing {
    id: i64,
    name: String,
}

#[derive(Tabled)]
struct BoardRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn list(
    client: &JiraClient,
    config: &Config,
    project_key: Option<&str>,
    all: bool,
) -> Result<()> {
    let key = config.project_key(project_key).ok();

    let boards = requests::boards(client).await?;

    let listings: Vec<BoardListing> = boards
        .into_iter()
        .filter(|board| all || key.is_none() || board.project_key() == key.as_deref())
        .map(|board| BoardListing {
            id: board.id,
            name: board.name,
        })
        .collect();

    output::print_table(&listings, |b| BoardRow {
        id: b.id,
        name: b.name.clone(),
    });

    Ok(())
}
