use tabled::Tabled;

use crate::client::JiraClient;
use crate::error::Result;
use crate::output;
use crate::requests;

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn list(client: &JiraClient) -> Result<()> {
    let projects = requests::projects(client).await?;

    output::print_table(&projects, |p| ProjectRow {
        id: p.id.clone(),
        key: p.key.clone(),
        name: p.name.clone(),
    });

    Ok(())
}
