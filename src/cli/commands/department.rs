use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{require_section, OutputFormat};
use crate::client::ApiClient;
use crate::models::{search, Section};

#[derive(Subcommand)]
pub enum DepartmentCommands {
    #[command(about = "List departments of the signed-in organization")]
    List {
        #[arg(long, help = "Filter by name")]
        search: Option<String>,
    },

    #[command(about = "Create a department")]
    Create {
        #[arg(help = "Department name")]
        name: String,
    },

    #[command(about = "Rename a department")]
    Update {
        #[arg(help = "Department id")]
        id: String,
        #[arg(help = "New name")]
        name: String,
    },

    #[command(about = "Delete a department")]
    Delete {
        #[arg(help = "Department id")]
        id: String,
    },
}

pub async fn handle(cmd: DepartmentCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    require_section(client, Section::Departments).await?;

    match cmd {
        DepartmentCommands::List { search: term } => {
            let departments = search(client.session_departments().await?, term.as_deref().unwrap_or(""));

            if departments.is_empty() {
                return output_empty_collection(&output_format, "departments", "No departments found");
            }

            match output_format {
                OutputFormat::Json => output_collection_json("departments", serde_json::to_value(&departments)?)?,
                OutputFormat::Text => {
                    println!("{:<26} {}", "ID", "NAME");
                    println!("{}", "-".repeat(60));
                    for department in &departments {
                        println!("{:<26} {}", department.id, department.name);
                    }
                }
            }
            Ok(())
        }

        DepartmentCommands::Create { name } => {
            let created = client.create_department(&name).await?;
            output_success(
                &output_format,
                &format!("Department '{}' created", name.trim()),
                Some(json!({ "department": created })),
            )
        }

        DepartmentCommands::Update { id, name } => {
            let updated = client.update_department(&id, &name).await?;
            output_success(
                &output_format,
                &format!("Department '{}' renamed to '{}'", id, name.trim()),
                Some(json!({ "department": updated })),
            )
        }

        DepartmentCommands::Delete { id } => {
            client.delete_department(&id).await?;
            output_success(&output_format, &format!("Department '{}' deleted", id), Some(json!({ "id": id })))
        }
    }
}
