use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{require_section, OutputFormat};
use crate::client::ApiClient;
use crate::models::Section;

#[derive(Subcommand)]
pub enum OrganizationCommands {
    #[command(about = "List organizations")]
    List,

    #[command(about = "Create an organization")]
    Create {
        #[arg(help = "Organization name")]
        name: String,
    },

    #[command(about = "Delete an organization")]
    Delete {
        #[arg(help = "Organization id")]
        id: String,
    },
}

pub async fn handle(cmd: OrganizationCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    require_section(client, Section::Organizations).await?;

    match cmd {
        OrganizationCommands::List => {
            let organizations = client.list_organizations().await?;

            if organizations.is_empty() {
                return output_empty_collection(&output_format, "organizations", "No organizations found");
            }

            match output_format {
                OutputFormat::Json => output_collection_json("organizations", serde_json::to_value(&organizations)?)?,
                OutputFormat::Text => {
                    println!("{:<26} {}", "ID", "NAME");
                    println!("{}", "-".repeat(60));
                    for organization in &organizations {
                        println!("{:<26} {}", organization.id, organization.name);
                    }
                }
            }
            Ok(())
        }

        OrganizationCommands::Create { name } => {
            let created = client.create_organization(&name).await?;
            output_success(
                &output_format,
                &format!("Organization '{}' created", name.trim()),
                Some(json!({ "organization": created })),
            )
        }

        OrganizationCommands::Delete { id } => {
            client.delete_organization(&id).await?;
            output_success(&output_format, &format!("Organization '{}' deleted", id), Some(json!({ "id": id })))
        }
    }
}
