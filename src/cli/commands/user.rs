use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{require_section, OutputFormat};
use crate::client::ApiClient;
use crate::models::{search, Role, Section, User, UserDraft};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users visible to the signed-in user")]
    List {
        #[arg(long, help = "Filter by name, email, role or department")]
        search: Option<String>,
    },

    #[command(about = "Create a user")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
        #[arg(long, default_value = "risk_identifier", help = "super_admin, root, risk_owner, risk_manager or risk_identifier")]
        role: Role,
        #[arg(long, help = "Department id (risk_owner and risk_identifier)")]
        department: Option<String>,
        #[arg(long, help = "Organization id (root)")]
        organization: Option<String>,
    },

    #[command(about = "Edit a user's row: name, email, role, department or auditor flag")]
    Update {
        #[arg(help = "User id")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long, help = "Department id")]
        department: Option<String>,
        #[arg(long, help = "Mark the user as an auditor")]
        auditor: Option<bool>,
    },

    #[command(about = "Delete a user")]
    Delete {
        #[arg(help = "User id")]
        id: String,
    },
}

pub async fn handle(cmd: UserCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    require_section(client, Section::Users).await?;

    match cmd {
        UserCommands::List { search: term } => {
            let users = search(client.visible_users().await?, term.as_deref().unwrap_or(""));

            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }

            match output_format {
                OutputFormat::Json => output_collection_json("users", serde_json::to_value(&users)?)?,
                OutputFormat::Text => print_user_table(&users),
            }
            Ok(())
        }

        UserCommands::Create {
            name,
            email,
            password,
            role,
            department,
            organization,
        } => {
            if role.requires_department() && department.is_none() {
                anyhow::bail!("Role '{}' requires --department", role);
            }
            if role.requires_organization() && organization.is_none() {
                anyhow::bail!("Role '{}' requires --organization", role);
            }
            if let Some(department) = &department {
                let known = client.session_departments().await?;
                if !known.iter().any(|d| &d.id == department) {
                    anyhow::bail!("Department '{}' is not part of your organization", department);
                }
            }

            let draft = UserDraft {
                name,
                email,
                password: Some(read_secret(password, "Password")?),
                role,
                department_id: department,
                organization,
            };

            let created = client.create_user(&draft).await?;
            output_success(
                &output_format,
                &format!("User {} created", draft.email.to_lowercase()),
                Some(json!({ "user": created })),
            )
        }

        UserCommands::Update {
            id,
            name,
            email,
            role,
            department,
            auditor,
        } => {
            let mut user = client
                .list_users()
                .await?
                .into_iter()
                .find(|u| u.id == id)
                .ok_or_else(|| anyhow::anyhow!("User '{}' not found", id))?;

            if let Some(v) = name {
                user.name = v;
            }
            if let Some(v) = email {
                user.email = v;
            }
            if let Some(v) = role {
                user.role = v;
            }
            if let Some(v) = department {
                user.department_id = Some(v);
            }
            if let Some(v) = auditor {
                user.is_auditor = v;
            }

            let updated = client.update_user_row(&user).await?;
            output_success(
                &output_format,
                &format!("User '{}' updated", user.email),
                Some(json!({ "user": updated })),
            )
        }

        UserCommands::Delete { id } => {
            client.delete_user(&id).await?;
            output_success(&output_format, &format!("User '{}' deleted", id), Some(json!({ "id": id })))
        }
    }
}

fn print_user_table(users: &[User]) {
    println!(
        "{:<26} {:<20} {:<28} {:<16} {:<16} {}",
        "ID", "NAME", "EMAIL", "ROLE", "DEPARTMENT", "AUDITOR"
    );
    println!("{}", "-".repeat(115));

    for user in users {
        println!(
            "{:<26} {:<20} {:<28} {:<16} {:<16} {}",
            truncate(&user.id, 26),
            truncate(&user.name, 20),
            truncate(&user.email, 28),
            user.role,
            truncate(user.department_label(), 16),
            if user.is_auditor { "yes" } else { "no" }
        );
    }
}
