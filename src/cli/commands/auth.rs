use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::region::RegionSelection;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the backend")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
        #[arg(long, default_value = "US", help = "Region: US, EU, INDIA or AUTO to detect from location")]
        region: RegionSelection,
    },

    #[command(about = "Logout and forget the session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Change the signed-in user's password")]
    ChangePassword {
        #[arg(long, help = "Current password (read from stdin if not provided)")]
        old: Option<String>,
        #[arg(long, help = "New password (read from stdin if not provided)")]
        new: Option<String>,
        #[arg(long, help = "New password again (read from stdin if not provided)")]
        confirm: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password, region } => {
            let password = read_secret(password, "Password")?;
            let outcome = client.login(&email, &password, region).await?;

            let role = outcome.user.as_ref().map(|u| u.role.to_string());
            let region = outcome.region.map(|r| r.to_string());

            output_success(
                &output_format,
                &format!(
                    "Logged in as {} (region {})",
                    email,
                    region.as_deref().unwrap_or("unresolved")
                ),
                Some(json!({
                    "email": email,
                    "role": role,
                    "region": region,
                    "organization": client.session().organization().await,
                })),
            )
        }

        AuthCommands::Logout => {
            client.logout().await;
            output_success(&output_format, "Logged out", None)
        }

        AuthCommands::Status => {
            let ctx = client.session().snapshot().await;
            let claims = ctx.claims();
            let expires_at = claims.as_ref().and_then(|c| c.expires_at());
            let expired = claims.as_ref().map(|c| c.is_expired_at(Utc::now())).unwrap_or(false);
            let role = ctx
                .user
                .as_ref()
                .map(|u| u.role)
                .or_else(|| claims.as_ref().and_then(|c| c.role));

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "authenticated": ctx.is_authenticated(),
                            "expired": expired,
                            "expires_at": expires_at,
                            "role": role,
                            "organization": ctx.organization,
                            "region": ctx.region,
                            "pending_region_selection": ctx.region_selection.map(|s| s.to_string()),
                            "established_at": ctx.established_at,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    if !ctx.is_authenticated() {
                        println!("Not logged in");
                        return Ok(());
                    }
                    println!("Logged in{}", if expired { " (credential expired)" } else { "" });
                    if let Some(role) = role {
                        println!("Role: {}", role);
                    }
                    println!("Organization: {}", ctx.organization.as_deref().unwrap_or("-"));
                    println!(
                        "Region: {}",
                        ctx.region.map(|r| r.as_str()).unwrap_or("unresolved")
                    );
                    if let Some(at) = expires_at {
                        println!("Expires: {}", at.format("%Y-%m-%d %H:%M UTC"));
                    }
                }
            }
            Ok(())
        }

        AuthCommands::Whoami => {
            let Some(user) = client.session().user().await else {
                return output_no_current_item(&output_format, "user");
            };

            let sections: Vec<_> = user.role.sections();
            output_current_item(
                &output_format,
                "user",
                &user.name,
                json!({
                    "id": user.id,
                    "email": user.email,
                    "role": user.role,
                    "organization": user.organization,
                    "department": user.department_name,
                    "sections": sections,
                }),
            )
        }

        AuthCommands::ChangePassword { old, new, confirm } => {
            let old = read_secret(old, "Current password")?;
            let new = read_secret(new, "New password")?;
            let confirm = read_secret(confirm, "Confirm new password")?;

            client.change_password(&old, &new, &confirm).await?;
            output_success(&output_format, "Password changed", None)
        }
    }
}
