use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::session::SessionContext;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Switch to a backend (signs out of the previous one)")]
    Use {
        #[arg(help = "Backend base URL, e.g. https://risk.example.com/api")]
        url: String,
    },

    #[command(about = "Show the selected backend")]
    Current,

    #[command(about = "Check that a backend answers (defaults to the selected one)")]
    Ping {
        #[arg(help = "Backend base URL")]
        url: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Use { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;

            let mut config = load_console_config()?;
            let changed = config.current_server.as_ref().map(|s| s.url.as_str()) != Some(parsed.as_str());

            if changed {
                config.current_server = Some(ServerInfo::new(parsed.to_string()));
                save_console_config(&config)?;
                // Credentials belong to the previous backend
                save_session(&SessionContext::default())?;
            }

            output_success(
                &output_format,
                &format!("Switched to server {}", parsed),
                Some(json!({ "current_server": parsed.as_str() })),
            )
        }

        ServerCommands::Current => {
            let config = load_console_config()?;
            match config.current_server {
                Some(server) => output_current_item(
                    &output_format,
                    "server",
                    &server.url,
                    json!({
                        "url": server.url,
                        "added_at": server.added_at,
                        "last_ping": server.last_ping,
                        "status": server.status,
                    }),
                ),
                None => output_no_current_item(&output_format, "server"),
            }
        }

        ServerCommands::Ping { url } => {
            let mut config = load_console_config()?;
            let target = match (url, &config.current_server) {
                (Some(url), _) => url,
                (None, Some(server)) => server.url.clone(),
                (None, None) => crate::config::config().api.base_url.clone(),
            };

            let status = ping_server(&target).await;

            if let Some(server) = config.current_server.as_mut().filter(|s| s.url == target) {
                server.update_ping(status);
                save_console_config(&config)?;
            }

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ "url": target, "status": status }))?
                    );
                }
                OutputFormat::Text => println!("{} is {}", target, status),
            }

            if status == ServerStatus::Down {
                anyhow::bail!("Server {} did not answer", target);
            }
            Ok(())
        }
    }
}
