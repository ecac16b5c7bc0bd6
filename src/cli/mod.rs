pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::Section;
use crate::session::SessionHandle;

#[derive(Parser)]
#[command(name = "riskctl")]
#[command(about = "Risk console CLI - manage risks, users and organizations on a regional backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Backend base URL (overrides the selected server)")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and inspect the session")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Inspect and resolve the session region")]
    Region {
        #[command(subcommand)]
        cmd: commands::region::RegionCommands,
    },

    #[command(about = "Risk register operations")]
    Risk {
        #[command(subcommand)]
        cmd: commands::risk::RiskCommands,
    },

    #[command(about = "User management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Department management")]
    Department {
        #[command(subcommand)]
        cmd: commands::department::DepartmentCommands,
    },

    #[command(about = "Organization management")]
    Organization {
        #[command(subcommand)]
        cmd: commands::organization::OrganizationCommands,
    },

    #[command(about = "Backend server selection")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let result = match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, output_format.clone()).await,
        command => {
            let client = connect(cli.base_url.as_deref())?;
            let result = dispatch(command, &client, output_format.clone()).await;
            let saved = config::save_session(&client.session().snapshot().await);
            command_outcome(result, saved)
        }
    };

    if let (Err(e), OutputFormat::Json) = (&result, &output_format) {
        let code = e.downcast_ref::<ClientError>().map(ClientError::error_code);
        utils::output_error(&output_format, &e.to_string(), code)?;
    }

    result
}

/// A failed command outranks a failed session save; the save failure is
/// only logged in that case.
fn command_outcome(result: anyhow::Result<()>, saved: anyhow::Result<()>) -> anyhow::Result<()> {
    match (result, saved) {
        (Err(e), Err(save_error)) => {
            tracing::warn!("Failed to save session: {}", save_error);
            Err(e)
        }
        (result, saved) => result.and(saved),
    }
}

async fn dispatch(command: Commands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, client, output_format).await,
        Commands::Region { cmd } => commands::region::handle(cmd, client, output_format).await,
        Commands::Risk { cmd } => commands::risk::handle(cmd, client, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, client, output_format).await,
        Commands::Department { cmd } => commands::department::handle(cmd, client, output_format).await,
        Commands::Organization { cmd } => commands::organization::handle(cmd, client, output_format).await,
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
    }
}

/// Build a client against the chosen backend, carrying the persisted session.
///
/// The base URL comes from `--base-url`, then the selected server, then the
/// environment configuration.
pub fn connect(base_url: Option<&str>) -> anyhow::Result<ApiClient> {
    let mut app_config = crate::config::config().clone();

    if let Some(url) = base_url {
        app_config.api.base_url = url.to_string();
    } else if let Some(server) = config::load_console_config()?.current_server {
        app_config.api.base_url = server.url;
    }

    let session = SessionHandle::new(config::load_session()?);
    tracing::debug!("Using backend {}", app_config.api.base_url);

    Ok(ApiClient::from_config(&app_config, session)?)
}

/// Refuse commands for console sections the signed-in role cannot reach
pub async fn require_section(client: &ApiClient, section: Section) -> anyhow::Result<()> {
    if let Some(user) = client.session().user().await {
        if !user.role.can_access(section) {
            anyhow::bail!("Role '{}' cannot access {:?}", user.role, section);
        }
    }
    Ok(())
}
