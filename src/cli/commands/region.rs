use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::config::config;
use crate::pipeline::RegionResolver;
use crate::region::{Coordinates, Region};

#[derive(Subcommand)]
pub enum RegionCommands {
    #[command(about = "Show the cached session region and any pending selection")]
    Show,

    #[command(about = "Resolve the session region now")]
    Resolve {
        #[arg(long, help = "Forget the cached region and resolve again")]
        refresh: bool,
    },

    #[command(about = "Classify a position into a region")]
    Classify {
        #[arg(allow_negative_numbers = true, help = "Latitude in decimal degrees")]
        latitude: f64,
        #[arg(allow_negative_numbers = true, help = "Longitude in decimal degrees")]
        longitude: f64,
    },
}

pub async fn handle(cmd: RegionCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RegionCommands::Show => {
            let ctx = client.session().snapshot().await;
            match ctx.region {
                Some(region) => output_current_item(
                    &output_format,
                    "region",
                    region.as_str(),
                    json!({
                        "region": region,
                        "pending_selection": ctx.region_selection.map(|s| s.to_string()),
                    }),
                ),
                None => output_no_current_item(&output_format, "region"),
            }
        }

        RegionCommands::Resolve { refresh } => {
            if refresh {
                client.session().forget_region().await;
            }

            let resolver = RegionResolver::from_config(&config().geolocation);
            let region = resolver.resolve(client.session()).await;

            output_success(
                &output_format,
                &format!("Session region is {} (geolocation: {})", region, resolver.provider().name()),
                Some(json!({ "region": region })),
            )
        }

        RegionCommands::Classify { latitude, longitude } => {
            let region = Region::from_coordinates(Coordinates::new(latitude, longitude));
            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "latitude": latitude,
                            "longitude": longitude,
                            "region": region,
                        }))?
                    );
                }
                OutputFormat::Text => println!("{}", region),
            }
            Ok(())
        }
    }
}
