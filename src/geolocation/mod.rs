pub mod providers;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::GeolocationConfig;
use crate::region::Coordinates;

pub use providers::{FixedPosition, IpGeolocation, NoGeolocation};

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported on this platform")]
    Unsupported,

    #[error("Geolocation permission denied: {0}")]
    Denied(String),

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Geolocation lookup failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One-shot source of the client's current position.
///
/// A lookup resolves exactly once, either with coordinates or with an error.
/// Callers are expected to bound the lookup with their own timeout.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Whether the platform has any geolocation capability at all
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

pub type GeolocationBox = Arc<dyn GeolocationProvider>;

/// Pick the provider described by configuration.
///
/// A fixed position wins over an HTTP lookup; with neither, or with
/// geolocation disabled, the platform is treated as having no capability.
pub fn provider_from_config(config: &GeolocationConfig) -> GeolocationBox {
    if !config.enabled {
        return Arc::new(NoGeolocation);
    }

    if let Some((lat, lon)) = config.fixed_position() {
        return Arc::new(FixedPosition::new(Coordinates::new(lat, lon)));
    }

    match config.lookup_url.as_deref() {
        Some(url) => match IpGeolocation::new(url) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                tracing::warn!("Ignoring geolocation lookup URL '{}': {}", url, e);
                Arc::new(NoGeolocation)
            }
        },
        None => Arc::new(NoGeolocation),
    }
}
