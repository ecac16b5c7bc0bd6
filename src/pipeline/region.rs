use std::time::Duration;
use tokio::time::timeout;

use crate::config::GeolocationConfig;
use crate::geolocation::{provider_from_config, GeolocationBox};
use crate::region::{Region, RegionSelection};
use crate::session::SessionHandle;

/// Decides which regional deployment a session talks to.
///
/// Resolution happens once per session: a cached region short-circuits,
/// otherwise the login-time selection is consumed, and only `AUTO` (or no
/// selection) falls through to a bounded geolocation lookup. Every path ends
/// with a region cached on the session.
#[derive(Clone)]
pub struct RegionResolver {
    provider: GeolocationBox,
    timeout: Duration,
}

impl RegionResolver {
    pub fn new(provider: GeolocationBox, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn from_config(config: &GeolocationConfig) -> Self {
        Self::new(provider_from_config(config), config.timeout())
    }

    pub fn provider(&self) -> &GeolocationBox {
        &self.provider
    }

    pub async fn resolve(&self, session: &SessionHandle) -> Region {
        if let Some(region) = session.region().await {
            return region;
        }

        let _gate = session.resolution_gate().await;

        // Another request may have finished resolving while we waited
        if let Some(region) = session.region().await {
            return region;
        }

        let region = match session.take_region_selection().await {
            Some(RegionSelection::Fixed(region)) => {
                tracing::debug!("Using login-time region selection {}", region);
                region
            }
            _ => self.detect().await,
        };

        session.cache_region(region).await;
        tracing::info!("Session region resolved to {}", region);
        region
    }

    /// Classify the current position, falling back when it cannot be found
    pub async fn detect(&self) -> Region {
        if !self.provider.is_available() {
            tracing::debug!("No geolocation capability, using {}", Region::FALLBACK);
            return Region::FALLBACK;
        }

        match timeout(self.timeout, self.provider.current_position()).await {
            Ok(Ok(coords)) => {
                let region = Region::from_coordinates(coords);
                tracing::debug!(
                    "Geolocation '{}' placed client at ({}, {}) -> {}",
                    self.provider.name(),
                    coords.latitude,
                    coords.longitude,
                    region
                );
                region
            }
            Ok(Err(e)) => {
                tracing::warn!("Geolocation failed, using {}: {}", Region::FALLBACK, e);
                Region::FALLBACK
            }
            Err(_) => {
                tracing::warn!(
                    "Geolocation did not answer within {:?}, using {}",
                    self.timeout,
                    Region::FALLBACK
                );
                Region::FALLBACK
            }
        }
    }
}

impl std::fmt::Debug for RegionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionResolver")
            .field("provider", &self.provider.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
