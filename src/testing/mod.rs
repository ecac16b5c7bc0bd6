use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::geolocation::{GeolocationError, GeolocationProvider};
use crate::region::Coordinates;

#[derive(Debug, Clone)]
enum Script {
    Position(Coordinates),
    Fail,
    Hang,
}

/// Geolocation provider with a scripted outcome that counts its lookups
#[derive(Debug, Clone)]
pub struct ScriptedGeolocation {
    script: Script,
    available: bool,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGeolocation {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            available: true,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::with_script(Script::Position(Coordinates::new(latitude, longitude)))
    }

    /// Lookup that reports a denial
    pub fn failing() -> Self {
        Self::with_script(Script::Fail)
    }

    /// Lookup that never resolves
    pub fn hanging() -> Self {
        Self::with_script(Script::Hang)
    }

    /// Platform without capability
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::with_script(Script::Fail)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of lookups started, shared across clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeolocationProvider for ScriptedGeolocation {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Position(coords) => Ok(*coords),
            Script::Fail => Err(GeolocationError::Denied("user declined".to_string())),
            Script::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_call_counter() {
        let geo = ScriptedGeolocation::at(1.0, 2.0);
        let clone = geo.clone();
        clone.current_position().await.unwrap();
        assert_eq!(geo.calls(), 1);
    }
}
