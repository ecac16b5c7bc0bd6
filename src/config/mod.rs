use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub geolocation: GeolocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    pub enabled: bool,
    pub lookup_url: Option<String>,
    pub timeout_ms: u64,
    /// Operator-supplied position; takes precedence over the HTTP lookup
    pub fixed_latitude: Option<f64>,
    pub fixed_longitude: Option<f64>,
}

impl GeolocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        match (self.fixed_latitude, self.fixed_longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("RISK_API_BASE_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("RISK_API_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("RISK_API_USER_AGENT") {
            self.api.user_agent = v;
        }

        // Geolocation overrides
        if let Ok(v) = env::var("GEOLOCATION_ENABLED") {
            self.geolocation.enabled = v.parse().unwrap_or(self.geolocation.enabled);
        }
        if let Ok(v) = env::var("GEOLOCATION_URL") {
            self.geolocation.lookup_url = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("GEOLOCATION_TIMEOUT_MS") {
            self.geolocation.timeout_ms = v.parse().unwrap_or(self.geolocation.timeout_ms);
        }
        if let Ok(v) = env::var("GEOLOCATION_LATITUDE") {
            self.geolocation.fixed_latitude = v.parse().ok();
        }
        if let Ok(v) = env::var("GEOLOCATION_LONGITUDE") {
            self.geolocation.fixed_longitude = v.parse().ok();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                request_timeout_secs: 30,
                user_agent: concat!("riskctl/", env!("CARGO_PKG_VERSION")).to_string(),
            },
            geolocation: GeolocationConfig {
                enabled: true,
                lookup_url: None,
                timeout_ms: 5_000,
                fixed_latitude: None,
                fixed_longitude: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api".to_string(),
                request_timeout_secs: 15,
                user_agent: concat!("riskctl/", env!("CARGO_PKG_VERSION")).to_string(),
            },
            geolocation: GeolocationConfig {
                enabled: true,
                lookup_url: Some("https://ipapi.co/json/".to_string()),
                timeout_ms: 5_000,
                fixed_latitude: None,
                fixed_longitude: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.example.com/api".to_string(),
                request_timeout_secs: 10,
                user_agent: concat!("riskctl/", env!("CARGO_PKG_VERSION")).to_string(),
            },
            geolocation: GeolocationConfig {
                enabled: true,
                lookup_url: Some("https://ipapi.co/json/".to_string()),
                timeout_ms: 3_000,
                fixed_latitude: None,
                fixed_longitude: None,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.api.base_url.starts_with("http://localhost"));
        assert!(config.geolocation.enabled);
        assert!(config.geolocation.lookup_url.is_none());
        assert_eq!(config.geolocation.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.api.base_url.starts_with("https://"));
        assert!(config.geolocation.lookup_url.is_some());
        assert!(config.geolocation.timeout_ms < 5_000);
    }

    #[test]
    fn test_fixed_position_requires_both_coordinates() {
        let mut config = AppConfig::development();
        config.geolocation.fixed_latitude = Some(48.8);
        assert_eq!(config.geolocation.fixed_position(), None);

        config.geolocation.fixed_longitude = Some(2.3);
        assert_eq!(config.geolocation.fixed_position(), Some((48.8, 2.3)));
    }
}
