use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{GeolocationError, GeolocationProvider};
use crate::region::Coordinates;

/// Platform without any geolocation capability
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Position supplied by the operator
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition {
    coords: Coordinates,
}

impl FixedPosition {
    pub fn new(coords: Coordinates) -> Self {
        Self { coords }
    }
}

#[async_trait]
impl GeolocationProvider for FixedPosition {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.coords)
    }
}

/// Response body of an IP geolocation service.
/// Accepts both `latitude`/`longitude` and `lat`/`lon` spellings.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(alias = "lat")]
    latitude: Option<f64>,
    #[serde(alias = "lon")]
    longitude: Option<f64>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    reason: Option<String>,
}

/// Approximate position from the public IP address, via an HTTP lookup
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    client: reqwest::Client,
    url: Url,
}

impl IpGeolocation {
    pub fn new(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: Url::parse(url)?,
        })
    }

    pub fn with_client(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl GeolocationProvider for IpGeolocation {
    fn name(&self) -> &'static str {
        "ip"
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GeolocationError::Denied(format!("lookup service returned {}", status)));
        }
        if !status.is_success() {
            return Err(GeolocationError::Unavailable(format!("lookup service returned {}", status)));
        }

        let body: LookupResponse = response.json().await?;

        // Some services report failures with a 200 and an error flag
        let flagged = body.error.as_ref().map_or(false, |e| match e {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Null => false,
            _ => true,
        });
        if flagged {
            return Err(GeolocationError::Unavailable(
                body.reason.unwrap_or_else(|| "lookup service reported an error".to_string()),
            ));
        }

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
            _ => Err(GeolocationError::Unavailable(
                "lookup response carried no coordinates".to_string(),
            )),
        }
    }
}
