/// Region codes used to route requests to a regional backend deployment

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed set of backend deployments a request can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "INDIA")]
    India,
}

impl Region {
    /// Region used whenever detection is impossible or inconclusive
    pub const FALLBACK: Region = Region::Us;

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Eu => "EU",
            Region::India => "INDIA",
        }
    }

    /// Classify a coordinate pair using fixed bounding boxes.
    ///
    /// Boxes are checked in precedence order and the first match wins, so the
    /// strip where the India and EU boxes overlap in latitude resolves by
    /// longitude alone. Bounds are inclusive. Anything else, including
    /// non-finite input, lands in the fallback region.
    pub fn from_coordinates(coords: Coordinates) -> Region {
        let Coordinates { latitude, longitude } = coords;

        if (8.0..=37.0).contains(&latitude) && (68.0..=97.0).contains(&longitude) {
            Region::India
        } else if (35.0..=70.0).contains(&latitude) && (-10.0..=40.0).contains(&longitude) {
            Region::Eu
        } else {
            Region::FALLBACK
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown region '{0}' (expected US, EU, INDIA or AUTO)")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Region::Us),
            "EU" => Ok(Region::Eu),
            "INDIA" => Ok(Region::India),
            _ => Err(UnknownRegion(s.to_string())),
        }
    }
}

/// Login-time region choice. `Auto` defers to geolocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionSelection {
    Fixed(Region),
    #[default]
    Auto,
}

impl RegionSelection {
    /// The explicit region, if the selection is not the auto-detect sentinel
    pub fn explicit(&self) -> Option<Region> {
        match self {
            RegionSelection::Fixed(region) => Some(*region),
            RegionSelection::Auto => None,
        }
    }
}

impl FromStr for RegionSelection {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("AUTO") {
            return Ok(RegionSelection::Auto);
        }
        s.parse().map(RegionSelection::Fixed)
    }
}

impl fmt::Display for RegionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionSelection::Fixed(region) => region.fmt(f),
            RegionSelection::Auto => f.write_str("AUTO"),
        }
    }
}

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}
