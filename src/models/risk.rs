use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::{lenient_rating, null_as_default};
use crate::scoring::{score, RiskAssessment, RiskInputs};

/// A risk record as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_level: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub risk_score: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub asset: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub asset_type: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub confidentiality: i64,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub integrity: i64,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub availability: i64,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub impact: i64,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub likelihood: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub existing_controls: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_controls: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_date: Option<String>,
}

impl Risk {
    /// Deadline as a calendar date; the backend may send a full timestamp
    pub fn deadline(&self) -> Option<NaiveDate> {
        let raw = self.deadline_date.as_deref()?;
        let date_part = raw.split('T').next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

macro_rules! form_choice {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| format!(
                        "Unknown {} '{}' (expected one of: {})",
                        stringify!($name),
                        s,
                        $name::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
                    ))
            }
        }
    };
}

form_choice!(
    RiskType { Strategic => "Strategic", Operational => "Operational", Tactical => "Tactical" }
    default Strategic
);

form_choice!(
    AssetType {
        Public => "Public",
        Private => "Private",
        Protected => "Protected",
        Confidential => "Confidential",
    }
    default Private
);

form_choice!(
    RiskStatus { Open => "Open", Wip => "WIP", Closed => "Closed" }
    default Open
);

/// Rated inputs of the risk form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskField {
    Confidentiality,
    Integrity,
    Availability,
    Likelihood,
}

/// The create/edit risk form.
///
/// Impact, score and level are private and only ever written by
/// recomputation from the four rated inputs.
#[derive(Debug, Clone)]
pub struct RiskDraft {
    pub risk_id: String,
    pub risk_description: String,
    pub department: String,
    pub risk_type: RiskType,
    pub asset: String,
    pub asset_type: AssetType,
    pub existing_controls: String,
    pub additional_controls: String,
    pub additional_notes: String,
    pub status: RiskStatus,
    pub deadline_date: Option<NaiveDate>,
    inputs: RiskInputs,
    assessment: RiskAssessment,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RiskPayload<'a> {
    risk_id: &'a str,
    risk_description: &'a str,
    department: &'a str,
    risk_type: RiskType,
    risk_level: String,
    risk_score: i64,
    asset: &'a str,
    asset_type: AssetType,
    confidentiality: i64,
    integrity: i64,
    availability: i64,
    impact: i64,
    likelihood: i64,
    existing_controls: &'a str,
    additional_controls: &'a str,
    additional_notes: &'a str,
    status: RiskStatus,
    deadline_date: String,
}

impl Default for RiskDraft {
    fn default() -> Self {
        let inputs = RiskInputs::new(1, 1, 1, 1);
        Self {
            risk_id: String::new(),
            risk_description: String::new(),
            department: String::new(),
            risk_type: RiskType::default(),
            asset: String::new(),
            asset_type: AssetType::default(),
            existing_controls: String::new(),
            additional_controls: String::new(),
            additional_notes: String::new(),
            status: RiskStatus::default(),
            deadline_date: None,
            inputs,
            assessment: score(&inputs),
        }
    }
}

impl RiskDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the form from an existing record. Unset ratings start at 1 and
    /// unknown categorical values fall back to the form defaults.
    pub fn from_risk(risk: &Risk) -> Self {
        let or_one = |v: i64| if v == 0 { 1 } else { v };
        let inputs = RiskInputs::new(
            or_one(risk.confidentiality),
            or_one(risk.integrity),
            or_one(risk.availability),
            or_one(risk.likelihood),
        );

        Self {
            risk_id: risk.risk_id.clone(),
            risk_description: risk.risk_description.clone(),
            department: risk.department.clone(),
            risk_type: risk.risk_type.parse().unwrap_or_default(),
            asset: risk.asset.clone(),
            asset_type: risk.asset_type.parse().unwrap_or_default(),
            existing_controls: risk.existing_controls.clone(),
            additional_controls: risk.additional_controls.clone(),
            additional_notes: risk.additional_notes.clone(),
            status: risk.status.parse().unwrap_or_default(),
            deadline_date: risk.deadline(),
            inputs,
            assessment: score(&inputs),
        }
    }

    /// Set one rated input from a raw form value and recompute derived fields
    pub fn set(&mut self, field: RiskField, raw: impl Into<Value>) -> RiskAssessment {
        let value = crate::scoring::coerce(&raw.into());
        match field {
            RiskField::Confidentiality => self.inputs.confidentiality = value,
            RiskField::Integrity => self.inputs.integrity = value,
            RiskField::Availability => self.inputs.availability = value,
            RiskField::Likelihood => self.inputs.likelihood = value,
        }
        self.recompute()
    }

    pub fn inputs(&self) -> RiskInputs {
        self.inputs
    }

    pub fn assessment(&self) -> RiskAssessment {
        self.assessment
    }

    fn recompute(&mut self) -> RiskAssessment {
        self.assessment = score(&self.inputs);
        self.assessment
    }

    /// Request body for submission. Derived fields are recomputed first.
    pub fn payload(&mut self) -> Value {
        let assessment = self.recompute();
        let payload = RiskPayload {
            risk_id: &self.risk_id,
            risk_description: &self.risk_description,
            department: &self.department,
            risk_type: self.risk_type,
            risk_level: assessment.risk_level.to_string(),
            risk_score: assessment.risk_score,
            asset: &self.asset,
            asset_type: self.asset_type,
            confidentiality: self.inputs.confidentiality,
            integrity: self.inputs.integrity,
            availability: self.inputs.availability,
            impact: assessment.impact,
            likelihood: self.inputs.likelihood,
            existing_controls: &self.existing_controls,
            additional_controls: &self.additional_controls,
            additional_notes: &self.additional_notes,
            status: self.status,
            deadline_date: self
                .deadline_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        };

        serde_json::to_value(payload).unwrap_or(Value::Null)
    }

    /// Required fields of the form
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.risk_id.trim().is_empty() {
            missing.push("riskId");
        }
        if self.risk_description.trim().is_empty() {
            missing.push("riskDescription");
        }
        if self.department.trim().is_empty() {
            missing.push("department");
        }
        missing
    }
}
