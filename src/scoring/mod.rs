//! Risk scoring: derives impact, score and level from the four rated inputs.
//!
//! Impact is the worst of the confidentiality, integrity and availability
//! ratings. The score multiplies impact by likelihood and is banded into a
//! level, highest band first. Inputs that are missing or not numeric count
//! as 0, which always yields a score of 0 and a `Low` level.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Lowest score that is rated `High`
pub const HIGH_THRESHOLD: i64 = 10;
/// Lowest score that is rated `Medium`
pub const MEDIUM_THRESHOLD: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: i64) -> Self {
        if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("Unknown risk level '{}'", other)),
        }
    }
}

/// The four rated inputs of a risk record, already coerced to integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskInputs {
    pub confidentiality: i64,
    pub integrity: i64,
    pub availability: i64,
    pub likelihood: i64,
}

/// Derived fields of a risk record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub impact: i64,
    pub risk_score: i64,
    pub risk_level: RiskLevel,
}

impl RiskInputs {
    pub fn new(confidentiality: i64, integrity: i64, availability: i64, likelihood: i64) -> Self {
        Self {
            confidentiality,
            integrity,
            availability,
            likelihood,
        }
    }

    /// Build inputs from loosely typed form values
    pub fn from_values(
        confidentiality: &Value,
        integrity: &Value,
        availability: &Value,
        likelihood: &Value,
    ) -> Self {
        Self::new(
            coerce(confidentiality),
            coerce(integrity),
            coerce(availability),
            coerce(likelihood),
        )
    }

    pub fn assess(&self) -> RiskAssessment {
        score(self)
    }
}

pub fn score(inputs: &RiskInputs) -> RiskAssessment {
    let impact = inputs
        .confidentiality
        .max(inputs.integrity)
        .max(inputs.availability);
    let risk_score = impact.saturating_mul(inputs.likelihood);

    RiskAssessment {
        impact,
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
    }
}

/// Coerce a form value to an integer rating. Anything that is not a number
/// or a numeric string becomes 0; fractional values truncate toward zero.
/// Booleans are not ratings, so `true` gives 0 like `false` does.
pub fn coerce(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(truncate))
            .unwrap_or(0),
        Value::String(s) => coerce_str(s),
        _ => 0,
    }
}

pub fn coerce_str(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }

    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(truncate))
        .unwrap_or(0)
}

fn truncate(f: f64) -> i64 {
    if f.is_finite() {
        f.trunc() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assess(c: i64, i: i64, a: i64, l: i64) -> RiskAssessment {
        score(&RiskInputs::new(c, i, a, l))
    }

    #[test]
    fn test_impact_is_worst_dimension() {
        let result = assess(2, 3, 1, 4);
        assert_eq!(result.impact, 3);
        assert_eq!(result.risk_score, 12);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_medium_band_is_inclusive_at_five() {
        let result = assess(1, 1, 1, 5);
        assert_eq!(result.impact, 1);
        assert_eq!(result.risk_score, 5);
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_just_below_medium_is_low() {
        let result = assess(1, 1, 1, 4);
        assert_eq!(result.risk_score, 4);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_high_band_is_inclusive_at_ten() {
        let result = assess(2, 2, 2, 5);
        assert_eq!(result.impact, 2);
        assert_eq!(result.risk_score, 10);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_invalid_inputs_coerce_to_zero() {
        let inputs = RiskInputs::from_values(&json!("abc"), &Value::Null, &json!(2), &json!(3));
        assert_eq!(inputs, RiskInputs::new(0, 0, 2, 3));

        let result = inputs.assess();
        assert_eq!(result.impact, 2);
        assert_eq!(result.risk_score, 6);
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_all_invalid_is_low_zero() {
        let inputs = RiskInputs::from_values(&json!(""), &json!(true), &json!([]), &json!({}));
        let result = inputs.assess();
        assert_eq!(result, RiskAssessment { impact: 0, risk_score: 0, risk_level: RiskLevel::Low });
    }

    #[test]
    fn test_coercion_of_numeric_strings() {
        assert_eq!(coerce(&json!("3")), 3);
        assert_eq!(coerce(&json!(" 2 ")), 2);
        assert_eq!(coerce(&json!("2.9")), 2);
        assert_eq!(coerce(&json!(1.5)), 1);
        assert_eq!(coerce(&json!("NaN")), 0);
        assert_eq!(coerce(&json!("inf")), 0);
    }

    #[test]
    fn test_booleans_are_not_ratings() {
        assert_eq!(coerce(&json!(true)), 0);
        assert_eq!(coerce(&json!(false)), 0);

        let inputs = RiskInputs::from_values(&json!(true), &json!(true), &json!(true), &json!(4));
        assert_eq!(inputs, RiskInputs::new(0, 0, 0, 4));
        assert_eq!(inputs.assess().risk_score, 0);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let inputs = RiskInputs::new(3, 1, 2, 3);
        assert_eq!(score(&inputs), score(&inputs));
    }

    #[test]
    fn test_level_parsing_and_display() {
        assert_eq!("high".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert_eq!(RiskLevel::Medium.to_string(), "Medium");
        assert!("critical".parse::<RiskLevel>().is_err());
    }
}
