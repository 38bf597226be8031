//! Form field collection helpers shared by the entity services.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ServiceError;

/// A numeric form field. Accepts a JSON number or a numeric string, the way
/// form inputs arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// Parsed value; anything unparseable or non-finite collapses to `0`.
    pub fn value_or_zero(&self) -> f64 {
        let value = match self {
            NumberInput::Number(value) => *value,
            NumberInput::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    /// Whole-number view for count fields such as the number of units.
    pub fn count_or_zero(&self) -> u32 {
        let value = self.value_or_zero();
        if value <= 0.0 {
            0
        } else {
            value.trunc().min(u32::MAX as f64) as u32
        }
    }
}

impl From<f64> for NumberInput {
    fn from(value: f64) -> Self {
        NumberInput::Number(value)
    }
}

impl From<&str> for NumberInput {
    fn from(value: &str) -> Self {
        NumberInput::Text(value.to_string())
    }
}

pub fn required_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trims and drops empty strings.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn monthly_from_annual(annual: f64) -> f64 {
    round2(annual / 12.0)
}

/// Whole percentage of `part` in `whole`; `0` when `whole` is zero.
pub fn percent(part: f64, whole: f64) -> u32 {
    if whole <= 0.0 {
        return 0;
    }
    ((part / whole) * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Case-insensitive substring match of `query` against any candidate.
/// An absent or blank query matches everything.
pub fn matches_query(query: Option<&str>, candidates: &[&str]) -> bool {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return true;
    };
    let needle = query.to_lowercase();
    candidates
        .iter()
        .any(|candidate| candidate.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_parse() {
        assert_eq!(NumberInput::from("15000").value_or_zero(), 15000.0);
        assert_eq!(NumberInput::from(" 2.5 ").value_or_zero(), 2.5);
        assert_eq!(NumberInput::from(42.0).value_or_zero(), 42.0);
    }

    #[test]
    fn invalid_numbers_fall_back_to_zero() {
        assert_eq!(NumberInput::from("abc").value_or_zero(), 0.0);
        assert_eq!(NumberInput::from("").value_or_zero(), 0.0);
        assert_eq!(NumberInput::from("NaN").value_or_zero(), 0.0);
        assert_eq!(NumberInput::from("inf").value_or_zero(), 0.0);
    }

    #[test]
    fn counts_truncate_and_floor_at_zero() {
        assert_eq!(NumberInput::from("12").count_or_zero(), 12);
        assert_eq!(NumberInput::from("3.9").count_or_zero(), 3);
        assert_eq!(NumberInput::from("-4").count_or_zero(), 0);
    }

    #[test]
    fn deserializes_number_or_string() {
        let n: NumberInput = serde_json::from_str("1800000").unwrap();
        let s: NumberInput = serde_json::from_str("\"1800000\"").unwrap();
        assert_eq!(n.value_or_zero(), s.value_or_zero());
    }

    #[test]
    fn monthly_rent_is_annual_over_twelve() {
        assert_eq!(monthly_from_annual(2_400_000.0), 200_000.0);
        assert_eq!(monthly_from_annual(1000.0), 83.33);
    }

    #[test]
    fn required_text_rejects_blank() {
        assert!(required_text("name", "   ").is_err());
        assert_eq!(required_text("name", " Ikoyi ").unwrap(), "Ikoyi");
    }

    #[test]
    fn query_matching() {
        assert!(matches_query(None, &["anything"]));
        assert!(matches_query(Some("  "), &["anything"]));
        assert!(matches_query(Some("lekki"), &["Lekki Gardens", "Lagos"]));
        assert!(!matches_query(Some("abuja"), &["Lekki Gardens", "Lagos"]));
    }

    #[test]
    fn percent_handles_empty_whole() {
        assert_eq!(percent(3.0, 0.0), 0);
        assert_eq!(percent(2.0, 3.0), 67);
        assert_eq!(percent(5.0, 4.0), 100);
    }
}
