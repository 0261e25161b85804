use crate::error::{InsightsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::thresholds::LB_TO_KG;

/// Mass unit a weight was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    /// Pounds. The logging form defaults to this unit.
    #[default]
    Lb,
}

impl FromStr for WeightUnit {
    type Err = InsightsError;

    /// Case-insensitive; accepts the common long spellings too.
    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lb),
            other => Err(InsightsError::InvalidUnit(other.to_string())),
        }
    }
}

impl WeightUnit {
    /// The canonical lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert `value` expressed in `unit` to kilograms.
pub fn to_kg(value: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => value,
        WeightUnit::Lb => value * LB_TO_KG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units_case_insensitive() {
        assert_eq!("KG".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert_eq!("lbs".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
        assert_eq!(" Pounds ".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
    }

    #[test]
    fn test_parse_unknown_unit_is_error() {
        let err = "stone".parse::<WeightUnit>().unwrap_err();
        assert!(matches!(err, InsightsError::InvalidUnit(ref s) if s == "stone"));
    }

    #[test]
    fn test_to_kg_pounds() {
        assert!((to_kg(100.0, WeightUnit::Lb) - 45.359237).abs() < 1e-9);
        assert_eq!(to_kg(80.0, WeightUnit::Kg), 80.0);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&WeightUnit::Kg).unwrap();
        assert_eq!(json, "\"kg\"");
        let unit: WeightUnit = serde_json::from_str("\"lb\"").unwrap();
        assert_eq!(unit, WeightUnit::Lb);
    }

    #[test]
    fn test_default_is_pounds() {
        assert_eq!(WeightUnit::default(), WeightUnit::Lb);
    }
}
