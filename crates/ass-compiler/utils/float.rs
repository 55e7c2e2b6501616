//! Deserializers for floats that may have been written as `null`
//!
//! JSON has no `NaN` or infinity and `serde_json` writes both as `null`.
//! Compiled output keeps `NaN` for tags with unparsable arguments, and an
//! empty drawing has an inverted bounding box, so these helpers read `null`
//! back to the value that slot held.

use serde::{Deserialize, Deserializer};

/// Read `null` as `NaN`
///
/// # Errors
///
/// Fails when the value is neither a number nor `null`.
pub fn nan_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    or_fallback(deserializer, f64::NAN)
}

/// Read `null` as `+inf`, the minimum of an empty bounding box
///
/// # Errors
///
/// Fails when the value is neither a number nor `null`.
pub fn infinity_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    or_fallback(deserializer, f64::INFINITY)
}

/// Read `null` as `-inf`, the extent of an empty bounding box
///
/// # Errors
///
/// Fails when the value is neither a number nor `null`.
pub fn neg_infinity_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    or_fallback(deserializer, f64::NEG_INFINITY)
}

fn or_fallback<'de, D>(deserializer: D, fallback: f64) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "nan_if_null")]
        value: f64,
        #[serde(deserialize_with = "infinity_if_null")]
        low: f64,
        #[serde(deserialize_with = "neg_infinity_if_null")]
        extent: f64,
    }

    #[test]
    fn non_finite_values_survive_json() {
        let sample = Sample {
            value: f64::NAN,
            low: f64::INFINITY,
            extent: f64::NEG_INFINITY,
        };
        let text = serde_json::to_string(&sample).unwrap();
        assert_eq!(text, r#"{"value":null,"low":null,"extent":null}"#);

        let back: Sample = serde_json::from_str(&text).unwrap();
        assert!(back.value.is_nan());
        assert_eq!(back.low, f64::INFINITY);
        assert_eq!(back.extent, f64::NEG_INFINITY);
    }

    #[test]
    fn numbers_pass_through() {
        let back: Sample =
            serde_json::from_str(r#"{"value":1.5,"low":-2,"extent":3}"#).unwrap();
        assert_eq!((back.value, back.low, back.extent), (1.5, -2.0, 3.0));
    }

    #[test]
    fn strings_are_rejected() {
        let result = serde_json::from_str::<Sample>(r#"{"value":"x","low":0,"extent":0}"#);
        assert!(result.is_err());
    }
}
