//! Derived metric calculations.
//!
//! Pure functions for the values the form derives from raw inputs:
//! - HbA1c estimated from average glucose
//! - BMI from height and weight (and the inverse for the BMI slider)
//! - BMI category classification
//!
//! Out-of-domain inputs are rejected here, at the input boundary, so that
//! no NaN or infinity can reach the risk score.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest HbA1c the estimator reports
pub const HBA1C_MIN: f64 = 4.0;

/// Highest HbA1c the estimator reports
pub const HBA1C_MAX: f64 = 12.0;

/// Estimate HbA1c (%) from average glucose (mg/dL).
///
/// Uses `(glucose + 46.7) / 28.7`, rounded to one decimal and clamped to
/// [`HBA1C_MIN`, `HBA1C_MAX`]. Total over `f64`: NaN yields the lower bound.
pub fn glucose_to_hba1c(glucose: f64) -> f64 {
    let raw = (glucose + 46.7) / 28.7;
    let rounded = (raw * 10.0).round() / 10.0;
    if rounded.is_nan() {
        return HBA1C_MIN;
    }
    rounded.clamp(HBA1C_MIN, HBA1C_MAX)
}

/// Body Mass Index from height (cm) and weight (kg)
pub fn bmi_from_height_weight(height_cm: f64, weight_kg: f64) -> Result<f64> {
    let meters = height_m(height_cm)?;
    ensure_non_negative("weight", weight_kg)?;
    Ok(weight_kg / (meters * meters))
}

/// Weight (kg) that produces `bmi` at the given height
pub fn weight_for_bmi(bmi: f64, height_cm: f64) -> Result<f64> {
    let meters = height_m(height_cm)?;
    ensure_non_negative("bmi", bmi)?;
    Ok(bmi * meters * meters)
}

fn height_m(height_cm: f64) -> Result<f64> {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(Error::validation(format!(
            "height must be a positive number of centimetres, got {}",
            height_cm
        )));
    }
    Ok(height_cm / 100.0)
}

fn ensure_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}

/// WHO adult BMI bands
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obesity,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obesity => "Obesity",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a BMI value using the 18.5 / 25 / 30 thresholds
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obesity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hba1c_from_glucose_130() {
        // (130 + 46.7) / 28.7 = 6.157
        assert_eq!(glucose_to_hba1c(130.0), 6.2);
    }

    #[test]
    fn test_hba1c_clamps_to_range() {
        assert_eq!(glucose_to_hba1c(0.0), HBA1C_MIN);
        assert_eq!(glucose_to_hba1c(-500.0), HBA1C_MIN);
        assert_eq!(glucose_to_hba1c(1000.0), HBA1C_MAX);
        assert_eq!(glucose_to_hba1c(f64::INFINITY), HBA1C_MAX);
        assert_eq!(glucose_to_hba1c(f64::NEG_INFINITY), HBA1C_MIN);
        assert_eq!(glucose_to_hba1c(f64::NAN), HBA1C_MIN);
    }

    #[test]
    fn test_hba1c_monotonic_and_bounded() {
        let mut previous = f64::MIN;
        for tenth in 0..6000 {
            let glucose = tenth as f64 / 10.0;
            let hba1c = glucose_to_hba1c(glucose);
            assert!((HBA1C_MIN..=HBA1C_MAX).contains(&hba1c));
            assert!(
                hba1c >= previous,
                "hba1c decreased at glucose {}: {} < {}",
                glucose,
                hba1c,
                previous
            );
            previous = hba1c;
        }
    }

    #[test]
    fn test_bmi_from_height_weight() {
        let bmi = bmi_from_height_weight(170.0, 70.0).unwrap();
        assert!((bmi - 24.221).abs() < 0.001);
    }

    #[test]
    fn test_bmi_rejects_bad_height() {
        for height in [0.0, -170.0, f64::NAN, f64::INFINITY] {
            let result = bmi_from_height_weight(height, 70.0);
            assert!(
                matches!(result, Err(Error::Validation(_))),
                "height {} should be rejected",
                height
            );
        }
    }

    #[test]
    fn test_bmi_rejects_bad_weight() {
        assert!(bmi_from_height_weight(170.0, -1.0).is_err());
        assert!(bmi_from_height_weight(170.0, f64::NAN).is_err());
    }

    #[test]
    fn test_weight_for_bmi_inverts_bmi() {
        let weight = weight_for_bmi(25.0, 180.0).unwrap();
        assert!((weight - 81.0).abs() < 1e-9);
        let bmi = bmi_from_height_weight(180.0, weight).unwrap();
        assert!((bmi - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_bmi_thresholds() {
        assert_eq!(classify_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(classify_bmi(18.5), BmiCategory::Normal);
        assert_eq!(classify_bmi(24.9), BmiCategory::Normal);
        assert_eq!(classify_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(classify_bmi(29.9), BmiCategory::Overweight);
        assert_eq!(classify_bmi(30.0), BmiCategory::Obesity);
        assert_eq!(BmiCategory::Obesity.to_string(), "Obesity");
    }
}
