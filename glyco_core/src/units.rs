//! Metric and imperial conversions for height and weight.
//!
//! Every conversion rounds to whole units, so round trips are lossy:
//! - feet/inches -> cm -> feet/inches reproduces the input within 1 inch
//! - cm -> feet/inches -> cm stays within 2 cm (one inch of resolution)
//! - kg -> lbs -> kg reproduces the input within 1 kg

use crate::metrics::bmi_from_height_weight;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

const FEET_PER_CM: f64 = 0.0328084;
const CM_PER_INCH: f64 = 2.54;
const LBS_PER_KG: f64 = 2.20462;
const KG_PER_LB: f64 = 0.453592;

/// A height in whole feet and inches
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeetInches {
    pub feet: u32,
    pub inches: u32,
}

impl FeetInches {
    pub fn new(feet: u32, inches: u32) -> Self {
        Self { feet, inches }
    }

    pub fn total_inches(&self) -> u32 {
        self.feet.saturating_mul(12).saturating_add(self.inches)
    }
}

impl fmt::Display for FeetInches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}' {}\"", self.feet, self.inches)
    }
}

/// Convert centimetres to whole feet and inches.
///
/// Negative or non-finite input converts as zero.
pub fn cm_to_feet_inches(cm: f64) -> FeetInches {
    let cm = if cm.is_finite() { cm.max(0.0) } else { 0.0 };
    let total_feet = cm * FEET_PER_CM;
    let mut feet = total_feet.floor() as u32;
    let mut inches = (total_feet.fract() * 12.0).round() as u32;
    if inches == 12 {
        feet += 1;
        inches = 0;
    }
    FeetInches { feet, inches }
}

/// Convert feet and inches to whole centimetres
pub fn feet_inches_to_cm(height: FeetInches) -> f64 {
    (height.total_inches() as f64 * CM_PER_INCH).round()
}

/// Convert kilograms to whole pounds
pub fn kg_to_lbs(kg: f64) -> f64 {
    (kg * LBS_PER_KG).round()
}

/// Convert pounds to whole kilograms
pub fn lbs_to_kg(lbs: f64) -> f64 {
    (lbs * KG_PER_LB).round()
}

/// BMI computed directly from imperial inputs, without intermediate rounding
pub fn bmi_from_imperial(height: FeetInches, lbs: f64) -> Result<f64> {
    let height_cm = height.total_inches() as f64 * CM_PER_INCH;
    bmi_from_height_weight(height_cm, lbs * KG_PER_LB)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_total_inches_saturates() {
        assert_eq!(FeetInches::new(5, 7).total_inches(), 67);
        assert_eq!(FeetInches::new(u32::MAX / 2, 11).total_inches(), u32::MAX);
    }

    #[test]
    fn test_cm_to_feet_inches() {
        assert_eq!(cm_to_feet_inches(170.0), FeetInches::new(5, 7));
        assert_eq!(cm_to_feet_inches(183.0), FeetInches::new(6, 0));
        assert_eq!(cm_to_feet_inches(-5.0), FeetInches::new(0, 0));
        assert_eq!(cm_to_feet_inches(f64::NAN), FeetInches::new(0, 0));
    }

    #[test]
    fn test_inches_never_reach_twelve() {
        for step in 0..25_000 {
            let height = cm_to_feet_inches(step as f64 / 100.0);
            assert!(height.inches < 12, "got {:?}", height);
        }
    }

    #[test]
    fn test_feet_inches_round_trip_within_one_inch() {
        for feet in 4..=7 {
            for inches in 0..12 {
                let original = FeetInches::new(feet, inches);
                let back = cm_to_feet_inches(feet_inches_to_cm(original));
                let diff = back.total_inches() as i64 - original.total_inches() as i64;
                assert!(
                    diff.abs() <= 1,
                    "{} came back as {}",
                    original,
                    back
                );
            }
        }
    }

    #[test]
    fn test_cm_round_trip_within_tolerance() {
        for cm in 120..=220 {
            let back = feet_inches_to_cm(cm_to_feet_inches(cm as f64));
            assert!((back - cm as f64).abs() <= 2.0, "{} cm came back as {}", cm, back);
        }
    }

    #[test]
    fn test_weight_round_trip_within_one_kg() {
        for kg in 30..=200 {
            let back = lbs_to_kg(kg_to_lbs(kg as f64));
            assert!((back - kg as f64).abs() <= 1.0, "{} kg came back as {}", kg, back);
        }
        assert_eq!(kg_to_lbs(70.0), 154.0);
        assert_eq!(lbs_to_kg(154.0), 70.0);
    }

    #[test]
    fn test_bmi_from_imperial() {
        // 5'10" and 160 lbs is about 23.0
        let bmi = bmi_from_imperial(FeetInches::new(5, 10), 160.0).unwrap();
        assert!((bmi - 22.96).abs() < 0.01);
    }

    #[test]
    fn test_bmi_from_imperial_rejects_zero_height() {
        let result = bmi_from_imperial(FeetInches::new(0, 0), 160.0);
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
