//! Risk assessment store and scoring rules.
//!
//! The score is a fixed additive rule table, not a trained model:
//! - Age over 45 adds 0.20, over 65 a further 0.10
//! - Hypertension and heart disease add 0.15 each
//! - BMI 25..30 adds 0.10, 30 and above 0.20
//! - HbA1c 5.7..6.5 adds 0.20, 6.5 and above 0.40
//! - Glucose 100..126 adds 0.20, 126 and above 0.40
//!
//! The sum is clamped to 1.0. Lower bounds are inclusive, upper bounds
//! exclusive.

use crate::metrics::glucose_to_hba1c;
use crate::observable::{Observable, SubscriptionId};
use crate::{BinaryField, BloodLevel, Error, GlucoseChanged, Origin, Result, RiskAssessment};
use std::fmt;

/// One row of the rule table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RiskFactor {
    AgeOver45,
    AgeOver65,
    Hypertension,
    HeartDisease,
    Overweight,
    Obese,
    Prediabetic,
    DiabeticHba1c,
    ElevatedGlucose,
    HighGlucose,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 10] = [
        RiskFactor::AgeOver45,
        RiskFactor::AgeOver65,
        RiskFactor::Hypertension,
        RiskFactor::HeartDisease,
        RiskFactor::Overweight,
        RiskFactor::Obese,
        RiskFactor::Prediabetic,
        RiskFactor::DiabeticHba1c,
        RiskFactor::ElevatedGlucose,
        RiskFactor::HighGlucose,
    ];

    pub fn weight(&self) -> f64 {
        match self {
            RiskFactor::AgeOver45 => 0.2,
            RiskFactor::AgeOver65 => 0.1,
            RiskFactor::Hypertension => 0.15,
            RiskFactor::HeartDisease => 0.15,
            RiskFactor::Overweight => 0.1,
            RiskFactor::Obese => 0.2,
            RiskFactor::Prediabetic => 0.2,
            RiskFactor::DiabeticHba1c => 0.4,
            RiskFactor::ElevatedGlucose => 0.2,
            RiskFactor::HighGlucose => 0.4,
        }
    }

    pub fn applies(&self, a: &RiskAssessment) -> bool {
        match self {
            RiskFactor::AgeOver45 => a.age > 45,
            RiskFactor::AgeOver65 => a.age > 65,
            RiskFactor::Hypertension => a.hypertension == Some(true),
            RiskFactor::HeartDisease => a.heart_disease == Some(true),
            RiskFactor::Overweight => a.bmi >= 25.0 && a.bmi < 30.0,
            RiskFactor::Obese => a.bmi >= 30.0,
            RiskFactor::Prediabetic => a.hba1c >= 5.7 && a.hba1c < 6.5,
            RiskFactor::DiabeticHba1c => a.hba1c >= 6.5,
            RiskFactor::ElevatedGlucose => a.glucose >= 100.0 && a.glucose < 126.0,
            RiskFactor::HighGlucose => a.glucose >= 126.0,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskFactor::AgeOver45 => "age over 45",
            RiskFactor::AgeOver65 => "age over 65",
            RiskFactor::Hypertension => "hypertension",
            RiskFactor::HeartDisease => "heart disease",
            RiskFactor::Overweight => "BMI 25-30 (overweight)",
            RiskFactor::Obese => "BMI 30+ (obesity)",
            RiskFactor::Prediabetic => "HbA1c 5.7-6.5% (prediabetes range)",
            RiskFactor::DiabeticHba1c => "HbA1c 6.5%+ (diabetes range)",
            RiskFactor::ElevatedGlucose => "glucose 100-126 mg/dL",
            RiskFactor::HighGlucose => "glucose 126+ mg/dL",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Rules that fire for the given inputs, in table order
pub fn contributions(assessment: &RiskAssessment) -> Vec<RiskFactor> {
    RiskFactor::ALL
        .iter()
        .copied()
        .filter(|factor| factor.applies(assessment))
        .collect()
}

/// Additive score for the given inputs, clamped to 1.0
pub fn score(assessment: &RiskAssessment) -> f64 {
    contributions(assessment)
        .iter()
        .fold(0.0, |sum, factor| sum + factor.weight())
        .min(1.0)
}

/// Holds the assessment form and its last computed score
#[derive(Debug, Default)]
pub struct RiskStore {
    state: Observable<RiskAssessment>,
}

impl RiskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assessment(&self) -> &RiskAssessment {
        self.state.get()
    }

    pub fn risk(&self) -> f64 {
        self.state.get().risk
    }

    pub fn show_result(&self) -> bool {
        self.state.get().show_result
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&RiskAssessment, Origin) + Send + 'static,
    {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    pub fn set_age(&mut self, age: u32) {
        self.state.update(Origin::User, |a| a.age = age);
    }

    pub fn set_binary_value(&mut self, field: BinaryField, value: bool) {
        self.state.update(Origin::User, |a| match field {
            BinaryField::Hypertension => a.hypertension = Some(value),
            BinaryField::HeartDisease => a.heart_disease = Some(value),
        });
    }

    pub fn set_bmi(&mut self, bmi: f64) -> Result<()> {
        self.write_bmi(bmi, Origin::User)
    }

    /// BMI derived from the profile's height and weight
    pub(crate) fn set_bmi_from_profile(&mut self, bmi: f64) -> Result<()> {
        self.write_bmi(bmi, Origin::Profile)
    }

    fn write_bmi(&mut self, bmi: f64, origin: Origin) -> Result<()> {
        ensure_finite("bmi", bmi)?;
        self.state.update(origin, |a| a.bmi = bmi);
        Ok(())
    }

    /// Set HbA1c or glucose.
    ///
    /// Glucose also recomputes HbA1c in the same update. Unless the value came
    /// from the profile, the returned command must be delivered to the profile
    /// store. HbA1c edits never touch glucose.
    pub(crate) fn set_blood_level(
        &mut self,
        level: BloodLevel,
        value: f64,
        origin: Origin,
    ) -> Result<Option<GlucoseChanged>> {
        ensure_finite(level_name(level), value)?;

        match level {
            BloodLevel::Glucose => {
                let hba1c = glucose_to_hba1c(value);
                self.state.update(origin, |a| {
                    a.glucose = value;
                    a.hba1c = hba1c;
                });
                tracing::debug!(
                    "Glucose set to {} (hba1c {}) from {}",
                    value,
                    hba1c,
                    origin
                );

                if origin == Origin::Profile {
                    Ok(None)
                } else {
                    Ok(Some(GlucoseChanged { glucose: value }))
                }
            }
            BloodLevel::Hba1c => {
                self.state.update(origin, |a| a.hba1c = value);
                Ok(None)
            }
        }
    }

    /// Score the current inputs and show the result
    pub fn calculate_risk(&mut self) -> f64 {
        let risk = score(self.state.get());
        self.state.update(Origin::User, |a| {
            a.risk = risk;
            a.show_result = true;
        });
        tracing::info!("Calculated risk score {:.2}", risk);
        risk
    }

    /// Hide the result but keep every input for another run
    pub fn reset_assessment(&mut self) {
        self.state.update(Origin::User, |a| a.show_result = false);
    }

    pub fn contributions(&self) -> Vec<RiskFactor> {
        contributions(self.state.get())
    }
}

fn level_name(level: BloodLevel) -> &'static str {
    match level {
        BloodLevel::Hba1c => "hba1c",
        BloodLevel::Glucose => "glucose",
    }
}

fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "{} must be a finite number, got {}",
            field, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_baseline_defaults_score() {
        let mut store = RiskStore::new();
        let risk = store.calculate_risk();

        // Only the HbA1c 5.7 band fires; the lower bound is inclusive
        assert_eq!(risk, 0.2);
        assert_eq!(store.contributions(), vec![RiskFactor::Prediabetic]);
        assert!(store.show_result());
    }

    #[test]
    fn test_maximal_inputs_clamp_to_one() {
        let mut store = RiskStore::new();
        store.set_age(70);
        store.set_binary_value(BinaryField::Hypertension, true);
        store.set_binary_value(BinaryField::HeartDisease, true);
        store.set_bmi(32.0).unwrap();
        store
            .set_blood_level(BloodLevel::Glucose, 150.0, Origin::User)
            .unwrap();
        store
            .set_blood_level(BloodLevel::Hba1c, 7.0, Origin::User)
            .unwrap();

        let raw = store
            .contributions()
            .iter()
            .fold(0.0, |sum, factor| sum + factor.weight());
        assert_close(raw, 1.6);
        assert_eq!(store.calculate_risk(), 1.0);
    }

    #[test]
    fn test_rules_are_additive() {
        let assessment = RiskAssessment {
            age: 50,
            hypertension: Some(true),
            heart_disease: Some(false),
            bmi: 27.0,
            hba1c: 5.0,
            glucose: 90.0,
            ..RiskAssessment::default()
        };

        // 0.2 (age) + 0.15 (hypertension) + 0.1 (overweight)
        assert_close(score(&assessment), 0.45);
    }

    #[test]
    fn test_band_boundaries() {
        let base = RiskAssessment {
            hba1c: 5.0,
            ..RiskAssessment::default()
        };
        assert_eq!(score(&base), 0.0);

        let at = |f: fn(&mut RiskAssessment)| {
            let mut a = base.clone();
            f(&mut a);
            score(&a)
        };

        assert_close(at(|a| a.age = 45), 0.0);
        assert_close(at(|a| a.age = 46), 0.2);
        assert_close(at(|a| a.age = 65), 0.2);
        assert_close(at(|a| a.age = 66), 0.3);
        assert_close(at(|a| a.bmi = 25.0), 0.1);
        assert_close(at(|a| a.bmi = 30.0), 0.2);
        assert_close(at(|a| a.hba1c = 6.5), 0.4);
        assert_close(at(|a| a.glucose = 100.0), 0.2);
        assert_close(at(|a| a.glucose = 125.9), 0.2);
        assert_close(at(|a| a.glucose = 126.0), 0.4);
    }

    #[test]
    fn test_unanswered_questions_do_not_count() {
        let mut store = RiskStore::new();
        store.set_binary_value(BinaryField::Hypertension, false);
        assert_eq!(store.assessment().hypertension, Some(false));
        assert_eq!(store.assessment().heart_disease, None);
        assert_eq!(store.calculate_risk(), 0.2);
    }

    #[test]
    fn test_score_always_in_unit_interval() {
        for age in [0, 30, 46, 66, 120] {
            for bmi in [10.0, 24.9, 27.0, 45.0] {
                for glucose in [70.0, 110.0, 200.0] {
                    let a = RiskAssessment {
                        age,
                        hypertension: Some(true),
                        heart_disease: Some(true),
                        bmi,
                        hba1c: glucose_to_hba1c(glucose),
                        glucose,
                        ..RiskAssessment::default()
                    };
                    let risk = score(&a);
                    assert!((0.0..=1.0).contains(&risk));
                }
            }
        }
    }

    #[test]
    fn test_glucose_updates_hba1c_and_emits_command() {
        let mut store = RiskStore::new();
        let command = store
            .set_blood_level(BloodLevel::Glucose, 130.0, Origin::User)
            .unwrap();

        assert_eq!(store.assessment().glucose, 130.0);
        assert_eq!(store.assessment().hba1c, 6.2);
        assert_eq!(command.map(|c| c.glucose()), Some(130.0));
    }

    #[test]
    fn test_glucose_from_profile_emits_nothing() {
        let mut store = RiskStore::new();
        let command = store
            .set_blood_level(BloodLevel::Glucose, 110.0, Origin::Profile)
            .unwrap();

        assert!(command.is_none());
        assert_eq!(store.assessment().hba1c, 5.5);
    }

    #[test]
    fn test_hba1c_edit_leaves_glucose_alone() {
        let mut store = RiskStore::new();
        let command = store
            .set_blood_level(BloodLevel::Hba1c, 8.0, Origin::User)
            .unwrap();

        assert!(command.is_none());
        assert_eq!(store.assessment().hba1c, 8.0);
        assert_eq!(store.assessment().glucose, 95.0);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut store = RiskStore::new();
        assert!(store.set_bmi(f64::NAN).is_err());
        assert!(store
            .set_blood_level(BloodLevel::Glucose, f64::INFINITY, Origin::User)
            .is_err());
        assert_eq!(store.assessment(), &RiskAssessment::default());
    }

    #[test]
    fn test_reset_keeps_inputs() {
        let mut store = RiskStore::new();
        store.set_age(60);
        store.set_bmi(31.0).unwrap();
        store.calculate_risk();
        let before = store.assessment().clone();

        store.reset_assessment();

        let after = store.assessment();
        assert!(!after.show_result);
        assert_eq!(after.age, before.age);
        assert_eq!(after.bmi, before.bmi);
        assert_eq!(after.risk, before.risk);
        assert_eq!(after.hba1c, before.hba1c);
    }

    #[test]
    fn test_glucose_write_is_one_notification() {
        let mut store = RiskStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |a, origin| sink.lock().unwrap().push((a.glucose, a.hba1c, origin)));

        store
            .set_blood_level(BloodLevel::Glucose, 130.0, Origin::User)
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(130.0, 6.2, Origin::User)]);
    }
}
