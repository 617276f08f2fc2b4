//! Profile store: the user's physical attributes.
//!
//! Edits arrive as a [`ProfilePatch`] naming only the fields that change.
//! The whole patch is validated before anything is merged, so a rejected
//! patch leaves the profile untouched.
//!
//! The store has no handle on the risk store. Glucose edits made on the
//! assessment arrive as a [`GlucoseChanged`] command and are applied with
//! [`Origin::Risk`]; nothing here can send them back.

use crate::metrics::bmi_from_height_weight;
use crate::observable::{Observable, SubscriptionId};
use crate::{Error, GlucoseChanged, Origin, Profile, Result};

/// A partial profile update
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfilePatch {
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    glucose_level: Option<f64>,
}

impl From<&Profile> for ProfilePatch {
    /// Patch that sets every field, used to validate a whole profile
    fn from(profile: &Profile) -> Self {
        Self::new()
            .height_cm(profile.height_cm)
            .weight_kg(profile.weight_kg)
            .glucose_level(profile.glucose_level)
    }
}

impl ProfilePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height_cm(mut self, height_cm: f64) -> Self {
        self.height_cm = Some(height_cm);
        self
    }

    pub fn weight_kg(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn glucose_level(mut self, glucose_level: f64) -> Self {
        self.glucose_level = Some(glucose_level);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.height_cm.is_none() && self.weight_kg.is_none() && self.glucose_level.is_none()
    }

    /// True when the patch changes an input of the derived BMI
    pub fn touches_bmi(&self) -> bool {
        self.height_cm.is_some() || self.weight_kg.is_some()
    }

    /// Check every present field; returns the first failure
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("height_cm", self.height_cm),
            ("weight_kg", self.weight_kg),
            ("glucose_level", self.glucose_level),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(Error::validation(format!(
                        "{} must be a positive number, got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }

    fn apply(&self, profile: &mut Profile) {
        if let Some(height_cm) = self.height_cm {
            profile.height_cm = height_cm;
        }
        if let Some(weight_kg) = self.weight_kg {
            profile.weight_kg = weight_kg;
        }
        if let Some(glucose_level) = self.glucose_level {
            profile.glucose_level = glucose_level;
        }
    }
}

/// Holds the current profile and notifies subscribers on change
#[derive(Debug, Default)]
pub struct ProfileStore {
    state: Observable<Profile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: Profile) -> Self {
        Self {
            state: Observable::new(profile),
        }
    }

    pub fn profile(&self) -> &Profile {
        self.state.get()
    }

    pub fn height_cm(&self) -> f64 {
        self.state.get().height_cm
    }

    pub fn weight_kg(&self) -> f64 {
        self.state.get().weight_kg
    }

    pub fn glucose_level(&self) -> f64 {
        self.state.get().glucose_level
    }

    /// BMI derived from the current height and weight
    pub fn bmi(&self) -> Result<f64> {
        let profile = self.state.get();
        bmi_from_height_weight(profile.height_cm, profile.weight_kg)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&Profile, Origin) + Send + 'static,
    {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Merge a validated patch into the profile
    pub fn update_profile(&mut self, patch: &ProfilePatch) -> Result<()> {
        patch.validate()?;
        if patch.is_empty() {
            return Ok(());
        }
        self.state.update(Origin::User, |profile| patch.apply(profile));
        tracing::debug!("Profile updated: {:?}", self.state.get());
        Ok(())
    }

    /// Accept a glucose edit made on the assessment
    pub fn apply_glucose_from_risk(&mut self, command: GlucoseChanged) {
        self.state
            .update(Origin::Risk, |profile| profile.glucose_level = command.glucose);
        tracing::debug!("Profile glucose synced from assessment: {}", command.glucose);
    }
}
