//! Store context: one instance of each store, passed explicitly.
//!
//! This is the only code that moves values between stores. The edges are:
//! - assessment glucose -> profile glucose (one hop, via [`GlucoseChanged`])
//! - profile height/weight -> assessment BMI
//! - profile -> assessment on initial load, tagged [`Origin::Profile`]
//!
//! Edits made directly on the profile's glucose do not reach the assessment.
//! Every method takes `&mut self`, so paired writes across two stores finish
//! before anyone else can read either store.
//!
//! [`GlucoseChanged`]: crate::GlucoseChanged

use crate::auth::AuthStore;
use crate::config::Config;
use crate::metrics::weight_for_bmi;
use crate::profile::{ProfilePatch, ProfileStore};
use crate::risk::RiskStore;
use crate::snapshot::{Snapshot, PROFILE_NAMESPACE};
use crate::{BloodLevel, Origin, Profile, Result};
use std::path::Path;

#[derive(Debug)]
pub struct Stores {
    pub risk: RiskStore,
    pub profile: ProfileStore,
    pub auth: AuthStore,
    profile_snapshot: Option<Snapshot>,
}

impl Stores {
    /// Fresh in-memory stores with default values
    pub fn new(config: &Config) -> Self {
        Self {
            risk: RiskStore::new(),
            profile: ProfileStore::new(),
            auth: AuthStore::new(config.auth.clone()),
            profile_snapshot: None,
        }
    }

    /// Stores backed by the snapshots in `data_dir`.
    ///
    /// A saved profile, if present, is pushed into the assessment.
    pub fn open(data_dir: &Path, config: &Config) -> Result<Self> {
        let snapshot = Snapshot::in_dir(data_dir, PROFILE_NAMESPACE);
        let saved = snapshot
            .load::<Profile>()?
            .and_then(|profile| match ProfilePatch::from(&profile).validate() {
                Ok(()) => Some(profile),
                Err(e) => {
                    tracing::warn!(
                        "Saved profile in {:?} is invalid: {}. Using defaults.",
                        snapshot.path(),
                        e
                    );
                    None
                }
            });
        let has_saved_profile = saved.is_some();

        let mut stores = Self {
            risk: RiskStore::new(),
            profile: ProfileStore::with_profile(saved.unwrap_or_default()),
            auth: AuthStore::open(data_dir, config.auth.clone())?,
            profile_snapshot: Some(snapshot),
        };

        if has_saved_profile {
            stores.sync_from_profile()?;
        }
        Ok(stores)
    }

    /// Set glucose or HbA1c from the assessment form.
    ///
    /// Glucose edits are forwarded to the profile exactly once.
    pub fn set_blood_level(&mut self, level: BloodLevel, value: f64) -> Result<()> {
        if let Some(command) = self.risk.set_blood_level(level, value, Origin::User)? {
            self.profile.apply_glucose_from_risk(command);
        }
        Ok(())
    }

    /// Patch the profile and refresh the assessment's BMI if it moved
    pub fn update_profile(&mut self, patch: &ProfilePatch) -> Result<()> {
        self.profile.update_profile(patch)?;
        if patch.touches_bmi() {
            let bmi = self.profile.bmi()?;
            self.risk.set_bmi_from_profile(bmi)?;
        }
        Ok(())
    }

    /// Move the BMI slider: keep height, derive the weight that gives `bmi`.
    ///
    /// Weight is rounded to whole kilograms, so the resulting BMI is close to,
    /// not exactly, the requested value.
    pub fn set_bmi_target(&mut self, bmi: f64) -> Result<f64> {
        let weight = weight_for_bmi(bmi, self.profile.height_cm())?.round();
        self.update_profile(&ProfilePatch::new().weight_kg(weight))?;
        Ok(self.risk.assessment().bmi)
    }

    /// Push the profile's glucose and BMI into the assessment
    pub fn sync_from_profile(&mut self) -> Result<()> {
        let glucose = self.profile.glucose_level();
        let echoed = self
            .risk
            .set_blood_level(BloodLevel::Glucose, glucose, Origin::Profile)?;
        debug_assert!(echoed.is_none());

        let bmi = self.profile.bmi()?;
        self.risk.set_bmi_from_profile(bmi)?;
        tracing::debug!("Assessment synced from profile (glucose {}, bmi {:.1})", glucose, bmi);
        Ok(())
    }

    /// Write the profile snapshot, if these stores are backed by one
    pub fn save_profile(&self) -> Result<()> {
        match &self.profile_snapshot {
            Some(snapshot) => snapshot.save(self.profile.profile()),
            None => Ok(()),
        }
    }
}
