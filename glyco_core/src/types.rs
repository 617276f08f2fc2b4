//! Core domain types for the Glyco risk check.
//!
//! This module defines the fundamental types shared by the stores:
//! - The risk assessment form and its field selectors
//! - The physical profile
//! - Users and the persisted auth session
//! - Change origins and the cross-store glucose command

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Risk Assessment Types
// ============================================================================

/// Inputs and result of a single risk assessment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub age: u32,
    pub hypertension: Option<bool>,
    pub heart_disease: Option<bool>,
    pub bmi: f64,
    /// Percent, expected in 4..=12
    pub hba1c: f64,
    /// mg/dL, expected in 70..=200
    pub glucose: f64,
    /// Last computed score in 0..=1
    pub risk: f64,
    pub show_result: bool,
}

impl Default for RiskAssessment {
    fn default() -> Self {
        Self {
            age: 25,
            hypertension: None,
            heart_disease: None,
            bmi: 24.5,
            hba1c: 5.7,
            glucose: 95.0,
            risk: 0.0,
            show_result: false,
        }
    }
}

/// Yes/no questions on the assessment form
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BinaryField {
    Hypertension,
    HeartDisease,
}

/// Blood measurements on the assessment form
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BloodLevel {
    Hba1c,
    Glucose,
}

// ============================================================================
// Profile Types
// ============================================================================

/// The user's physical attributes
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub height_cm: f64,
    pub weight_kg: f64,
    /// mg/dL
    pub glucose_level: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            height_cm: 170.0,
            weight_kg: 70.0,
            glucose_level: 95.0,
        }
    }
}

// ============================================================================
// Auth Types
// ============================================================================

/// A signed-in user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Fields of a user that may be edited after sign-in
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Session snapshot persisted under the `auth-storage` namespace
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthSession {
    pub user: Option<User>,
    pub is_authenticated: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Cross-store Types
// ============================================================================

/// Who caused a state change, delivered with every store notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Direct edit from the front end
    User,
    /// Pushed from the profile into the assessment
    Profile,
    /// Propagated from the assessment into the profile
    Risk,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::User => write!(f, "user"),
            Origin::Profile => write!(f, "profile"),
            Origin::Risk => write!(f, "risk"),
        }
    }
}

/// Command emitted by the risk store when the user edits glucose.
///
/// Only the risk store constructs it and only the profile store consumes it,
/// so propagation is one hop in one direction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use = "deliver to ProfileStore::apply_glucose_from_risk"]
pub struct GlucoseChanged {
    pub(crate) glucose: f64,
}

impl GlucoseChanged {
    pub fn glucose(&self) -> f64 {
        self.glucose
    }
}
