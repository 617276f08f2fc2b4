#![forbid(unsafe_code)]

//! Core state layer and calculators for the Glyco diabetes risk check.
//!
//! This crate provides:
//! - Domain types (assessment, profile, user session)
//! - Derived metric calculators (HbA1c from glucose, BMI, unit conversions)
//! - Observable stores (risk, profile, auth) and the context that links them
//! - Snapshot persistence and configuration

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod units;
pub mod observable;
pub mod snapshot;
pub mod risk;
pub mod profile;
pub mod auth;
pub mod stores;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, UnitSystem};
pub use metrics::{bmi_from_height_weight, classify_bmi, glucose_to_hba1c, BmiCategory};
pub use units::FeetInches;
pub use observable::SubscriptionId;
pub use risk::{RiskFactor, RiskStore};
pub use profile::{ProfilePatch, ProfileStore};
pub use auth::AuthStore;
pub use stores::Stores;
