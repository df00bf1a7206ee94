//! Feature Registry - Per-disease Feature Layouts
//!
//! Each disease's model consumes a positional vector. The tables below are
//! the authoritative order of that vector; reordering an entry breaks the
//! corresponding model.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// DISEASE IDENTIFIERS
// ============================================================================

/// Closed set of diseases the server knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Disease {
    #[serde(rename = "Parkinson")]
    Parkinson,
    #[serde(rename = "Breast Cancer")]
    BreastCancer,
    #[serde(rename = "Heart")]
    Heart,
}

impl Disease {
    /// All diseases, in registry order
    pub const ALL: [Disease; 3] = [Disease::Parkinson, Disease::BreastCancer, Disease::Heart];

    /// Wire tag used in URLs and request bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Disease::Parkinson => "Parkinson",
            Disease::BreastCancer => "Breast Cancer",
            Disease::Heart => "Heart",
        }
    }

    /// Ordered feature names this disease's model expects
    pub fn features(&self) -> &'static [&'static str] {
        match self {
            Disease::Parkinson => PARKINSON_FEATURES,
            Disease::BreastCancer => BREAST_CANCER_FEATURES,
            Disease::Heart => HEART_FEATURES,
        }
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier outside the closed disease set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown disease: {0}")]
pub struct UnknownDisease(pub String);

/// Feature-list lookup: parse the identifier, then ask for `features()`.
impl FromStr for Disease {
    type Err = UnknownDisease;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Disease::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDisease(s.to_string()))
    }
}

// ============================================================================
// FEATURE LAYOUTS
// ============================================================================

pub const PARKINSON_FEATURES: &[&str] = &[
    "mean_MFCC_2nd_coef",
    "tqwt_minValue_dec_12",
    "tqwt_stdValue_dec_12",
    "tqwt_maxValue_dec_12",
    "tqwt_stdValue_dec_11",
    "tqwt_entropy_log_dec_12",
    "tqwt_maxValue_dec_11",
    "tqwt_minValue_dec_11",
    "tqwt_minValue_dec_13",
    "std_9th_delta_delta",
    "std_8th_delta_delta",
    "tqwt_maxValue_dec_13",
];

// Some names carry a literal space; see normalize::lookup for the
// underscore alias.
pub const BREAST_CANCER_FEATURES: &[&str] = &[
    "concave points_worst",
    "perimeter_worst",
    "concave points_mean",
    "radius_worst",
    "perimeter_mean",
    "area_worst",
    "radius_mean",
    "area_mean",
    "concavity_mean",
    "concavity_worst",
    "compactness_mean",
    "compactness_worst",
];

pub const HEART_FEATURES: &[&str] = &[
    "male",
    "age",
    "currentSmoker",
    "cigsPerDay",
    "BPMeds",
    "prevalentStroke",
    "prevalentHyp",
    "diabetes",
    "totChol",
    "sysBP",
    "diaBP",
    "BMI",
    "heartRate",
    "glucose",
];
