//! A user's self-reported mental and physical state.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mental and physical metrics captured for a single prediction request.
///
/// Mental metrics use a `0..=10` scale; physical metrics use their native
/// units (beats per minute, mmHg, °C). The state is immutable once built.
///
/// # Examples
///
/// ```
/// use haven_core::UserState;
///
/// let state = UserState::new(
///     [("stress_level".to_owned(), 7.0), ("mood".to_owned(), 4.0)],
///     [("heart_rate".to_owned(), 82.0)],
/// );
/// assert_eq!(state.mental("mood"), Some(4.0));
/// assert_eq!(state.physical("heart_rate"), Some(82.0));
/// assert_eq!(state.physical("pain_level"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UserState {
    #[cfg_attr(feature = "serde", serde(rename = "mental_state", default))]
    mental: BTreeMap<String, f64>,
    #[cfg_attr(feature = "serde", serde(rename = "physical_state", default))]
    physical: BTreeMap<String, f64>,
}

impl UserState {
    /// Capture a state from mental and physical metric pairs.
    pub fn new<M, P>(mental: M, physical: P) -> Self
    where
        M: IntoIterator<Item = (String, f64)>,
        P: IntoIterator<Item = (String, f64)>,
    {
        Self {
            mental: mental.into_iter().collect(),
            physical: physical.into_iter().collect(),
        }
    }

    /// Look up a mental metric.
    #[must_use]
    pub fn mental(&self, name: &str) -> Option<f64> {
        self.mental.get(name).copied()
    }

    /// Look up a physical metric.
    #[must_use]
    pub fn physical(&self, name: &str) -> Option<f64> {
        self.physical.get(name).copied()
    }

    /// All mental metrics keyed by name.
    #[must_use]
    pub const fn mental_metrics(&self) -> &BTreeMap<String, f64> {
        &self.mental
    }

    /// All physical metrics keyed by name.
    #[must_use]
    pub const fn physical_metrics(&self) -> &BTreeMap<String, f64> {
        &self.physical
    }
}

/// What was wrong with a single field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViolationKind {
    /// A required metric was absent.
    Missing,
    /// The value was NaN or infinite.
    NotFinite,
    /// The value was outside the accepted bounds.
    OutOfRange {
        /// Rejected value.
        value: f64,
    },
}

/// One invalid field together with its accepted bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    /// Metric name.
    pub field: String,
    /// Failure category.
    pub kind: ViolationKind,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            field, min, max, ..
        } = self;
        match self.kind {
            ViolationKind::Missing => {
                write!(f, "{field} is required (accepted {min}..={max})")
            }
            ViolationKind::NotFinite => {
                write!(f, "{field} must be a finite number (accepted {min}..={max})")
            }
            ViolationKind::OutOfRange { value } => {
                write!(f, "{field}={value} is outside {min}..={max}")
            }
        }
    }
}

/// User state rejected because one or more fields were invalid.
///
/// Every violation found is reported, not only the first.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid user state: {}", summarise(.violations))]
pub struct ValidationError {
    /// Field-level failures in metric order.
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Whether a violation was recorded for `field`.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|violation| violation.field == field)
    }
}

fn summarise(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
