//! Pure scoring for the Haven wellbeing location engine.
//!
//! The crate holds every calculation that needs no I/O:
//! - **Profile normalisation** validates a [`UserState`](haven_core::UserState),
//!   rescales its metrics into a [`FeatureVector`](haven_core::FeatureVector)
//!   and asks a [`TargetProfileStrategy`](haven_core::TargetProfileStrategy)
//!   for the environment that should suit the user.
//! - **Similarity** compares a target profile with a location's profile using
//!   weighted cosine similarity.
//! - **Health index** scores a location's profile across air quality,
//!   climate, environmental and noise components.
//! - **Improvement** measures how close a profile comes to ideal outdoor
//!   conditions.
//!
//! # Examples
//!
//! ```
//! use std::time::SystemTime;
//! use haven_core::UserState;
//! use haven_scorer::{HealthIndexScorer, ProfileNormaliser, SimilarityScorer};
//!
//! let normaliser = ProfileNormaliser::default();
//! let state = UserState::default();
//! let target = normaliser.target_profile(&normaliser.features(&state));
//!
//! assert_eq!(SimilarityScorer::default().similarity(&target, &target), 1.0);
//! let index = HealthIndexScorer::default().score(&target, SystemTime::UNIX_EPOCH);
//! assert!((0.0..=1.0).contains(&index.overall));
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod health;
mod improvement;
mod normaliser;
mod range;
mod similarity;

pub use error::ConfigError;
pub use health::{
    ComponentWeights, HealthIndexConfig, HealthIndexScorer, HealthStatusLabel, Interpretation,
    InterpretationThresholds,
};
pub use improvement::{ImprovementRanges, ImprovementScorer};
pub use normaliser::{
    FixedTargetProfile, MetricSource, MetricSpec, NormaliserConfig, ProfileNormaliser,
};
pub use range::{OptimalRange, RangeTable, Scoring};
pub use similarity::{FeatureWeights, SimilarityScorer};
