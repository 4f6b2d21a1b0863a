//! Risk and Shariah-compliance assessment definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, DateTimeOf};
use derive_more::{Display, Error, Into};

use crate::domain::Contract;

/// Risk and compliance assessment attached to a [`Contract`].
#[derive(Clone, Debug)]
pub struct RiskAssessment {
    /// Aggregated risk [`Score`].
    pub score: Score,

    /// Risk [`Level`] derived from the [`Score`].
    pub level: Level,

    /// Whether the financing structure is Shariah compliant.
    pub shariah_compliant: bool,

    /// Free-form notes of the scorer.
    pub notes: Vec<String>,

    /// [`DateTime`] when this [`RiskAssessment`] was produced.
    pub assessed_at: AssessmentDateTime,
}

/// Aggregated risk score in the `0..=100` range, higher is safer.
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
pub struct Score(u8);

impl Score {
    /// Creates a new [`Score`] if the given `score` is within the
    /// `0..=100` range.
    #[must_use]
    pub fn new(score: u8) -> Option<Self> {
        (score <= 100).then_some(Self(score))
    }
}

define_kind! {
    #[doc = "Risk level derived from a [`Score`]."]
    enum Level {
        #[doc = "Low risk: score of 75 and above."]
        Low = 1,

        #[doc = "Medium risk: score between 50 and 74."]
        Medium = 2,

        #[doc = "High risk: score below 50."]
        High = 3,
    }
}

impl Level {
    /// Returns the [`Level`] the provided [`Score`] falls into.
    #[must_use]
    pub fn of(score: Score) -> Self {
        match u8::from(score) {
            75.. => Self::Low,
            50..=74 => Self::Medium,
            ..=49 => Self::High,
        }
    }
}

/// Scorer producing a [`RiskAssessment`] for a [`Contract`].
///
/// The scorer is an opaque collaborator of the workflow: only the shape of
/// its output is fixed. The shipped implementation is a deterministic
/// fixture, real scoring backends plug in behind this trait.
pub trait RiskScorer {
    /// Produces a [`RiskAssessment`] for the provided [`Contract`].
    ///
    /// # Errors
    ///
    /// Returns a [`ScoringError`] if the assessment cannot be produced.
    fn assess(
        &self,
        contract: &Contract,
        now: common::DateTime,
    ) -> Result<RiskAssessment, ScoringError>;
}

/// Error of producing a [`RiskAssessment`].
#[derive(Debug, Display, Error)]
#[display("risk scoring failed: {_0}")]
pub struct ScoringError(#[error(not(source))] pub String);

/// [`DateTime`] when a [`RiskAssessment`] was produced.
pub type AssessmentDateTime = DateTimeOf<(Contract, RiskAssessment)>;
