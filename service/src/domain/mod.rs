//! Domain entities and state machines.

pub mod application;
pub mod contract;
pub mod finance;
pub mod quote;
pub mod risk;
pub mod user;
pub mod vehicle;

use derive_more::Display;

pub use self::{
    application::Application,
    contract::Contract,
    quote::Quote,
    risk::{RiskAssessment, RiskScorer},
    user::User,
    vehicle::Vehicle,
};

/// Optimistic-concurrency version of a stored entity.
///
/// Bumped on every mutation; the backing store refuses an update whose
/// [`Version`] doesn't exceed the stored one.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version(u64);

impl Version {
    /// Returns the [`Version`] of a newly created entity.
    #[must_use]
    pub fn initial() -> Self {
        Self(1)
    }

    /// Returns the [`Version`] following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::initial()
    }
}
