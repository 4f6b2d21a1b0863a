//! Financing [`Application`] tracking record definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, Error, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{contract, user, Version};

pub use self::notification::Notification;

/// Coarse-grained tracking record paired with a [`Contract`].
///
/// Mutated together with its [`Contract`] by the same role-scoped workflow
/// operations, always within one transaction.
///
/// [`Contract`]: crate::domain::Contract
#[derive(Clone, Debug)]
pub struct Application {
    /// ID of this [`Application`].
    pub id: Id,

    /// ID of the paired [`Contract`], if any.
    ///
    /// [`None`] for request kinds tracked without a financing contract.
    ///
    /// [`Contract`]: crate::domain::Contract
    pub contract_id: Option<contract::Id>,

    /// ID of the applicant.
    pub applicant_id: user::Id,

    /// Kind of the applicant entity.
    pub applicant_kind: ApplicantKind,

    /// Per-phase review statuses of this [`Application`].
    pub phases: Phases,

    /// ID of the capital provider [`User`] assigned to this
    /// [`Application`].
    ///
    /// [`User`]: crate::domain::User
    pub capital_provider_id: Option<user::Id>,

    /// Append-only log of [`Notification`]s produced by workflow
    /// transitions.
    ///
    /// Delivery is the dispatcher's concern and never affects the log.
    pub notifications: Vec<Notification>,

    /// [`DateTime`] when this [`Application`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Application`] was last updated.
    pub updated_at: UpdateDateTime,

    /// Optimistic-concurrency [`Version`] of this [`Application`].
    pub version: Version,
}

impl Application {
    /// Appends the provided [`Notification`] to the log of this
    /// [`Application`].
    pub fn push_notification(
        &mut self,
        notification: Notification,
        now: UpdateDateTime,
    ) {
        self.notifications.push(notification);
        self.touch(now);
    }

    /// Advances the provided [`Phase`] of this [`Application`] to the `to`
    /// [`PhaseStatus`].
    ///
    /// # Errors
    ///
    /// Returns a [`RegressionError`] if the [`Phase`] would move backwards
    /// or leave a settled status.
    pub fn advance_phase(
        &mut self,
        phase: Phase,
        to: PhaseStatus,
        now: UpdateDateTime,
    ) -> Result<(), RegressionError> {
        self.phases.advance(phase, to)?;
        self.touch(now);
        Ok(())
    }

    /// Assigns the provided capital provider to this [`Application`].
    pub fn assign_capital_provider(
        &mut self,
        capital_provider_id: user::Id,
        now: UpdateDateTime,
    ) {
        self.capital_provider_id = Some(capital_provider_id);
        self.touch(now);
    }

    /// Bumps the [`Version`] and update timestamp of this [`Application`].
    fn touch(&mut self, now: UpdateDateTime) {
        self.updated_at = now;
        self.version = self.version.next();
    }
}

/// ID of an [`Application`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Kind of an [`Application`] applicant."]
    enum ApplicantKind {
        #[doc = "Individual customer."]
        Customer = 1,

        #[doc = "Vehicle service provider."]
        ServiceProvider = 2,
    }
}

/// Per-phase review statuses of an [`Application`].
///
/// Phases only ever advance; regressing one is a [`RegressionError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Phases {
    /// Shariah scholar review phase.
    pub scholar: PhaseStatus,

    /// Capital provider financial review phase.
    pub finance: PhaseStatus,

    /// Partner assignment phase.
    pub partners: PhaseStatus,
}

impl Phases {
    /// Advances the provided [`Phase`] to the `to` [`PhaseStatus`].
    ///
    /// # Errors
    ///
    /// Returns a [`RegressionError`] if the [`Phase`] would move backwards
    /// or leave a settled status.
    pub fn advance(
        &mut self,
        phase: Phase,
        to: PhaseStatus,
    ) -> Result<(), RegressionError> {
        let current = match phase {
            Phase::Scholar => &mut self.scholar,
            Phase::Finance => &mut self.finance,
            Phase::Partners => &mut self.partners,
        };
        if (current.is_settled() && to != *current) || to.u8() < current.u8()
        {
            return Err(RegressionError {
                phase,
                from: *current,
                to,
            });
        }
        *current = to;
        Ok(())
    }
}

impl Default for Phases {
    fn default() -> Self {
        Self {
            scholar: PhaseStatus::Queued,
            finance: PhaseStatus::Queued,
            partners: PhaseStatus::Queued,
        }
    }
}

define_kind! {
    #[doc = "Review phase of an [`Application`]."]
    enum Phase {
        #[doc = "Shariah scholar review."]
        Scholar = 1,

        #[doc = "Capital provider financial review."]
        Finance = 2,

        #[doc = "Partner assignment."]
        Partners = 3,
    }
}

define_kind! {
    #[doc = "Status of a single [`Application`] review [`Phase`]."]
    enum PhaseStatus {
        #[doc = "The [`Phase`] is waiting to be picked up."]
        Queued = 1,

        #[doc = "The [`Phase`] is being worked on."]
        InProgress = 2,

        #[doc = "The [`Phase`] is approved. Settled."]
        Approved = 3,

        #[doc = "The [`Phase`] is rejected. Settled."]
        Rejected = 4,
    }
}

impl PhaseStatus {
    /// Returns whether this [`PhaseStatus`] is settled and cannot change
    /// anymore.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// Error of moving an [`Application`] [`Phase`] backwards.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("cannot move `{phase}` phase from `{from}` to `{to}`")]
pub struct RegressionError {
    /// [`Phase`] that was advanced.
    pub phase: Phase,

    /// [`PhaseStatus`] the [`Phase`] was in.
    pub from: PhaseStatus,

    /// [`PhaseStatus`] the [`Phase`] was advanced to.
    pub to: PhaseStatus,
}

pub mod notification {
    //! [`Notification`] definitions.

    use common::{define_kind, unit, DateTimeOf};

    #[cfg(doc)]
    use common::DateTime;

    use super::Application;

    /// Human-readable record of a workflow transition, appended to an
    /// [`Application`]'s log.
    #[derive(Clone, Debug)]
    pub struct Notification {
        /// [`Kind`] of this [`Notification`].
        pub kind: Kind,

        /// Short title of this [`Notification`].
        pub title: String,

        /// Body of this [`Notification`].
        pub body: String,

        /// [`Priority`] of this [`Notification`].
        pub priority: Priority,

        /// [`DateTime`] when this [`Notification`] was produced.
        pub created_at: CreationDateTime,

        /// Whether the recipient has read this [`Notification`].
        pub read: bool,
    }

    impl Notification {
        /// Creates a new unread [`Notification`] with the provided
        /// parameters.
        #[must_use]
        pub fn new(
            kind: Kind,
            title: impl Into<String>,
            body: impl Into<String>,
            priority: Priority,
            now: CreationDateTime,
        ) -> Self {
            Self {
                kind,
                title: title.into(),
                body: body.into(),
                priority,
                created_at: now,
                read: false,
            }
        }
    }

    define_kind! {
        #[doc = "Kind of a [`Notification`]."]
        enum Kind {
            #[doc = "A workflow status changed."]
            StatusChange = 1,

            #[doc = "A review was approved."]
            Approval = 2,

            #[doc = "A party was assigned."]
            Assignment = 3,
        }
    }

    define_kind! {
        #[doc = "Priority of a [`Notification`]."]
        enum Priority {
            #[doc = "Informational."]
            Low = 1,

            #[doc = "Default priority."]
            Normal = 2,

            #[doc = "Requires the recipient's action."]
            High = 3,
        }
    }

    /// [`DateTime`] when a [`Notification`] was produced.
    pub type CreationDateTime =
        DateTimeOf<(Application, Notification, unit::Creation)>;
}

/// [`DateTime`] when an [`Application`] was created.
pub type CreationDateTime = DateTimeOf<(Application, unit::Creation)>;

/// [`DateTime`] when an [`Application`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Application, unit::Update)>;

#[cfg(test)]
mod spec {
    use super::{Phase, Phases, PhaseStatus};

    #[test]
    fn phases_only_advance() {
        let mut phases = Phases::default();

        phases.advance(Phase::Scholar, PhaseStatus::InProgress).unwrap();
        phases.advance(Phase::Scholar, PhaseStatus::Approved).unwrap();

        // Regressing or reopening a settled phase is refused.
        assert!(phases
            .advance(Phase::Scholar, PhaseStatus::InProgress)
            .is_err());
        assert!(phases
            .advance(Phase::Scholar, PhaseStatus::Rejected)
            .is_err());

        // Settled status is idempotent.
        phases.advance(Phase::Scholar, PhaseStatus::Approved).unwrap();

        // Other phases are independent.
        phases.advance(Phase::Finance, PhaseStatus::InProgress).unwrap();
        assert!(phases
            .advance(Phase::Finance, PhaseStatus::Queued)
            .is_err());
    }
}
