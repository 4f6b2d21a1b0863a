//! Financing [`Contract`] definitions.

pub mod terms;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{user, vehicle, RiskAssessment, Version};

pub use self::terms::{FinancialTerms, PaymentSchedule, Terms};

/// Murabaha vehicle-financing contract between a customer, a service
/// provider and, once assigned, a capital provider.
#[derive(Clone, Debug)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// Human-readable sequence [`Number`] of this [`Contract`].
    pub number: Number,

    /// ID of the customer [`User`] owning this [`Contract`].
    ///
    /// Immutable after creation.
    ///
    /// [`User`]: crate::domain::User
    pub customer_id: user::Id,

    /// ID of the service provider [`User`] supplying the financed
    /// [`Vehicle`].
    ///
    /// [`User`]: crate::domain::User
    /// [`Vehicle`]: crate::domain::Vehicle
    pub provider_id: user::Id,

    /// ID of the financed [`Vehicle`].
    ///
    /// [`Vehicle`]: crate::domain::Vehicle
    pub vehicle_id: vehicle::Id,

    /// ID of the capital provider [`User`] assigned on Shariah approval.
    ///
    /// [`User`]: crate::domain::User
    pub capital_provider_id: Option<user::Id>,

    /// [`FinancialTerms`] of this [`Contract`].
    ///
    /// Immutable once the [`Status`] leaves [`Status::Draft`].
    pub financial_terms: FinancialTerms,

    /// Installment [`PaymentSchedule`] of this [`Contract`].
    pub payment_schedule: PaymentSchedule,

    /// Contractual [`Terms`] of this [`Contract`].
    pub terms: Terms,

    /// [`RiskAssessment`] attached to this [`Contract`], if computed.
    pub risk_assessment: Option<RiskAssessment>,

    /// [`Status`] of this [`Contract`].
    pub status: Status,

    /// [`Reviews`] recorded upon this [`Contract`].
    pub reviews: Reviews,

    /// [`Negotiation`] opened upon this [`Contract`], if any.
    pub negotiation: Option<Negotiation>,

    /// [`DateTime`] when this [`Contract`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Contract`] was last updated.
    pub updated_at: UpdateDateTime,

    /// Optimistic-concurrency [`Version`] of this [`Contract`].
    pub version: Version,
}

impl Contract {
    /// Applies the provided [`Trigger`] to this [`Contract`], advancing its
    /// [`Status`] via the transition table.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if the current [`Status`] doesn't allow
    /// the [`Trigger`].
    pub fn apply(
        &mut self,
        trigger: Trigger,
        now: UpdateDateTime,
    ) -> Result<(), TransitionError> {
        let next = self.status.on(trigger).ok_or(TransitionError {
            from: self.status,
            trigger,
        })?;
        self.status = next;
        self.touch(now);
        Ok(())
    }

    /// Attaches the provided [`RiskAssessment`] to this [`Contract`],
    /// overwriting any previous one.
    pub fn attach_risk_assessment(
        &mut self,
        assessment: RiskAssessment,
        now: UpdateDateTime,
    ) {
        self.risk_assessment = Some(assessment);
        self.touch(now);
    }

    /// Records the Shariah scholar [`Review`] upon this [`Contract`].
    pub fn record_scholar_review(
        &mut self,
        review: Review,
        now: UpdateDateTime,
    ) {
        self.reviews.scholar = Some(review);
        self.touch(now);
    }

    /// Records the capital provider [`Review`] upon this [`Contract`].
    pub fn record_financial_review(
        &mut self,
        review: Review,
        now: UpdateDateTime,
    ) {
        self.reviews.financial = Some(review);
        self.touch(now);
    }

    /// Assigns the provided capital provider to this [`Contract`].
    pub fn assign_capital_provider(
        &mut self,
        capital_provider_id: user::Id,
        now: UpdateDateTime,
    ) {
        self.capital_provider_id = Some(capital_provider_id);
        self.touch(now);
    }

    /// Records the provided [`Negotiation`] upon this [`Contract`].
    pub fn open_negotiation(
        &mut self,
        negotiation: Negotiation,
        now: UpdateDateTime,
    ) {
        self.negotiation = Some(negotiation);
        self.touch(now);
    }

    /// Bumps the [`Version`] and update timestamp of this [`Contract`].
    fn touch(&mut self, now: UpdateDateTime) {
        self.updated_at = now;
        self.version = self.version.next();
    }
}

/// ID of a [`Contract`].
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

/// Human-readable sequence number of a [`Contract`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`] from the provided sequence value.
    #[must_use]
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("CTR-{seq:06}"))
    }
}

define_kind! {
    #[doc = "Status of a [`Contract`]."]
    enum Status {
        #[doc = "The [`Contract`] is being drafted by the customer."]
        Draft = 1,

        #[doc = "The formal document is generated, pending submission."]
        PendingApproval = 2,

        #[doc = "The [`Contract`] awaits a Shariah scholar review."]
        ScholarReview = 3,

        #[doc = "The [`Contract`] awaits a capital provider review."]
        FinancialReview = 4,

        #[doc = "Both reviews passed, awaiting customer acceptance."]
        Approved = 5,

        #[doc = "The customer accepted the terms. Terminal."]
        Accepted = 6,

        #[doc = "The customer opened a negotiation over the terms."]
        Negotiation = 7,
    }
}

impl Status {
    /// Returns the [`Status`] this one advances to on the provided
    /// [`Trigger`].
    ///
    /// [`None`] is returned in case of the transition is not allowed.
    ///
    /// No rejecting transition exists: a review either approves the
    /// [`Contract`] or leaves it where it is.
    #[must_use]
    pub fn on(self, trigger: Trigger) -> Option<Self> {
        use Trigger as T;

        match trigger {
            T::Generate => (self == Self::Draft).then_some(Self::PendingApproval),
            T::SubmitForReview => {
                (self == Self::PendingApproval).then_some(Self::ScholarReview)
            }
            T::ScholarApprove => {
                (self == Self::ScholarReview).then_some(Self::FinancialReview)
            }
            T::CapitalProviderApprove => {
                (self == Self::FinancialReview).then_some(Self::Approved)
            }
            T::AcceptTerms => (self == Self::Approved).then_some(Self::Accepted),
            T::InitiateNegotiation => {
                (self == Self::Approved).then_some(Self::Negotiation)
            }
        }
    }
}

/// Trigger advancing a [`Contract`] through its [`Status`] transitions.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Trigger {
    /// Generate the formal contract document.
    Generate,

    /// Submit the generated [`Contract`] for review.
    SubmitForReview,

    /// Approve the Shariah review.
    ScholarApprove,

    /// Approve the financial review.
    CapitalProviderApprove,

    /// Accept the approved terms.
    AcceptTerms,

    /// Open a negotiation over the approved terms.
    InitiateNegotiation,
}

/// Error of applying a [`Trigger`] to a [`Contract`] whose [`Status`]
/// doesn't allow it.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("cannot apply `{trigger}` to a `Contract` in `{from}` status")]
pub struct TransitionError {
    /// [`Status`] the [`Contract`] was in.
    pub from: Status,

    /// [`Trigger`] that was applied.
    pub trigger: Trigger,
}

/// Reviews recorded upon a [`Contract`].
#[derive(Clone, Debug, Default)]
pub struct Reviews {
    /// Shariah scholar [`Review`].
    pub scholar: Option<Review>,

    /// Capital provider [`Review`].
    pub financial: Option<Review>,
}

/// Single role-scoped review of a [`Contract`].
#[derive(Clone, Debug)]
pub struct Review {
    /// ID of the reviewing [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub reviewer_id: user::Id,

    /// [`Decision`] of this [`Review`].
    pub decision: Decision,

    /// Free-form [`Comments`] left by the reviewer.
    pub comments: Option<Comments>,

    /// [`DateTime`] when this [`Review`] was recorded.
    pub reviewed_at: ReviewDateTime,
}

define_kind! {
    #[doc = "Decision of a [`Review`].

Only an approving decision is modeled: the review workflow has no
rejecting terminal state, a contract either moves forward or stays
where it is."]
    enum Decision {
        #[doc = "The reviewer approved the [`Contract`]."]
        Approved = 1,
    }
}

/// Free-form comments of a [`Review`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Comments(String);

impl Comments {
    /// Creates a new [`Comments`] if the given `comments` are valid.
    #[must_use]
    pub fn new(comments: impl Into<String>) -> Option<Self> {
        let comments = comments.into();
        Self::check(&comments).then_some(Self(comments))
    }

    /// Checks whether the given `comments` are valid [`Comments`].
    fn check(comments: impl AsRef<str>) -> bool {
        let comments = comments.as_ref();
        comments.trim() == comments
            && !comments.is_empty()
            && comments.len() <= 2048
    }
}

impl FromStr for Comments {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Comments`")
    }
}

/// Negotiation opened by a customer over approved [`Contract`] terms.
///
/// Entering a negotiation is a dead end in the current workflow: no
/// resolution path back to [`Status::Approved`] is defined.
#[derive(Clone, Debug)]
pub struct Negotiation {
    /// [`Reason`] for opening this [`Negotiation`].
    pub reason: Reason,

    /// Free-form changes proposed by the customer.
    pub proposed_changes: ProposedChanges,

    /// [`DateTime`] when this [`Negotiation`] was opened.
    pub opened_at: NegotiationDateTime,
}

/// Reason for opening a [`Negotiation`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Reason(String);

impl Reason {
    /// Creates a new [`Reason`] if the given `reason` is valid.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        Self::check(&reason).then_some(Self(reason))
    }

    /// Checks whether the given `reason` is a valid [`Reason`].
    fn check(reason: impl AsRef<str>) -> bool {
        let reason = reason.as_ref();
        reason.trim() == reason && !reason.is_empty() && reason.len() <= 1024
    }
}

impl FromStr for Reason {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Reason`")
    }
}

/// Changes proposed in a [`Negotiation`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct ProposedChanges(String);

impl ProposedChanges {
    /// Creates a new [`ProposedChanges`] if the given `changes` are valid.
    #[must_use]
    pub fn new(changes: impl Into<String>) -> Option<Self> {
        let changes = changes.into();
        Self::check(&changes).then_some(Self(changes))
    }

    /// Checks whether the given `changes` are valid [`ProposedChanges`].
    fn check(changes: impl AsRef<str>) -> bool {
        let changes = changes.as_ref();
        changes.trim() == changes
            && !changes.is_empty()
            && changes.len() <= 4096
    }
}

impl FromStr for ProposedChanges {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ProposedChanges`")
    }
}

/// [`DateTime`] when a [`Contract`] was created.
pub type CreationDateTime = DateTimeOf<(Contract, unit::Creation)>;

/// [`DateTime`] when a [`Contract`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Contract, unit::Update)>;

/// [`DateTime`] when a [`Review`] was recorded.
pub type ReviewDateTime = DateTimeOf<(Contract, Review)>;

/// [`DateTime`] when a [`Negotiation`] was opened.
pub type NegotiationDateTime = DateTimeOf<(Contract, Negotiation)>;

#[cfg(test)]
mod spec {
    use super::{Status, Trigger};

    #[test]
    fn transition_table_is_closed() {
        use Status as S;
        use Trigger as T;

        assert_eq!(S::Draft.on(T::Generate), Some(S::PendingApproval));
        assert_eq!(
            S::PendingApproval.on(T::SubmitForReview),
            Some(S::ScholarReview),
        );
        assert_eq!(
            S::ScholarReview.on(T::ScholarApprove),
            Some(S::FinancialReview),
        );
        assert_eq!(
            S::FinancialReview.on(T::CapitalProviderApprove),
            Some(S::Approved),
        );
        assert_eq!(S::Approved.on(T::AcceptTerms), Some(S::Accepted));
        assert_eq!(
            S::Approved.on(T::InitiateNegotiation),
            Some(S::Negotiation),
        );

        // Skipping a review phase is never allowed.
        assert_eq!(S::ScholarReview.on(T::CapitalProviderApprove), None);
        assert_eq!(S::PendingApproval.on(T::ScholarApprove), None);
        assert_eq!(S::Draft.on(T::SubmitForReview), None);

        // Terminal and branch states accept nothing.
        for trigger in [
            T::Generate,
            T::SubmitForReview,
            T::ScholarApprove,
            T::CapitalProviderApprove,
            T::AcceptTerms,
            T::InitiateNegotiation,
        ] {
            assert_eq!(S::Accepted.on(trigger), None);
            assert_eq!(S::Negotiation.on(trigger), None);
        }
    }
}
