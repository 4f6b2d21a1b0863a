//! [`Quote`] negotiation definitions.

use std::time::Duration;

use common::{define_kind, unit, DateTime, DateTimeOf, Money};
use derive_more::{Display, Error, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{user, vehicle, Version};

/// Price quote negotiated between a customer and a service provider over a
/// [`Vehicle`].
///
/// [`Vehicle`]: crate::domain::Vehicle
#[derive(Clone, Debug)]
pub struct Quote {
    /// ID of this [`Quote`].
    pub id: Id,

    /// ID of the customer [`User`] who requested this [`Quote`].
    ///
    /// [`User`]: crate::domain::User
    pub customer_id: user::Id,

    /// ID of the [`User`] providing the quoted [`Vehicle`].
    ///
    /// [`User`]: crate::domain::User
    /// [`Vehicle`]: crate::domain::Vehicle
    pub provider_id: user::Id,

    /// ID of the quoted [`Vehicle`].
    ///
    /// [`Vehicle`]: crate::domain::Vehicle
    pub vehicle_id: vehicle::Id,

    /// [`Pricing`] of this [`Quote`].
    pub pricing: Pricing,

    /// Commercial [`Terms`] of this [`Quote`].
    pub terms: Terms,

    /// Latest provider [`Response`], if any.
    ///
    /// Responding again overwrites the previous [`Response`].
    pub response: Option<Response>,

    /// Negotiation [`Message`] thread of this [`Quote`], append-only.
    pub messages: Vec<Message>,

    /// [`DateTime`] after which this [`Quote`] is considered
    /// [`Status::Expired`].
    pub expires_at: ExpirationDateTime,

    /// [`DateTime`] when this [`Quote`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Quote`] was last updated.
    pub updated_at: UpdateDateTime,

    /// Optimistic-concurrency [`Version`] of this [`Quote`].
    pub version: Version,

    /// Last stored [`Status`] of this [`Quote`].
    ///
    /// Expiry is never stored, so always read the current [`Status`] via
    /// [`Quote::status()`].
    status: Status,
}

impl Quote {
    /// Creates a new [`Quote`] in the [`Status::Draft`] with the provided
    /// parameters.
    #[must_use]
    pub fn new(
        customer_id: user::Id,
        provider_id: user::Id,
        vehicle_id: vehicle::Id,
        pricing: Pricing,
        terms: Terms,
        now: DateTime,
    ) -> Self {
        Self {
            id: Id::new(),
            customer_id,
            provider_id,
            vehicle_id,
            pricing,
            expires_at: (now + terms.validity).coerce(),
            terms,
            response: None,
            messages: Vec::new(),
            created_at: now.coerce(),
            updated_at: now.coerce(),
            version: Version::initial(),
            status: Status::Draft,
        }
    }

    /// Returns the current [`Status`] of this [`Quote`] at the provided
    /// moment.
    ///
    /// A non-terminal [`Quote`] past its [`Quote::expires_at`] is
    /// [`Status::Expired`], no matter what was stored.
    #[must_use]
    pub fn status(&self, now: DateTime) -> Status {
        if !self.status.is_terminal() && self.expires_at < now.coerce() {
            Status::Expired
        } else {
            self.status
        }
    }

    /// Sends this [`Quote`] to its customer.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if this [`Quote`] is not in the
    /// [`Status::Draft`].
    pub fn send(&mut self, now: DateTime) -> Result<(), TransitionError> {
        match self.status(now) {
            Status::Draft => {
                self.status = Status::Sent;
                self.touch(now);
                Ok(())
            }
            from @ (Status::Sent
            | Status::Viewed
            | Status::Responded
            | Status::Accepted
            | Status::Rejected
            | Status::Expired) => Err(TransitionError {
                from,
                trigger: Trigger::Send,
            }),
        }
    }

    /// Marks this [`Quote`] as viewed by its recipient.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if this [`Quote`] is neither
    /// [`Status::Sent`] nor [`Status::Responded`].
    pub fn mark_viewed(
        &mut self,
        now: DateTime,
    ) -> Result<(), TransitionError> {
        match self.status(now) {
            Status::Sent | Status::Responded => {
                self.status = Status::Viewed;
                self.touch(now);
                Ok(())
            }
            from @ (Status::Draft
            | Status::Viewed
            | Status::Accepted
            | Status::Rejected
            | Status::Expired) => Err(TransitionError {
                from,
                trigger: Trigger::MarkViewed,
            }),
        }
    }

    /// Records the provided provider [`Response`] on this [`Quote`],
    /// overwriting any previous one, and extends its validity window from
    /// the response moment.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if this [`Quote`] is already in a
    /// terminal [`Status`].
    pub fn respond(
        &mut self,
        response: Response,
        now: DateTime,
    ) -> Result<(), TransitionError> {
        match self.status(now) {
            Status::Draft | Status::Sent | Status::Viewed
            | Status::Responded => {
                if let Some(validity) = response.validity {
                    self.terms.validity = validity;
                }
                self.expires_at = (now + self.terms.validity).coerce();
                self.response = Some(response);
                self.status = Status::Responded;
                self.touch(now);
                Ok(())
            }
            from @ (Status::Accepted
            | Status::Rejected
            | Status::Expired) => Err(TransitionError {
                from,
                trigger: Trigger::Respond,
            }),
        }
    }

    /// Accepts this [`Quote`] on behalf of its customer, optionally
    /// recording the provided note in the [`Message`] thread.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if this [`Quote`] is neither
    /// [`Status::Sent`] nor [`Status::Viewed`], leaving the thread
    /// untouched.
    pub fn accept(
        &mut self,
        note: Option<Message>,
        now: DateTime,
    ) -> Result<(), TransitionError> {
        self.settle(Status::Accepted, Trigger::Accept, note, now)
    }

    /// Rejects this [`Quote`] on behalf of its customer, optionally
    /// recording the provided note in the [`Message`] thread.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if this [`Quote`] is neither
    /// [`Status::Sent`] nor [`Status::Viewed`], leaving the thread
    /// untouched.
    pub fn reject(
        &mut self,
        note: Option<Message>,
        now: DateTime,
    ) -> Result<(), TransitionError> {
        self.settle(Status::Rejected, Trigger::Reject, note, now)
    }

    /// Appends the provided [`Message`] to the thread of this [`Quote`].
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if this [`Quote`] is already in a
    /// terminal [`Status`].
    pub fn push_message(
        &mut self,
        message: Message,
        now: DateTime,
    ) -> Result<(), TransitionError> {
        match self.status(now) {
            Status::Draft | Status::Sent | Status::Viewed
            | Status::Responded => {
                self.messages.push(message);
                self.touch(now);
                Ok(())
            }
            from @ (Status::Accepted
            | Status::Rejected
            | Status::Expired) => Err(TransitionError {
                from,
                trigger: Trigger::Message,
            }),
        }
    }

    /// Settles this [`Quote`] into the provided terminal [`Status`].
    fn settle(
        &mut self,
        to: Status,
        trigger: Trigger,
        note: Option<Message>,
        now: DateTime,
    ) -> Result<(), TransitionError> {
        match self.status(now) {
            Status::Sent | Status::Viewed => {
                if let Some(note) = note {
                    self.messages.push(note);
                }
                self.status = to;
                self.touch(now);
                Ok(())
            }
            from @ (Status::Draft
            | Status::Responded
            | Status::Accepted
            | Status::Rejected
            | Status::Expired) => Err(TransitionError { from, trigger }),
        }
    }

    /// Bumps the [`Version`] and update timestamp of this [`Quote`].
    fn touch(&mut self, now: DateTime) {
        self.updated_at = now.coerce();
        self.version = self.version.next();
    }
}

/// ID of a [`Quote`].
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
    #[doc = "Status of a [`Quote`]."]
    enum Status {
        #[doc = "The [`Quote`] is being prepared."]
        Draft = 1,

        #[doc = "The [`Quote`] was sent to its customer."]
        Sent = 2,

        #[doc = "The customer has opened the [`Quote`]."]
        Viewed = 3,

        #[doc = "The provider has answered with a [`Response`]."]
        Responded = 4,

        #[doc = "The customer has accepted the [`Quote`]. Terminal."]
        Accepted = 5,

        #[doc = "The customer has rejected the [`Quote`]. Terminal."]
        Rejected = 6,

        #[doc = "The [`Quote`] validity window has passed. Terminal."]
        Expired = 7,
    }
}

impl Status {
    /// Returns whether this [`Status`] is terminal and cannot change
    /// anymore.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Expired)
    }
}

/// Workflow action attempted over a [`Quote`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Trigger {
    /// Sending a [`Quote`] to its customer.
    #[display("SEND")]
    Send,

    /// Marking a [`Quote`] as viewed.
    #[display("MARK_VIEWED")]
    MarkViewed,

    /// Answering a [`Quote`] with a [`Response`].
    #[display("RESPOND")]
    Respond,

    /// Accepting a [`Quote`].
    #[display("ACCEPT")]
    Accept,

    /// Rejecting a [`Quote`].
    #[display("REJECT")]
    Reject,

    /// Posting a [`Message`] into a [`Quote`] thread.
    #[display("MESSAGE")]
    Message,
}

/// Error of applying a [`Trigger`] to a [`Quote`] in a wrong [`Status`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("cannot apply `{trigger}` to a quote in `{from}` status")]
pub struct TransitionError {
    /// [`Status`] the [`Quote`] was in.
    pub from: Status,

    /// [`Trigger`] that was applied.
    pub trigger: Trigger,
}

/// Pricing of a [`Quote`].
#[derive(Clone, Copy, Debug)]
pub struct Pricing {
    /// Base price of the quoted [`Vehicle`].
    ///
    /// [`Vehicle`]: crate::domain::Vehicle
    pub base_price: Money,

    /// Total quoted price, including fees.
    pub total_price: Money,
}

/// Commercial terms of a [`Quote`].
#[derive(Clone, Copy, Debug)]
pub struct Terms {
    /// Period the [`Quote`] remains valid for.
    pub validity: Duration,

    /// Promised delivery period, if any.
    pub delivery: Option<Duration>,
}

/// Provider's answer to a [`Quote`].
#[derive(Clone, Debug)]
pub struct Response {
    /// ID of the responding [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub responder_id: user::Id,

    /// Free-form message accompanying this [`Response`].
    pub message: Option<Text>,

    /// Revised [`Pricing`], if the provider adjusted it.
    pub pricing: Option<Pricing>,

    /// Revised validity period, if the provider adjusted it.
    pub validity: Option<Duration>,

    /// Revised delivery period, if the provider adjusted it.
    pub delivery: Option<Duration>,

    /// [`DateTime`] when this [`Response`] was recorded.
    pub responded_at: ResponseDateTime,
}

/// Single message in a [`Quote`] negotiation thread.
#[derive(Clone, Debug)]
pub struct Message {
    /// ID of the [`User`] who sent this [`Message`].
    ///
    /// [`User`]: crate::domain::User
    pub sender_id: user::Id,

    /// [`Role`] of the sender at the moment of sending.
    ///
    /// [`Role`]: user::Role
    pub sender_role: user::Role,

    /// Text of this [`Message`].
    pub text: Text,

    /// Attachment references of this [`Message`].
    pub attachments: Vec<String>,

    /// [`DateTime`] when this [`Message`] was sent.
    pub sent_at: MessageDateTime,
}

/// Free-form text of a [`Quote`] [`Message`] or [`Response`].
#[derive(Clone, Debug, Display, Eq, From, Into, PartialEq)]
pub struct Text(String);

/// Marker of a [`Response`]-related type.
#[derive(Clone, Copy, Debug)]
pub struct Responding;

/// Marker of a [`Message`]-related type.
#[derive(Clone, Copy, Debug)]
pub struct Messaging;

/// [`DateTime`] after which a [`Quote`] is considered [`Status::Expired`].
pub type ExpirationDateTime = DateTimeOf<(Quote, unit::Expiration)>;

/// [`DateTime`] when a [`Quote`] was created.
pub type CreationDateTime = DateTimeOf<(Quote, unit::Creation)>;

/// [`DateTime`] when a [`Quote`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Quote, unit::Update)>;

/// [`DateTime`] when a [`Response`] was recorded.
pub type ResponseDateTime = DateTimeOf<(Quote, Responding)>;

/// [`DateTime`] when a [`Message`] was sent.
pub type MessageDateTime = DateTimeOf<(Quote, Messaging)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{user, vehicle};

    use super::{Pricing, Quote, Response, Status, Terms, Text};

    const DAY: Duration = Duration::from_secs(60 * 60 * 24);

    fn quote(validity: Duration) -> Quote {
        let price = Money {
            amount: Decimal::new(150_000, 0),
            currency: Currency::Sar,
        };
        Quote::new(
            user::Id::new(),
            user::Id::new(),
            vehicle::Id::new(),
            Pricing {
                base_price: price,
                total_price: price,
            },
            Terms {
                validity,
                delivery: None,
            },
            DateTime::now(),
        )
    }

    #[test]
    fn accepts_only_sent_or_viewed() {
        let now = DateTime::now();
        let mut q = quote(7 * DAY);

        assert!(q.accept(None, now).is_err());
        assert!(q.messages.is_empty());

        q.send(now).unwrap();
        q.mark_viewed(now).unwrap();
        q.accept(None, now).unwrap();
        assert_eq!(q.status(now), Status::Accepted);

        assert!(q.reject(None, now).is_err());
    }

    #[test]
    fn expiry_is_derived() {
        let now = DateTime::now();
        let mut q = quote(7 * DAY);
        q.send(now).unwrap();

        let later = now + 8 * DAY;
        assert_eq!(q.status(later), Status::Expired);
        assert!(q.accept(None, later).is_err());

        // Stored status is untouched until then.
        assert_eq!(q.status(now), Status::Sent);
    }

    #[test]
    fn responding_extends_validity() {
        let now = DateTime::now();
        let mut q = quote(DAY);
        q.send(now).unwrap();

        let tomorrow = now + DAY + Duration::from_secs(60 * 60);
        assert_eq!(q.status(tomorrow), Status::Expired);

        q.respond(
            Response {
                responder_id: q.provider_id,
                message: None,
                pricing: None,
                validity: Some(3 * DAY),
                delivery: None,
                responded_at: now.coerce(),
            },
            now,
        )
        .unwrap();
        assert_eq!(q.status(tomorrow), Status::Responded);
    }

    #[test]
    fn message_text_converts_from_and_into_string() {
        let text = Text::from("Is delivery included?".to_owned());
        assert_eq!(text.to_string(), "Is delivery included?");
        assert_eq!(String::from(text), "Is delivery included?");
    }
}
