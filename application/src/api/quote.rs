//! `Quote`-related definitions.

use std::time::Duration;

use axum::{extract::Path, Extension, Json};
use common::{DateTime, Money};
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, quote, user, vehicle},
    query, Command as _,
};
use uuid::Uuid;

use crate::{api, define_error, AsError, Context, Error, Service};

define_error! {
    enum QuoteError {
        #[code = "QUOTE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Quote` with the provided ID doesn't exist"]
        NotExists,

        #[code = "INVALID_QUOTE_STATE"]
        #[status = BAD_REQUEST]
        #[message = "`Quote` status doesn't allow the requested operation"]
        InvalidState,
    }
}

/// Request body for requesting a new `Quote`.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the `Vehicle` to be quoted.
    pub vehicle_id: vehicle::Id,

    /// Validity period of the `Quote` (e.g. `7days`).
    #[serde(default, with = "humantime_serde::option")]
    pub validity: Option<Duration>,

    /// Expected delivery period (e.g. `3days`).
    #[serde(default, with = "humantime_serde::option")]
    pub delivery: Option<Duration>,
}

/// Requests a new `Quote` for a `Vehicle` on behalf of the current customer
/// `User`.
///
/// Possible error codes:
/// - `USER_NOT_EXISTS` - the current `User` doesn't exist;
/// - `WRONG_ROLE` - the current `User` is not a customer;
/// - `VEHICLE_NOT_EXISTS` - the referenced `Vehicle` doesn't exist;
/// - `VEHICLE_UNAVAILABLE` - the referenced `Vehicle` is not available.
pub async fn request(
    Extension(service): Extension<Service>,
    ctx: Context,
    Json(req): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<Quote>), Error> {
    let CreateRequest {
        vehicle_id,
        validity,
        delivery,
    } = req;

    service
        .execute(command::RequestQuote {
            customer_id: ctx.user_id,
            vehicle_id,
            validity,
            delivery,
        })
        .await
        .map_err(AsError::into_error)
        .map(|q| {
            (http::StatusCode::CREATED, Json(Quote::new(q, DateTime::now())))
        })
}

/// Returns the `Quote` with the provided ID.
///
/// Possible error codes:
/// - `QUOTE_NOT_EXISTS` - the `Quote` doesn't exist or the current `User` is
///                        not a party of it.
pub async fn by_id(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, Error> {
    service
        .execute(query::quote::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .filter(|q| q.customer_id == ctx.user_id || q.provider_id == ctx.user_id)
        .map(|q| Json(Quote::new(q, DateTime::now())))
        .ok_or_else(|| QuoteError::NotExists.into())
}

/// Sends the drafted `Quote` with the provided ID to its customer.
///
/// Possible error codes:
/// - `QUOTE_NOT_EXISTS` - the `Quote` doesn't exist or isn't issued by the
///                        current `User`;
/// - `INVALID_QUOTE_STATE` - the `Quote` status doesn't allow the sending.
pub async fn send(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, Error> {
    service
        .execute(command::SendQuote {
            quote_id: id.into(),
            provider_id: ctx.user_id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|q| Json(Quote::new(q, DateTime::now())))
}

/// Marks the `Quote` with the provided ID as viewed by its customer.
///
/// Possible error codes:
/// - `QUOTE_NOT_EXISTS` - the `Quote` doesn't exist or isn't addressed to
///                        the current `User`;
/// - `INVALID_QUOTE_STATE` - the `Quote` status doesn't allow the marking.
pub async fn view(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Quote>, Error> {
    service
        .execute(command::MarkQuoteViewed {
            quote_id: id.into(),
            customer_id: ctx.user_id,
        })
        .await
        .map_err(AsError::into_error)
        .map(|q| Json(Quote::new(q, DateTime::now())))
}

/// Request body for responding to a `Quote`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResponseRequest {
    /// Message accompanying the response.
    pub message: Option<String>,

    /// Revised pricing of the `Quote`.
    pub pricing: Option<PricingRequest>,

    /// Revised validity period of the `Quote` (e.g. `7days`).
    #[serde(default, with = "humantime_serde::option")]
    pub validity: Option<Duration>,

    /// Revised delivery period (e.g. `3days`).
    #[serde(default, with = "humantime_serde::option")]
    pub delivery: Option<Duration>,
}

/// Revised pricing of a `Quote`.
#[derive(Clone, Debug, Deserialize)]
pub struct PricingRequest {
    /// Base price of the quoted `Vehicle` (e.g. `85000SAR`).
    pub base_price: String,

    /// Total price of the `Quote` (e.g. `86000SAR`).
    pub total_price: String,
}

impl TryFrom<PricingRequest> for quote::Pricing {
    type Error = Error;

    fn try_from(pricing: PricingRequest) -> Result<Self, Self::Error> {
        let PricingRequest {
            base_price,
            total_price,
        } = pricing;

        Ok(Self {
            base_price: base_price
                .parse::<Money>()
                .map_err(|_| api::invalid_field("base_price"))?,
            total_price: total_price
                .parse::<Money>()
                .map_err(|_| api::invalid_field("total_price"))?,
        })
    }
}

/// Responds to the `Quote` with the provided ID on behalf of the current
/// `User`.
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - a request field is malformed;
/// - `USER_NOT_EXISTS` - the current `User` doesn't exist;
/// - `QUOTE_NOT_EXISTS` - the `Quote` doesn't exist or the current `User`
///                        cannot respond to it;
/// - `INVALID_QUOTE_STATE` - the `Quote` status doesn't allow the response.
pub async fn respond(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
    Json(req): Json<ResponseRequest>,
) -> Result<Json<Quote>, Error> {
    let ResponseRequest {
        message,
        pricing,
        validity,
        delivery,
    } = req;

    service
        .execute(command::RespondToQuote {
            quote_id: id.into(),
            responder_id: ctx.user_id,
            message: message.map(Into::into),
            pricing: pricing.map(TryInto::try_into).transpose()?,
            validity,
            delivery,
        })
        .await
        .map_err(AsError::into_error)
        .map(|q| Json(Quote::new(q, DateTime::now())))
}

/// Request body for settling a `Quote`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SettleRequest {
    /// Note to attach to the `Quote` thread.
    pub note: Option<String>,
}

/// Accepts the `Quote` with the provided ID on behalf of the current
/// customer `User`.
///
/// Possible error codes:
/// - `QUOTE_NOT_EXISTS` - the `Quote` doesn't exist or isn't addressed to
///                        the current `User`;
/// - `INVALID_QUOTE_STATE` - the `Quote` status doesn't allow the
///                           acceptance.
pub async fn accept(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
    Json(req): Json<SettleRequest>,
) -> Result<Json<Quote>, Error> {
    let SettleRequest { note } = req;

    service
        .execute(command::AcceptQuote {
            quote_id: id.into(),
            customer_id: ctx.user_id,
            note: note.map(Into::into),
        })
        .await
        .map_err(AsError::into_error)
        .map(|q| Json(Quote::new(q, DateTime::now())))
}

/// Rejects the `Quote` with the provided ID on behalf of the current
/// customer `User`.
///
/// Possible error codes:
/// - `QUOTE_NOT_EXISTS` - the `Quote` doesn't exist or isn't addressed to
///                        the current `User`;
/// - `INVALID_QUOTE_STATE` - the `Quote` status doesn't allow the
///                           rejection.
pub async fn reject(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
    Json(req): Json<SettleRequest>,
) -> Result<Json<Quote>, Error> {
    let SettleRequest { note } = req;

    service
        .execute(command::RejectQuote {
            quote_id: id.into(),
            customer_id: ctx.user_id,
            note: note.map(Into::into),
        })
        .await
        .map_err(AsError::into_error)
        .map(|q| Json(Quote::new(q, DateTime::now())))
}

/// Request body for posting a message into a `Quote` thread.
#[derive(Clone, Debug, Deserialize)]
pub struct MessageRequest {
    /// Text of the message.
    pub text: String,

    /// Attachment references of the message.
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Posts a message into the thread of the `Quote` with the provided ID.
///
/// Possible error codes:
/// - `USER_NOT_EXISTS` - the current `User` doesn't exist;
/// - `QUOTE_NOT_EXISTS` - the `Quote` doesn't exist or the current `User` is
///                        not a party of it;
/// - `INVALID_QUOTE_STATE` - the `Quote` has already been settled.
pub async fn add_message(
    Extension(service): Extension<Service>,
    ctx: Context,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<Quote>, Error> {
    let MessageRequest { text, attachments } = req;

    service
        .execute(command::AddQuoteMessage {
            quote_id: id.into(),
            sender_id: ctx.user_id,
            text: text.into(),
            attachments,
        })
        .await
        .map_err(AsError::into_error)
        .map(|q| Json(Quote::new(q, DateTime::now())))
}

/// A price `Quote` negotiated between a customer and a service provider.
#[derive(Clone, Debug, Serialize)]
pub struct Quote {
    /// Unique identifier of this `Quote`.
    pub id: quote::Id,

    /// ID of the customer `User`.
    pub customer_id: user::Id,

    /// ID of the service provider `User`.
    pub provider_id: user::Id,

    /// ID of the quoted `Vehicle`.
    pub vehicle_id: vehicle::Id,

    /// Current status of this `Quote`, with expiration taken into account.
    pub status: String,

    /// Pricing of this `Quote`.
    pub pricing: Pricing,

    /// Terms of this `Quote`.
    pub terms: Terms,

    /// Latest provider response to this `Quote`, if any.
    pub response: Option<Response>,

    /// Message thread of this `Quote`, oldest first.
    pub messages: Vec<Message>,

    /// [RFC 3339] timestamp of when this `Quote` expires.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub expires_at: String,

    /// [RFC 3339] timestamp of when this `Quote` was created.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] timestamp of when this `Quote` was last updated.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub updated_at: String,
}

impl Quote {
    /// Creates a new [`Quote`] representation of the provided
    /// [`domain::Quote`], deriving its status at the provided moment.
    #[must_use]
    pub fn new(quote: domain::Quote, now: DateTime) -> Self {
        let status = quote.status(now);
        let domain::Quote {
            id,
            customer_id,
            provider_id,
            vehicle_id,
            pricing,
            terms,
            response,
            messages,
            expires_at,
            created_at,
            updated_at,
            ..
        } = quote;

        Self {
            id,
            customer_id,
            provider_id,
            vehicle_id,
            status: status.to_string(),
            pricing: pricing.into(),
            terms: terms.into(),
            response: response.map(Into::into),
            messages: messages.into_iter().map(Into::into).collect(),
            expires_at: expires_at.to_rfc3339(),
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
        }
    }
}

/// Pricing of a `Quote`.
#[derive(Clone, Debug, Serialize)]
pub struct Pricing {
    /// Base price of the quoted `Vehicle`.
    pub base_price: String,

    /// Total price of the `Quote`.
    pub total_price: String,
}

impl From<quote::Pricing> for Pricing {
    fn from(pricing: quote::Pricing) -> Self {
        let quote::Pricing {
            base_price,
            total_price,
        } = pricing;

        Self {
            base_price: base_price.to_string(),
            total_price: total_price.to_string(),
        }
    }
}

/// Terms of a `Quote`.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Terms {
    /// Validity period of the `Quote`.
    #[serde(with = "humantime_serde")]
    pub validity: Duration,

    /// Expected delivery period.
    #[serde(with = "humantime_serde::option")]
    pub delivery: Option<Duration>,
}

impl From<quote::Terms> for Terms {
    fn from(terms: quote::Terms) -> Self {
        let quote::Terms { validity, delivery } = terms;

        Self { validity, delivery }
    }
}

/// A provider response to a `Quote`.
#[derive(Clone, Debug, Serialize)]
pub struct Response {
    /// ID of the `User` who responded.
    pub responder_id: user::Id,

    /// Message accompanying the response.
    pub message: Option<String>,

    /// Revised pricing of the `Quote`.
    pub pricing: Option<Pricing>,

    /// Revised validity period of the `Quote`.
    #[serde(with = "humantime_serde::option")]
    pub validity: Option<Duration>,

    /// Revised delivery period.
    #[serde(with = "humantime_serde::option")]
    pub delivery: Option<Duration>,

    /// [RFC 3339] timestamp of when the response was made.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub responded_at: String,
}

impl From<quote::Response> for Response {
    fn from(response: quote::Response) -> Self {
        let quote::Response {
            responder_id,
            message,
            pricing,
            validity,
            delivery,
            responded_at,
        } = response;

        Self {
            responder_id,
            message: message.map(Into::into),
            pricing: pricing.map(Into::into),
            validity,
            delivery,
            responded_at: responded_at.to_rfc3339(),
        }
    }
}

/// A message in a `Quote` thread.
#[derive(Clone, Debug, Serialize)]
pub struct Message {
    /// ID of the `User` who sent the message.
    pub sender_id: user::Id,

    /// Role of the sender.
    pub sender_role: String,

    /// Text of the message.
    pub text: String,

    /// Attachment references of the message.
    pub attachments: Vec<String>,

    /// [RFC 3339] timestamp of when the message was sent.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub sent_at: String,
}

impl From<quote::Message> for Message {
    fn from(message: quote::Message) -> Self {
        let quote::Message {
            sender_id,
            sender_role,
            text,
            attachments,
            sent_at,
        } = message;

        Self {
            sender_id,
            sender_role: sender_role.to_string(),
            text: text.into(),
            attachments,
            sent_at: sent_at.to_rfc3339(),
        }
    }
}

impl AsError for command::request_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_NOT_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "Referenced `User` doesn't exist"]
                UserNotExists,

                #[code = "WRONG_ROLE"]
                #[status = BAD_REQUEST]
                #[message = "Referenced `User` doesn't have the expected \
                             role"]
                WrongRole,

                #[code = "VEHICLE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Vehicle` with the provided ID doesn't exist"]
                VehicleNotExists,

                #[code = "VEHICLE_UNAVAILABLE"]
                #[status = CONFLICT]
                #[message = "`Vehicle` with the provided ID is not available \
                             for quoting"]
                VehicleUnavailable,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(Error::UserNotExists.into()),
            Self::WrongRole { .. } => Some(Error::WrongRole.into()),
            Self::VehicleNotExists(_) => Some(Error::VehicleNotExists.into()),
            Self::VehicleUnavailable { .. } => {
                Some(Error::VehicleUnavailable.into())
            }
        }
    }
}

impl AsError for command::send_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::QuoteNotExists(_) => Some(QuoteError::NotExists.into()),
            Self::Transition(_) => Some(QuoteError::InvalidState.into()),
        }
    }
}

impl AsError for command::mark_quote_viewed::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::QuoteNotExists(_) => Some(QuoteError::NotExists.into()),
            Self::Transition(_) => Some(QuoteError::InvalidState.into()),
        }
    }
}

impl AsError for command::respond_to_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_NOT_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "Referenced `User` doesn't exist"]
                UserNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(Error::UserNotExists.into()),
            Self::QuoteNotExists(_) => Some(QuoteError::NotExists.into()),
            Self::Transition(_) => Some(QuoteError::InvalidState.into()),
        }
    }
}

impl AsError for command::accept_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::QuoteNotExists(_) => Some(QuoteError::NotExists.into()),
            Self::Transition(_) => Some(QuoteError::InvalidState.into()),
        }
    }
}

impl AsError for command::reject_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::QuoteNotExists(_) => Some(QuoteError::NotExists.into()),
            Self::Transition(_) => Some(QuoteError::InvalidState.into()),
        }
    }
}

impl AsError for command::add_quote_message::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USER_NOT_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "Referenced `User` doesn't exist"]
                UserNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(Error::UserNotExists.into()),
            Self::QuoteNotExists(_) => Some(QuoteError::NotExists.into()),
            Self::Transition(_) => Some(QuoteError::InvalidState.into()),
        }
    }
}
