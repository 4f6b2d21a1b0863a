//! `Application` representations.

use serde::Serialize;
use service::domain::{self, application, contract, user};

/// An `Application` tracking the review pipeline of a `Contract`.
#[derive(Clone, Debug, Serialize)]
pub struct Application {
    /// Unique identifier of this `Application`.
    pub id: application::Id,

    /// ID of the `Contract` this `Application` tracks.
    pub contract_id: Option<contract::Id>,

    /// ID of the `User` the `Application` was filed by.
    pub applicant_id: user::Id,

    /// Kind of the applicant.
    pub applicant_kind: String,

    /// Review phases of this `Application`.
    pub phases: Phases,

    /// ID of the capital provider assigned to this `Application`.
    pub capital_provider_id: Option<user::Id>,

    /// Notifications issued for this `Application`, oldest first.
    pub notifications: Vec<Notification>,

    /// [RFC 3339] timestamp of when this `Application` was created.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] timestamp of when this `Application` was last updated.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub updated_at: String,
}

impl From<domain::Application> for Application {
    fn from(app: domain::Application) -> Self {
        let domain::Application {
            id,
            contract_id,
            applicant_id,
            applicant_kind,
            phases,
            capital_provider_id,
            notifications,
            created_at,
            updated_at,
            version: _,
        } = app;

        Self {
            id,
            contract_id,
            applicant_id,
            applicant_kind: applicant_kind.to_string(),
            phases: phases.into(),
            capital_provider_id,
            notifications: notifications.into_iter().map(Into::into).collect(),
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
        }
    }
}

/// Per-phase statuses of an `Application`.
#[derive(Clone, Debug, Serialize)]
pub struct Phases {
    /// Status of the Shariah compliance review.
    pub scholar: String,

    /// Status of the financial review.
    pub finance: String,

    /// Status of the capital partners onboarding.
    pub partners: String,
}

impl From<application::Phases> for Phases {
    fn from(phases: application::Phases) -> Self {
        let application::Phases {
            scholar,
            finance,
            partners,
        } = phases;

        Self {
            scholar: scholar.to_string(),
            finance: finance.to_string(),
            partners: partners.to_string(),
        }
    }
}

/// A notification issued for an `Application`.
#[derive(Clone, Debug, Serialize)]
pub struct Notification {
    /// Kind of this notification.
    pub kind: String,

    /// Short title of this notification.
    pub title: String,

    /// Detailed body of this notification.
    pub body: String,

    /// Priority of this notification.
    pub priority: String,

    /// [RFC 3339] timestamp of when this notification was issued.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub created_at: String,

    /// Indicator whether this notification has been read.
    pub read: bool,
}

impl From<application::Notification> for Notification {
    fn from(notification: application::Notification) -> Self {
        let application::Notification {
            kind,
            title,
            body,
            priority,
            created_at,
            read,
        } = notification;

        Self {
            kind: kind.to_string(),
            title,
            body,
            priority: priority.to_string(),
            created_at: created_at.to_rfc3339(),
            read,
        }
    }
}
