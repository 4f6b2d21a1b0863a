//! [`Vehicle`] catalog item definitions.
//!
//! Catalog CRUD lives outside this service: the workflow only reads a
//! price snapshot at contract or quote creation time and bumps the
//! inquiry counter on quote requests.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{user, Version};

/// Vehicle listed in the marketplace catalog.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: Id,

    /// ID of the service provider [`User`] owning this [`Vehicle`].
    ///
    /// [`User`]: crate::domain::User
    pub provider_id: user::Id,

    /// [`Make`] of this [`Vehicle`].
    pub make: Make,

    /// [`Model`] of this [`Vehicle`].
    pub model: Model,

    /// Production [`Year`] of this [`Vehicle`].
    pub year: Year,

    /// Listed price of this [`Vehicle`].
    pub price: Money,

    /// [`Availability`] of this [`Vehicle`].
    pub availability: Availability,

    /// Number of quote inquiries received for this [`Vehicle`].
    pub inquiry_count: u64,

    /// [`DateTime`] when this [`Vehicle`] was listed.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Vehicle`] was last updated.
    pub updated_at: UpdateDateTime,

    /// Optimistic-concurrency [`Version`] of this [`Vehicle`].
    pub version: Version,
}

impl Vehicle {
    /// Records a new quote inquiry upon this [`Vehicle`].
    pub fn record_inquiry(&mut self, now: UpdateDateTime) {
        self.inquiry_count = self.inquiry_count.saturating_add(1);
        self.updated_at = now;
        self.version = self.version.next();
    }
}

/// ID of a [`Vehicle`].
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

/// Make of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Make(String);

impl Make {
    /// Creates a new [`Make`] if the given `make` is valid.
    #[must_use]
    pub fn new(make: impl Into<String>) -> Option<Self> {
        let make = make.into();
        Self::check(&make).then_some(Self(make))
    }

    /// Checks whether the given `make` is a valid [`Make`].
    fn check(make: impl AsRef<str>) -> bool {
        let make = make.as_ref();
        make.trim() == make && !make.is_empty() && make.len() <= 128
    }
}

impl FromStr for Make {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Make`")
    }
}

/// Model of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Model(String);

impl Model {
    /// Creates a new [`Model`] if the given `model` is valid.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Option<Self> {
        let model = model.into();
        Self::check(&model).then_some(Self(model))
    }

    /// Checks whether the given `model` is a valid [`Model`].
    fn check(model: impl AsRef<str>) -> bool {
        let model = model.as_ref();
        model.trim() == model && !model.is_empty() && model.len() <= 128
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Model`")
    }
}

/// Production year of a [`Vehicle`].
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
pub struct Year(u16);

impl Year {
    /// Creates a new [`Year`] if the given `year` is within a sane range.
    #[must_use]
    pub fn new(year: u16) -> Option<Self> {
        (1950..=2100).contains(&year).then_some(Self(year))
    }
}

define_kind! {
    #[doc = "Availability of a [`Vehicle`] in the catalog."]
    enum Availability {
        #[doc = "The [`Vehicle`] is available for financing and quoting."]
        Available = 1,

        #[doc = "The [`Vehicle`] is reserved by another customer."]
        Reserved = 2,

        #[doc = "The [`Vehicle`] is sold."]
        Sold = 3,
    }
}

/// [`DateTime`] when a [`Vehicle`] was listed.
pub type CreationDateTime = DateTimeOf<(Vehicle, unit::Creation)>;

/// [`DateTime`] when a [`Vehicle`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Vehicle, unit::Update)>;
