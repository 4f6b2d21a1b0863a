//! [`User`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Role`] of this [`User`] on the platform.
    pub role: Role,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
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

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

define_kind! {
    #[doc = "Role of a [`User`] on the platform."]
    enum Role {
        #[doc = "Individual customer requesting financing or quotes."]
        Customer = 1,

        #[doc = "Vehicle service provider listing catalog items."]
        ServiceProvider = 2,

        #[doc = "Shariah scholar reviewing financing contracts."]
        Scholar = 3,

        #[doc = "Capital provider institution funding contracts."]
        CapitalProvider = 4,

        #[doc = "Platform administrator."]
        Admin = 5,
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Name, Role};

    #[test]
    fn role_codec_is_screaming_snake_case() {
        assert_eq!(Role::ServiceProvider.to_string(), "SERVICE_PROVIDER");
        assert_eq!("CAPITAL_PROVIDER".parse::<Role>(), Ok(Role::CapitalProvider));
        assert!("scholar".parse::<Role>().is_err());
    }

    #[test]
    fn name_validates_on_creation() {
        let name = Name::new("Imran Hameed").unwrap();
        let raw: &str = name.as_ref();
        assert_eq!(raw, "Imran Hameed");

        assert_eq!(Name::new(""), None);
        assert_eq!(Name::new(" padded "), None);
    }
}
