//! [`Identity`] definitions.

pub mod session;

use std::str::FromStr;

use derive_more::{AsRef, Display, From, Into};
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Deserializer, Serialize};

pub use self::session::{Claims, Token};

/// Authenticated user as seen by the client.
///
/// This is the only user representation exposed outside of a session.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Identity {
    /// ID of the user.
    pub id: Id,

    /// [`Name`] of the user.
    pub username: Name,
}

/// ID of a user.
///
/// The server issues numeric IDs in exchange responses and stringified ones
/// in credential claims, so both forms are accepted.
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq, Serialize,
)]
#[as_ref(str)]
#[from(&str, String)]
#[serde(transparent)]
pub struct Id(String);

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        /// Raw representation of an [`Id`].
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Name of a user.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[serde(transparent)]
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
        name.trim() == name && !name.is_empty() && name.len() <= 80
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Names come from the authority, so only the presence is enforced.
        String::deserialize(deserializer).map(Self)
    }
}

/// Password of a user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Minimal number of characters a newly registered [`Password`] must
    /// have.
    pub const MIN_REGISTRATION_LEN: usize = 6;

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        !password.is_empty() && password.len() <= 128
    }

    /// Indicates whether this [`Password`] is long enough to be registered.
    #[must_use]
    pub fn is_registrable(&self) -> bool {
        self.0.chars().count() >= Self::MIN_REGISTRATION_LEN
    }

    /// Returns the raw value of this [`Password`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod spec {
    use super::{Id, Identity, Name, Password};

    #[test]
    fn id_accepts_numbers_and_strings() {
        let numeric: Identity =
            serde_json::from_str(r#"{"id":1,"username":"alice"}"#).unwrap();
        let textual: Identity =
            serde_json::from_str(r#"{"id":"1","username":"alice"}"#).unwrap();

        assert_eq!(numeric, textual);
        assert_eq!(numeric.id, Id::from("1"));
    }

    #[test]
    fn name_rejects_padding_and_empty() {
        assert!(Name::new("alice").is_some());
        assert!(Name::new(" alice").is_none());
        assert!(Name::new("").is_none());
    }

    #[test]
    fn password_registration_length() {
        assert!(!Password::new("12345").unwrap().is_registrable());
        assert!(Password::new("123456").unwrap().is_registrable());
        assert!(Password::new("").is_none());
    }
}
