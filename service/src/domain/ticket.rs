//! [`Ticket`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

use crate::domain::plan;

/// Learning plan saved by a user, as listed in their collection.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ticket {
    /// ID of this [`Ticket`].
    pub id: Id,

    /// [`Topic`] this [`Ticket`] is about.
    pub topic: Topic,

    /// [`DateTime`] when this [`Ticket`] was saved.
    #[serde(with = "common::datetime::serde::iso8601")]
    pub created_at: CreationDateTime,

    /// Indicator whether this [`Ticket`] has been completed.
    #[serde(default)]
    pub completed: bool,
}

impl Ticket {
    /// Returns this [`Ticket`] with its completion status flipped.
    #[must_use]
    pub fn toggled(self) -> Self {
        Self {
            completed: !self.completed,
            ..self
        }
    }
}

/// Full view of a [`Ticket`] along with its learning resources.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Detail {
    /// ID of the [`Ticket`].
    pub id: Id,

    /// [`Topic`] of the [`Ticket`].
    pub topic: Topic,

    /// [`DateTime`] when the [`Ticket`] was saved.
    #[serde(with = "common::datetime::serde::iso8601")]
    pub created_at: CreationDateTime,

    /// [`plan::Resource`]s bundled into the [`Ticket`].
    #[serde(default)]
    pub resources: Vec<plan::Resource>,
}

/// [`Ticket`] to be saved.
#[derive(Clone, Debug, Serialize)]
pub struct New {
    /// [`Topic`] of the new [`Ticket`].
    pub topic: Topic,

    /// [`plan::Resource`]s to bundle into the new [`Ticket`].
    pub resources: Vec<plan::Resource>,
}

/// Operation flipping the completion status of a [`Ticket`] remotely.
#[derive(Clone, Copy, Debug, From)]
pub struct Toggle(pub Id);

/// ID of a [`Ticket`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Id(u64);

/// Topic of a [`Ticket`].
#[derive(AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Creates a new [`Topic`] if the given `topic` is valid.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Option<Self> {
        let topic = topic.into();
        Self::check(&topic).then_some(Self(topic))
    }

    /// Checks whether the given `topic` is a valid [`Topic`].
    fn check(topic: impl AsRef<str>) -> bool {
        !topic.as_ref().trim().is_empty()
    }
}

/// [`DateTime`] of a [`Ticket`] creation.
pub type CreationDateTime = DateTimeOf<(Ticket, unit::Creation)>;
