//! AI-generated [`LearningPlan`] definitions.

use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

/// Set of learning [`Resource`]s generated for an [`Interest`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LearningPlan {
    /// Generated [`Resource`]s, possibly none.
    pub resources: Vec<Resource>,
}

/// Single learning resource.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Resource {
    /// Free-form kind of this [`Resource`] (video, article, documentation,
    /// ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// Title of this [`Resource`].
    pub title: String,

    /// URL this [`Resource`] is available at.
    pub url: String,
}

/// Field a user wants to learn about.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[serde(transparent)]
pub struct Interest(String);

impl Interest {
    /// Creates a new [`Interest`] if the given `interest` is not blank.
    #[must_use]
    pub fn new(interest: impl Into<String>) -> Option<Self> {
        let interest = interest.into();
        (!interest.trim().is_empty()).then_some(Self(interest))
    }
}

/// Operation generating a [`LearningPlan`] for an [`Interest`].
#[derive(Clone, Debug)]
pub struct Generate(pub Interest);
