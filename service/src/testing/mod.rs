//! Test doubles shared between test modules.

#[cfg(feature = "http")]
mod api;

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use common::{Clock, DateTime};

use crate::domain::user::{self, Identity};

#[cfg(feature = "http")]
pub(crate) use self::api::{service, ticket};
pub(crate) use crate::domain::user::session::spec::token;

/// [`Clock`] moved by hand.
#[derive(Clone, Debug)]
pub(crate) struct ManualClock(Arc<Mutex<DateTime>>);

impl ManualClock {
    /// Creates a new [`ManualClock`] showing the provided Unix `timestamp`.
    pub(crate) fn at(timestamp: i64) -> Self {
        Self(Arc::new(Mutex::new(
            DateTime::from_unix_timestamp(timestamp).unwrap(),
        )))
    }

    /// Moves this [`ManualClock`] forward.
    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds an [`Identity`].
pub(crate) fn identity(id: &str, username: &str) -> Identity {
    Identity {
        id: id.into(),
        username: user::Name::new(username).unwrap(),
    }
}
