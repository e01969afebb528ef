//! [`Query`] collection related to multiple [`Ticket`]s.

use common::operations::By;

use crate::domain::Ticket;
#[cfg(doc)]
use crate::Query;

use super::ApiQuery;

/// Queries all the [`Ticket`]s of the current user.
pub type All = ApiQuery<By<Vec<Ticket>, ()>>;
