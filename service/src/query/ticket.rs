//! [`Query`] collection related to a single [`Ticket`].

use common::operations::By;

use crate::domain::ticket;
#[cfg(doc)]
use crate::{domain::Ticket, Query};

use super::ApiQuery;

/// Queries a [`ticket::Detail`] by its [`ticket::Id`].
///
/// Absent if the [`Ticket`] doesn't exist or isn't owned by the current user.
pub type ById = ApiQuery<By<Option<ticket::Detail>, ticket::Id>>;
