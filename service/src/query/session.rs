//! [`Query`] of the current session.

use std::convert::Infallible;

use common::Clock;

#[cfg(doc)]
use crate::session;
use crate::{infra::storage::Slots, session::Snapshot, Service};

use super::Query;

/// Queries a [`Snapshot`] of the current session, silently terminating it if
/// it has expired.
///
/// See [`session::Store::revalidate()`].
#[derive(Clone, Copy, Debug)]
pub struct CurrentSession;

impl<A, St, Clk> Query<CurrentSession> for Service<A, St, Clk>
where
    St: Slots,
    Clk: Clock,
{
    type Ok = Snapshot;
    type Err = Infallible;

    async fn execute(&self, _: CurrentSession) -> Result<Self::Ok, Self::Err> {
        Ok(self.session().revalidate().await)
    }
}
