//! [`Command`] for logging the current user out.

use std::convert::Infallible;

use common::Clock;

use crate::{infra::storage::Slots, Service};

use super::Command;

/// [`Command`] for terminating the current session.
///
/// Never fails and does nothing if there is no session.
#[derive(Clone, Copy, Debug)]
pub struct Logout;

impl<A, St, Clk> Command<Logout> for Service<A, St, Clk>
where
    St: Slots,
    Clk: Clock,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, _: Logout) -> Result<Self::Ok, Self::Err> {
        self.session().logout().await;
        Ok(())
    }
}
