//! [`Command`] for toggling completion of a [`Ticket`].

use std::future::Future;

use common::operations::Perform;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{ticket, Ticket},
    infra::{api, Api},
    optimistic::{self, Collection, RemoteMutationFailure},
    Service,
};

use super::Command;

/// [`Command`] for flipping the completion status of a [`Ticket`].
///
/// The flip is published to the [`Collection`] before the returned
/// [`Future`] is even polled, and rolled back if the server rejects it.
#[derive(Clone, Debug)]
pub struct ToggleTicket {
    /// Visible [`Ticket`]s collection.
    pub tickets: Collection<Ticket>,

    /// ID of the [`Ticket`] to toggle.
    pub id: ticket::Id,
}

impl<A, St, Clk> Command<ToggleTicket> for Service<A, St, Clk>
where
    A: Api<Perform<ticket::Toggle>, Ok = (), Err = Traced<api::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    fn execute(
        &self,
        cmd: ToggleTicket,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>> {
        let ToggleTicket { tickets, id } = cmd;

        let mutation = optimistic::apply(
            &tickets,
            move |items| {
                optimistic::update_where(
                    items,
                    move |t| t.id == id,
                    Ticket::toggled,
                )
            },
            move || self.api().execute(Perform(ticket::Toggle(id))),
        );

        async move {
            mutation
                .await
                .map_err(|RemoteMutationFailure(e)| e)
                .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
        }
    }
}

/// Error of [`ToggleTicket`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Server rejected the toggle, so it has been rolled back.
    #[display("Failed to update the ticket: {_0}")]
    RolledBack(api::Error),
}
