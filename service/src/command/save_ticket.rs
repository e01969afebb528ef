//! [`Command`] for saving a generated plan as a [`Ticket`].

use common::{operations::Insert, Clock};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Ticket;
use crate::{
    domain::{plan, ticket},
    infra::{api, Api},
    Service,
};

use super::Command;

/// [`Command`] for saving [`plan::Resource`]s as a new [`Ticket`] of the
/// current user.
#[derive(Clone, Debug)]
pub struct SaveTicket {
    /// [`ticket::Topic`] of the new [`Ticket`].
    pub topic: ticket::Topic,

    /// [`plan::Resource`]s to bundle into the new [`Ticket`].
    pub resources: Vec<plan::Resource>,
}

impl<A, St, Clk> Command<SaveTicket> for Service<A, St, Clk>
where
    A: Api<Insert<ticket::New>, Ok = ticket::Id, Err = Traced<api::Error>>,
    Clk: Clock,
{
    type Ok = ticket::Id;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SaveTicket) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SaveTicket { topic, resources } = cmd;

        if self.session().identity().is_none() {
            return Err(tracerr::new!(E::NotAuthenticated));
        }
        if resources.is_empty() {
            return Err(tracerr::new!(E::NoResources));
        }

        let id = self
            .api()
            .execute(Insert(ticket::New { topic, resources }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tracing::debug!(ticket.id = %id, "ticket saved");

        Ok(id)
    }
}

/// Error of [`SaveTicket`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Saving request failed.
    #[display("Failed to save the ticket: {_0}")]
    #[from]
    Api(api::Error),

    /// No valid session to save the [`Ticket`] for.
    #[display("Login is required to save tickets")]
    NotAuthenticated,

    /// No [`plan::Resource`]s to save.
    #[display("No resources to save")]
    NoResources,
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use super::{ExecutionError, SaveTicket};
    use crate::{
        domain::{plan::Resource, ticket::Topic},
        testing::{identity, service, token},
    };

    fn save(resources: Vec<Resource>) -> SaveTicket {
        SaveTicket {
            topic: Topic::new("Rust").unwrap(),
            resources,
        }
    }

    fn resource() -> Resource {
        Resource {
            kind: "video".into(),
            title: "Intro".into(),
            url: "https://example.com/intro".into(),
        }
    }

    #[tokio::test]
    async fn requires_session() {
        let (svc, _, _) = service(1_000);
        svc.session().initialize().await;

        let err = svc.execute(save(vec![resource()])).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotAuthenticated));
        assert!(svc.api().calls().is_empty());
    }

    #[tokio::test]
    async fn requires_resources() {
        let (svc, _, _) = service(1_000);
        svc.session()
            .login(token("1", "alice", 2_000), identity("1", "alice"))
            .await
            .unwrap();

        let err = svc.execute(save(vec![])).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoResources));
    }

    #[tokio::test]
    async fn saves_for_authenticated_user() {
        let (svc, _, _) = service(1_000);
        svc.session()
            .login(token("1", "alice", 2_000), identity("1", "alice"))
            .await
            .unwrap();

        let id = svc.execute(save(vec![resource()])).await.unwrap();

        assert_eq!(id, 1.into());
        assert_eq!(svc.api().calls(), ["save"]);
    }
}
