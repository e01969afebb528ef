//! In-process [`Api`] double.
//!
//! [`Api`]: crate::infra::Api

use std::sync::Mutex;

use common::{
    operations::{By, Insert, Perform, Select},
    DateTime,
};
use http::StatusCode;
use tracerr::Traced;

use super::ManualClock;
use crate::{
    domain::{
        plan::{self, LearningPlan},
        ticket, Ticket,
    },
    infra::{
        api::{self, Authenticate, Authenticated, SignUp},
        storage::Memory,
        Headers,
    },
    session, Service,
};

/// Builds a [`Ticket`] created at the Unix epoch.
pub(crate) fn ticket(id: u64, completed: bool) -> Ticket {
    Ticket {
        id: id.into(),
        topic: ticket::Topic::new(format!("topic #{id}")).unwrap(),
        created_at: DateTime::UNIX_EPOCH.coerce(),
        completed,
    }
}

/// In-process [`Api`] recording the performed calls.
///
/// [`Api`]: crate::infra::Api
#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    /// Names of the performed calls, in order.
    pub(crate) calls: Mutex<Vec<&'static str>>,

    /// Response every call is rejected with, if set.
    pub(crate) rejection: Mutex<Option<(StatusCode, Option<String>)>>,

    /// Result of a successful authentication, if any.
    pub(crate) authenticated: Mutex<Option<Authenticated>>,

    /// Tickets stored on the server.
    pub(crate) tickets: Mutex<Vec<Ticket>>,

    /// Resources of a generated plan, missing means a malformed response.
    pub(crate) resources: Mutex<Option<Vec<plan::Resource>>>,
}

impl FakeApi {
    /// Makes every subsequent call fail with the provided `status`.
    pub(crate) fn reject(&self, status: StatusCode, message: Option<&str>) {
        *self.rejection.lock().unwrap() =
            Some((status, message.map(ToOwned::to_owned)));
    }

    /// Returns the names of the performed calls.
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Records the `call` and applies the configured rejection.
    fn enter(&self, call: &'static str) -> Result<(), Traced<api::Error>> {
        self.calls.lock().unwrap().push(call);
        match self.rejection.lock().unwrap().clone() {
            Some((status, message)) => {
                Err(tracerr::new!(api::Error::Status { status, message }))
            }
            None => Ok(()),
        }
    }
}

impl common::Handler<Perform<Authenticate>> for FakeApi {
    type Ok = Authenticated;
    type Err = Traced<api::Error>;

    async fn execute(
        &self,
        _: Perform<Authenticate>,
    ) -> Result<Self::Ok, Self::Err> {
        self.enter("login")?;
        self.authenticated.lock().unwrap().clone().ok_or_else(|| {
            tracerr::new!(api::Error::UnexpectedResponse("no user"))
        })
    }
}

impl common::Handler<Perform<SignUp>> for FakeApi {
    type Ok = ();
    type Err = Traced<api::Error>;

    async fn execute(&self, _: Perform<SignUp>) -> Result<(), Self::Err> {
        self.enter("register")
    }
}

impl common::Handler<Select<By<Vec<Ticket>, ()>>> for FakeApi {
    type Ok = Vec<Ticket>;
    type Err = Traced<api::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Ticket>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.enter("tickets")?;
        Ok(self.tickets.lock().unwrap().clone())
    }
}

impl common::Handler<Select<By<Option<ticket::Detail>, ticket::Id>>>
    for FakeApi
{
    type Ok = Option<ticket::Detail>;
    type Err = Traced<api::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<ticket::Detail>, ticket::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.enter("ticket")?;
        let id = by.into_inner();
        Ok(self.tickets.lock().unwrap().iter().find(|t| t.id == id).map(
            |t| ticket::Detail {
                id: t.id,
                topic: t.topic.clone(),
                created_at: t.created_at,
                resources: vec![],
            },
        ))
    }
}

impl common::Handler<Insert<ticket::New>> for FakeApi {
    type Ok = ticket::Id;
    type Err = Traced<api::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<ticket::New>,
    ) -> Result<Self::Ok, Self::Err> {
        self.enter("save")?;
        let mut tickets = self.tickets.lock().unwrap();
        let id = ticket::Id::from(tickets.len() as u64 + 1);
        tickets.push(Ticket {
            id,
            topic: new.topic,
            created_at: DateTime::UNIX_EPOCH.coerce(),
            completed: false,
        });
        Ok(id)
    }
}

impl common::Handler<Perform<ticket::Toggle>> for FakeApi {
    type Ok = ();
    type Err = Traced<api::Error>;

    async fn execute(
        &self,
        Perform(ticket::Toggle(id)): Perform<ticket::Toggle>,
    ) -> Result<(), Self::Err> {
        self.enter("toggle")?;
        let mut tickets = self.tickets.lock().unwrap();
        match tickets.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.completed = !t.completed;
                Ok(())
            }
            None => Err(tracerr::new!(api::Error::Status {
                status: StatusCode::NOT_FOUND,
                message: Some("Ticket not found".into()),
            })),
        }
    }
}

impl common::Handler<Perform<plan::Generate>> for FakeApi {
    type Ok = LearningPlan;
    type Err = Traced<api::Error>;

    async fn execute(
        &self,
        _: Perform<plan::Generate>,
    ) -> Result<Self::Ok, Self::Err> {
        self.enter("generate")?;
        self.resources
            .lock()
            .unwrap()
            .clone()
            .map(|resources| LearningPlan { resources })
            .ok_or_else(|| {
                tracerr::new!(api::Error::UnexpectedResponse("no resources"))
            })
    }
}

/// [`Service`] wired with test doubles.
pub(crate) type TestService = Service<FakeApi, Memory, ManualClock>;

/// Creates a [`TestService`] whose [`ManualClock`] shows the provided Unix
/// `timestamp`, along with its [`Memory`] storage.
pub(crate) fn service(timestamp: i64) -> (TestService, Memory, ManualClock) {
    let storage = Memory::new();
    let clock = ManualClock::at(timestamp);
    let store =
        session::Store::new(storage.clone(), Headers::new(), clock.clone());
    (Service::new(FakeApi::default(), store), storage, clock)
}
