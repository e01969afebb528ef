//! [`Command`] for logging a user in.

use common::{operations::Perform, Clock};
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Name, Password};
use crate::{
    domain::{user, Identity},
    infra::{
        api::{self, Authenticate, Authenticated},
        storage::Slots,
        Api,
    },
    session, Service,
};

use super::Command;

/// [`Command`] for logging a user in by credentials.
///
/// Exchanges the credentials for a session token and starts a new session
/// with it, replacing the current one, if any.
#[derive(Debug)]
pub struct Login {
    /// [`Name`] of the user.
    pub username: user::Name,

    /// [`Password`] of the user.
    pub password: SecretBox<user::Password>,
}

impl<A, St, Clk> Command<Login> for Service<A, St, Clk>
where
    A: Api<
        Perform<Authenticate>,
        Ok = Authenticated,
        Err = Traced<api::Error>,
    >,
    St: Slots,
    Clk: Clock,
{
    type Ok = Identity;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: Login) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Login { username, password } = cmd;

        let Authenticated { token, identity } = self
            .api()
            .execute(Perform(Authenticate { username, password }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.session()
            .login(token, identity.clone())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(identity)
    }
}

/// Error of [`Login`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Authentication exchange failed.
    #[display("Authentication failed: {_0}")]
    AuthExchange(api::Error),

    /// Issued token cannot be used for a session.
    #[display("Failed to start a session: {_0}")]
    Session(session::LoginError),
}
