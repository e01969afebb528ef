//! [`Command`] for registering a new user.

use common::operations::Perform;
use derive_more::{Display, Error, From};
use http::StatusCode;
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Name, Password};
use crate::{
    domain::user,
    infra::{
        api::{self, SignUp},
        Api,
    },
    Service,
};

use super::Command;

/// [`Command`] for registering a new user.
///
/// Doesn't start a session, the user is expected to [`Login`] afterwards.
///
/// [`Login`]: super::Login
#[derive(Debug)]
pub struct Register {
    /// [`Name`] of the new user.
    pub username: user::Name,

    /// [`Password`] of the new user.
    pub password: SecretBox<user::Password>,
}

impl<A, St, Clk> Command<Register> for Service<A, St, Clk>
where
    A: Api<Perform<SignUp>, Ok = (), Err = Traced<api::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: Register) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Register { username, password } = cmd;

        if !password.expose_secret().is_registrable() {
            return Err(tracerr::new!(E::PasswordTooShort));
        }

        match self
            .api()
            .execute(Perform(SignUp {
                username: username.clone(),
                password,
            }))
            .await
        {
            Err(e) if e.as_ref().status() == Some(StatusCode::CONFLICT) => {
                Err(tracerr::new!(E::UsernameTaken(username)))
            }
            res => res.map_err(tracerr::map_from_and_wrap!(=> E)),
        }
    }
}

/// Error of [`Register`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Registration exchange failed.
    #[display("Registration failed: {_0}")]
    #[from]
    Api(api::Error),

    /// [`Password`] is shorter than [`Password::MIN_REGISTRATION_LEN`].
    #[display(
        "Password must be at least {} characters long",
        user::Password::MIN_REGISTRATION_LEN
    )]
    PasswordTooShort,

    /// [`Name`] is already taken by another user.
    #[display("`{_0}` username is already taken")]
    UsernameTaken(#[error(not(source))] user::Name),
}
