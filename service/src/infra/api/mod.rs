//! Remote [`Api`] of the learning-plan server.

mod client;

use derive_more::{Display, Error as StdError, From};
use secrecy::SecretBox;

#[cfg(doc)]
use crate::infra::pipeline::Headers;
use crate::domain::user::{self, Identity};

pub use self::client::{Config, Http};

/// Remote [`Api`] operation.
///
/// Implementations attach the credential from the shared [`Headers`] to
/// every request.
pub use common::Handler as Api;

/// Authentication exchange of user credentials for a session token.
#[derive(Debug)]
pub struct Authenticate {
    /// [`user::Name`] of the user.
    pub username: user::Name,

    /// [`user::Password`] of the user.
    pub password: SecretBox<user::Password>,
}

/// Successful result of an [`Authenticate`] exchange.
#[derive(Clone, Debug)]
pub struct Authenticated {
    /// Issued session token.
    pub token: user::Token,

    /// [`Identity`] of the authenticated user, as reported by the server.
    pub identity: Identity,
}

/// Registration of a new user.
#[derive(Debug)]
pub struct SignUp {
    /// [`user::Name`] of the new user.
    pub username: user::Name,

    /// [`user::Password`] of the new user.
    pub password: SecretBox<user::Password>,
}

/// [`Api`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request couldn't be performed or its response couldn't be read.
    #[display("HTTP request failed: {_0}")]
    Transport(reqwest::Error),

    /// Server responded with a non-successful status.
    #[display(
        "server responded with `{status}`: {}",
        message.as_deref().unwrap_or("<no message>")
    )]
    #[from(ignore)]
    Status {
        /// Status code of the response.
        status: http::StatusCode,

        /// Message provided by the server, if any.
        message: Option<String>,
    },

    /// Server responded successfully, but with an unexpected payload.
    #[display("unexpected response: {_0}")]
    #[from(ignore)]
    UnexpectedResponse(#[error(not(source))] &'static str),
}

impl Error {
    /// Returns the [`http::StatusCode`] of the response caused this [`Error`],
    /// if any.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::UnexpectedResponse(_) => None,
        }
    }

    /// Returns the message provided by the server, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            Self::Transport(_) | Self::UnexpectedResponse(_) => None,
        }
    }
}
