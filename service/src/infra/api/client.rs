//! [`Http`] implementation of the [`Api`].

use std::time::Duration;

use common::operations::{By, Insert, Perform, Select};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret as _;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tracerr::Traced;

#[cfg(doc)]
use super::Api;
use super::{Authenticate, Authenticated, Error, SignUp};
use crate::{
    domain::{
        plan::{self, LearningPlan},
        ticket, Identity, Ticket,
    },
    infra::pipeline::Headers,
};

/// [`Http`] client configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Base URL all the [`Api`] paths are relative to.
    #[default("http://127.0.0.1:5000/api".to_owned())]
    pub base_url: String,

    /// Timeout of a single request.
    #[default(Duration::from_secs(30))]
    pub timeout: Duration,
}

/// [`Api`] over HTTP.
#[derive(Clone, Debug)]
pub struct Http {
    /// Underlying HTTP client.
    client: reqwest::Client,

    /// Base URL without a trailing slash.
    base_url: String,

    /// Default [`Headers`] attached to every request.
    headers: Headers,
}

impl Http {
    /// Creates a new [`Http`] client sending the provided default
    /// [`Headers`] with every request.
    ///
    /// # Errors
    ///
    /// If the underlying HTTP client cannot be initialized.
    pub fn new(
        config: Config,
        headers: Headers,
    ) -> Result<Self, Traced<Error>> {
        let Config { base_url, timeout } = config;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            headers,
        })
    }

    /// Returns the absolute URL of the provided `path`.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Starts a new request carrying the current default [`Headers`].
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .headers(self.headers.snapshot())
    }

    /// Sends the provided `request`, turning non-successful responses into
    /// [`Error::Status`].
    async fn send(request: RequestBuilder) -> Result<Response, Error> {
        /// Body of a non-successful response.
        #[derive(Deserialize)]
        struct Rejection {
            error: Option<String>,
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<Rejection>()
            .await
            .ok()
            .and_then(|r| r.error);
        tracing::debug!(%status, ?message, "request rejected");

        Err(Error::Status { status, message })
    }
}

/// Body of [`Authenticate`] and [`SignUp`] requests.
#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

impl common::Handler<Perform<Authenticate>> for Http {
    type Ok = Authenticated;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(auth): Perform<Authenticate>,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of a successful authentication response.
        #[derive(Deserialize)]
        struct Body {
            access_token: Option<String>,
            user: Option<Identity>,
        }

        let response = Self::send(self.request(Method::POST, "/login").json(
            &Credentials {
                username: auth.username.as_ref(),
                password: auth.password.expose_secret().as_str(),
            },
        ))
        .await
        .map_err(tracerr::wrap!())?;

        match response
            .json::<Body>()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?
        {
            Body {
                access_token: Some(token),
                user: Some(identity),
            } => Ok(Authenticated {
                token: token.into(),
                identity,
            }),
            Body { .. } => Err(tracerr::new!(Error::UnexpectedResponse(
                "authentication response lacks `access_token` or `user`",
            ))),
        }
    }
}

impl common::Handler<Perform<SignUp>> for Http {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(sign_up): Perform<SignUp>,
    ) -> Result<Self::Ok, Self::Err> {
        Self::send(self.request(Method::POST, "/register").json(
            &Credentials {
                username: sign_up.username.as_ref(),
                password: sign_up.password.expose_secret().as_str(),
            },
        ))
        .await
        .map(drop)
        .map_err(tracerr::wrap!())
    }
}

impl common::Handler<Select<By<Vec<Ticket>, ()>>> for Http {
    type Ok = Vec<Ticket>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Ticket>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Self::send(self.request(Method::GET, "/tickets"))
            .await
            .map_err(tracerr::wrap!())?
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl common::Handler<Select<By<Option<ticket::Detail>, ticket::Id>>> for Http {
    type Ok = Option<ticket::Detail>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<ticket::Detail>, ticket::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let response = match Self::send(
            self.request(Method::GET, &format!("/tickets/{id}")),
        )
        .await
        {
            Ok(r) => r,
            Err(Error::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }) => return Ok(None),
            Err(e) => return Err(tracerr::new!(e)),
        };

        response
            .json()
            .await
            .map(Some)
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl common::Handler<Insert<ticket::New>> for Http {
    type Ok = ticket::Id;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(new): Insert<ticket::New>,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of a successful ticket creation response.
        #[derive(Deserialize)]
        struct Body {
            ticket_id: ticket::Id,
        }

        Self::send(self.request(Method::POST, "/tickets").json(&new))
            .await
            .map_err(tracerr::wrap!())?
            .json::<Body>()
            .await
            .map(|b| b.ticket_id)
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl common::Handler<Perform<ticket::Toggle>> for Http {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(ticket::Toggle(id)): Perform<ticket::Toggle>,
    ) -> Result<Self::Ok, Self::Err> {
        Self::send(
            self.request(Method::PATCH, &format!("/tickets/{id}/toggle")),
        )
        .await
        .map(drop)
        .map_err(tracerr::wrap!())
    }
}

impl common::Handler<Perform<plan::Generate>> for Http {
    type Ok = LearningPlan;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(plan::Generate(interest)): Perform<plan::Generate>,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of a generation request.
        #[derive(Serialize)]
        struct Request<'a> {
            interest: &'a str,
        }

        /// Body of a successful generation response.
        #[derive(Deserialize)]
        struct Body {
            resources: Option<Vec<plan::Resource>>,
        }

        let body = Self::send(
            self.request(Method::POST, "/generate").json(&Request {
                interest: interest.as_ref(),
            }),
        )
        .await
        .map_err(tracerr::wrap!())?
        .json::<Body>()
        .await
        .map_err(tracerr::from_and_wrap!(=> Error))?;

        body.resources
            .map(|resources| LearningPlan { resources })
            .ok_or(Error::UnexpectedResponse(
                "generated plan lacks `resources` list",
            ))
            .map_err(tracerr::wrap!())
    }
}
