//! Execution of [`Command`]s against the [`Service`].

use std::fmt::Write as _;

use itertools::Itertools as _;
use secrecy::SecretBox;
use service::{
    command,
    domain::{
        plan::{self, LearningPlan},
        ticket, user, Ticket,
    },
    optimistic::Collection,
    query, Command as _,
};

use crate::{args::Command, define_error, AsError, Error, Service};

define_error! {
    enum Invalid {
        #[code = "INVALID_USERNAME"]
        #[message = "Username must be 1-80 characters without surrounding \
                     spaces"]
        Username,

        #[code = "INVALID_PASSWORD"]
        #[message = "Password must be 1-128 characters"]
        Password,

        #[code = "INVALID_INTEREST"]
        #[message = "Please enter an interest"]
        Interest,

        #[code = "INVALID_TOPIC"]
        #[message = "Please enter a topic"]
        Topic,

        #[code = "NOT_AUTHENTICATED"]
        #[message = "Please login to manage tickets"]
        Session,

        #[code = "TICKET_NOT_FOUND"]
        #[message = "Ticket not found"]
        Ticket,
    }
}

/// Executes the provided [`Command`], returning the text to show.
///
/// # Errors
///
/// With a user-facing [`Error`] if the [`Command`] fails.
pub async fn run(service: &Service, cmd: Command) -> Result<String, Error> {
    use Command as C;

    match cmd {
        C::Register { username, password } => {
            let (username, password) = credentials(username, password)?;
            service
                .execute(command::Register { username, password })
                .await
                .map_err(AsError::into_error)?;
            Ok("Registration successful, please login".to_owned())
        }
        C::Login { username, password } => {
            let (username, password) = credentials(username, password)?;
            let identity = service
                .execute(command::Login { username, password })
                .await
                .map_err(AsError::into_error)?;
            Ok(format!("Logged in as {}", identity.username))
        }
        C::Logout => {
            service
                .execute(command::Logout)
                .await
                .map_err(AsError::into_error)?;
            Ok("Logged out".to_owned())
        }
        C::Whoami => {
            let current = service
                .execute(query::CurrentSession)
                .await
                .map_err(AsError::into_error)?;
            Ok(current.identity.map_or_else(
                || "Not logged in".to_owned(),
                |i| format!("{} (id: {})", i.username, i.id),
            ))
        }
        C::Generate { interest } => {
            let plan = generate(service, interest).await?;
            Ok(render_plan(&plan))
        }
        C::Save { interest } => {
            authenticated(service).await?;

            let topic = ticket::Topic::new(interest.clone())
                .ok_or(Invalid::Topic)?;
            let LearningPlan { resources } = generate(service, interest).await?;
            let id = service
                .execute(command::SaveTicket { topic, resources })
                .await
                .map_err(AsError::into_error)?;
            Ok(format!("Ticket #{id} saved successfully"))
        }
        C::Tickets => {
            authenticated(service).await?;

            let tickets = service
                .execute(query::tickets::All::by(()))
                .await
                .map_err(AsError::into_error)?;
            Ok(render_tickets(&tickets))
        }
        C::Show { id } => {
            authenticated(service).await?;

            let detail = service
                .execute(query::ticket::ById::by(id.into()))
                .await
                .map_err(AsError::into_error)?
                .ok_or(Invalid::Ticket)?;

            let mut out = format!(
                "#{} {} (saved at {})\n",
                detail.id, detail.topic, detail.created_at,
            );
            out.push_str(&render_plan(&LearningPlan {
                resources: detail.resources,
            }));
            Ok(out)
        }
        C::Toggle { id } => {
            authenticated(service).await?;

            let tickets = Collection::new(
                service
                    .execute(query::tickets::All::by(()))
                    .await
                    .map_err(AsError::into_error)?,
            );
            service
                .execute(command::ToggleTicket {
                    tickets: tickets.clone(),
                    id: id.into(),
                })
                .await
                .map_err(AsError::into_error)?;
            Ok(render_tickets(&tickets.get()))
        }
    }
}

/// Ensures the [`Service`] has a valid session, as tickets belong to a user.
async fn authenticated(service: &Service) -> Result<(), Error> {
    let current = service
        .execute(query::CurrentSession)
        .await
        .map_err(AsError::into_error)?;
    if current.identity.is_none() {
        return Err(Invalid::Session.into());
    }
    Ok(())
}

/// Validates the provided raw credentials.
fn credentials(
    username: String,
    password: String,
) -> Result<(user::Name, SecretBox<user::Password>), Error> {
    let username = user::Name::new(username).ok_or(Invalid::Username)?;
    let password = user::Password::new(password).ok_or(Invalid::Password)?;
    Ok((username, SecretBox::init_with(move || password)))
}

/// Generates a [`LearningPlan`] for the provided raw `interest`.
async fn generate(
    service: &Service,
    interest: String,
) -> Result<LearningPlan, Error> {
    let interest = plan::Interest::new(interest).ok_or(Invalid::Interest)?;
    service
        .execute(command::GeneratePlan { interest })
        .await
        .map_err(AsError::into_error)
}

/// Renders the provided [`LearningPlan`] as a list of its resources.
fn render_plan(plan: &LearningPlan) -> String {
    if plan.resources.is_empty() {
        return "No resources found".to_owned();
    }
    plan.resources
        .iter()
        .format_with("\n", |r, f| {
            f(&format_args!("- [{}] {}: {}", r.kind, r.title, r.url))
        })
        .to_string()
}

/// Renders the provided [`Ticket`]s as a list.
fn render_tickets(tickets: &[Ticket]) -> String {
    if tickets.is_empty() {
        return "No tickets saved yet".to_owned();
    }
    tickets.iter().fold(String::new(), |mut out, t| {
        _ = writeln!(
            out,
            "#{:<4} [{}] {} ({})",
            t.id,
            if t.completed { 'x' } else { ' ' },
            t.topic,
            t.created_at,
        );
        out
    })
}

impl AsError for command::login::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LOGIN_FAILED"]
                #[message = "Login failed"]
                LoginFailed,
            }
        }

        match self {
            Self::AuthExchange(e) => Some(e.server_message().map_or_else(
                || Error::LoginFailed.into(),
                |m| crate::Error::new("LOGIN_FAILED", m),
            )),
            Self::Session(_) => None,
        }
    }
}

impl AsError for command::register::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PASSWORD_TOO_SHORT"]
                #[message = "Password must be at least 6 characters long"]
                PasswordTooShort,

                #[code = "USERNAME_TAKEN"]
                #[message = "Username already exists"]
                UsernameTaken,
            }
        }

        match self {
            Self::Api(e) => e.try_as_error(),
            Self::PasswordTooShort => Some(Error::PasswordTooShort.into()),
            Self::UsernameTaken(_) => Some(Error::UsernameTaken.into()),
        }
    }
}

impl AsError for command::toggle_ticket::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "TOGGLE_FAILED"]
                #[message = "Failed to update ticket status"]
                ToggleFailed,
            }
        }

        match self {
            Self::RolledBack(_) => Some(Error::ToggleFailed.into()),
        }
    }
}

impl AsError for command::save_ticket::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NO_RESOURCES"]
                #[message = "No resources to save"]
                NoResources,
            }
        }

        match self {
            Self::Api(e) => e.try_as_error(),
            Self::NotAuthenticated => Some(Invalid::Session.into()),
            Self::NoResources => Some(Error::NoResources.into()),
        }
    }
}

impl AsError for command::generate_plan::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Api(e) => e.try_as_error(),
        }
    }
}
