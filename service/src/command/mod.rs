//! [`Command`] definition.

#[cfg(feature = "http")]
pub mod generate_plan;
#[cfg(feature = "http")]
pub mod login;
pub mod logout;
#[cfg(feature = "http")]
pub mod register;
#[cfg(feature = "http")]
pub mod save_ticket;
#[cfg(feature = "http")]
pub mod toggle_ticket;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::logout::Logout;
#[cfg(feature = "http")]
pub use self::{
    generate_plan::GeneratePlan, login::Login, register::Register,
    save_ticket::SaveTicket, toggle_ticket::ToggleTicket,
};
