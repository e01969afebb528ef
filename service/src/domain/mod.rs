//! Domain definitions.

pub mod plan;
pub mod ticket;
pub mod user;

pub use self::{plan::LearningPlan, ticket::Ticket, user::Identity};
