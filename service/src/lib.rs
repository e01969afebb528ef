//! Service contains the session and mutation-consistency logic of the
//! learning-plan client.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod optimistic;
pub mod query;
pub mod session;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use common::SystemClock;

#[cfg(doc)]
use infra::{Api, Storage};

pub use self::{command::Command, query::Query};

/// Domain service.
///
/// Clones share the same [`session::Store`].
#[derive(Debug)]
pub struct Service<A, St, Clk = SystemClock> {
    /// [`Api`] of this [`Service`].
    api: A,

    /// [`session::Store`] of this [`Service`].
    session: Arc<session::Store<St, Clk>>,
}

impl<A, St, Clk> Service<A, St, Clk> {
    /// Creates a new [`Service`] with the provided parameters.
    ///
    /// The [`Api`] is expected to send the outbound headers of the provided
    /// [`session::Store`].
    #[must_use]
    pub fn new(api: A, session: session::Store<St, Clk>) -> Self {
        Self {
            api,
            session: Arc::new(session),
        }
    }

    /// Returns [`Api`] of this [`Service`].
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns [`session::Store`] of this [`Service`].
    #[must_use]
    pub fn session(&self) -> &session::Store<St, Clk> {
        &self.session
    }
}

impl<A: Clone, St, Clk> Clone for Service<A, St, Clk> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            session: Arc::clone(&self.session),
        }
    }
}
