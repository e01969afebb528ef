//! [`Query`] definition.

pub mod session;
#[cfg(feature = "http")]
pub mod ticket;
#[cfg(feature = "http")]
pub mod tickets;

#[cfg(feature = "http")]
use common::operations::{By, Select};
#[cfg(feature = "http")]
use tracerr::Traced;

#[cfg(feature = "http")]
use crate::{
    infra::{api, Api},
    Service,
};

/// [`Query`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Query;

pub use self::session::CurrentSession;

/// [`Query`] [`Select`]ing a `T`ype from an [`Api`].
#[cfg(feature = "http")]
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct ApiQuery<T>(T);

#[cfg(feature = "http")]
impl<W, B> ApiQuery<By<W, B>> {
    /// Creates a new [`ApiQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

#[cfg(feature = "http")]
impl<A, St, Clk, W, B> Query<ApiQuery<By<W, B>>> for Service<A, St, Clk>
where
    A: Api<Select<By<W, B>>, Ok = W, Err = Traced<api::Error>>,
{
    type Ok = W;
    type Err = Traced<api::Error>;

    async fn execute(
        &self,
        ApiQuery(by): ApiQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.api().execute(Select(by)).await.map_err(tracerr::wrap!())
    }
}
