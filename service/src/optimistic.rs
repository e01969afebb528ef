//! Optimistic mutations of locally cached [`Collection`]s.
//!
//! An optimistic mutation publishes its local result before the remote effect
//! is even dispatched, and restores the pre-mutation [`Collection`] if the
//! remote effect fails:
//! 1. `before` is captured (a shared snapshot which is never modified);
//! 2. `after = transform(before)` is published as the visible [`Collection`];
//! 3. the remote effect is invoked;
//! 4. on success `after` stays visible;
//! 5. on failure `before` is published again, overwriting whatever is visible
//!    at that moment.
//!
//! Concurrent mutations of the same [`Collection`] are not ordered: a late
//! rollback overwrites results of mutations dispatched after the failed one.

use std::{
    fmt,
    future::Future,
    sync::{Arc, PoisonError, RwLock},
};

use derive_more::{Display, Error};

/// Visible version of a list owned by its consumer.
///
/// Clones share the same visible version.
#[derive(Debug)]
pub struct Collection<T>(Arc<RwLock<Arc<Vec<T>>>>);

impl<T> Collection<T> {
    /// Creates a new [`Collection`] with the provided `items` visible.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(items))))
    }

    /// Returns the currently visible version of this [`Collection`].
    #[must_use]
    pub fn get(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.0.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Makes the provided `items` the visible version of this [`Collection`].
    pub fn publish(&self, items: impl Into<Arc<Vec<T>>>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = items.into();
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Applies the `transform` to the `collection` optimistically, confirming it
/// with the `effect`.
///
/// The transformed version is published __before__ this function returns,
/// while the `effect` is invoked only once the returned [`Future`] is polled.
/// The `effect` is invoked exactly once, even if the `transform` changes
/// nothing, and is never retried.
///
/// # Errors
///
/// With [`RemoteMutationFailure`] if the `effect` fails. The version visible
/// before the `transform` is published back in such case.
pub fn apply<T, R, E, Eff, Fut>(
    collection: &Collection<T>,
    transform: impl FnOnce(&[T]) -> Vec<T>,
    effect: Eff,
) -> impl Future<Output = Result<R, RemoteMutationFailure<E>>>
where
    Eff: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: fmt::Display,
{
    let before = collection.get();
    collection.publish(transform(&before));

    let collection = collection.clone();
    async move {
        effect().await.map_err(|e| {
            tracing::warn!("optimistic mutation rolled back: {e}");
            collection.publish(before);
            RemoteMutationFailure(e)
        })
    }
}

/// Returns a copy of the provided `items` with every item matching the
/// `predicate` replaced by the result of the `update`.
///
/// Items not matching the `predicate` are cloned as is, so no match means an
/// unchanged copy.
#[must_use]
pub fn update_where<T: Clone>(
    items: &[T],
    predicate: impl Fn(&T) -> bool,
    update: impl Fn(T) -> T,
) -> Vec<T> {
    items
        .iter()
        .cloned()
        .map(|item| if predicate(&item) { update(item) } else { item })
        .collect()
}

/// Remote effect of an optimistic mutation failed, so its local result has
/// been rolled back.
#[derive(Debug, Display, Error)]
#[display("remote mutation failed and was rolled back: {_0}")]
pub struct RemoteMutationFailure<E>(#[error(source)] pub E);
