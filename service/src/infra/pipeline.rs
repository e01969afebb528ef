//! Outbound request pipeline.

use std::sync::{Arc, PoisonError, RwLock};

use http::{header, HeaderMap, HeaderValue};

/// Default headers attached to every outbound request.
///
/// Shared between the session store (the single writer) and the transport
/// (the reader). Writes are serialized by a lock, so a reader never observes a
/// half-applied credential change.
#[derive(Clone, Debug, Default)]
pub struct Headers(Arc<RwLock<HeaderMap>>);

impl Headers {
    /// Creates new empty [`Headers`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `Authorization` header to the provided `bearer` value.
    pub fn attach(&self, bearer: HeaderValue) {
        drop(
            self.0
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(header::AUTHORIZATION, bearer),
        );
    }

    /// Removes the `Authorization` header, if any.
    pub fn detach(&self) {
        drop(
            self.0
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(header::AUTHORIZATION),
        );
    }

    /// Returns the current `Authorization` header value, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<HeaderValue> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(header::AUTHORIZATION)
            .cloned()
    }

    /// Returns a copy of all the current default headers.
    #[must_use]
    pub fn snapshot(&self) -> HeaderMap {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
mod spec {
    use http::HeaderValue;

    use super::Headers;

    #[test]
    fn attach_replaces_and_detach_is_idempotent() {
        let headers = Headers::new();
        let shared = headers.clone();

        headers.attach(HeaderValue::from_static("Bearer a"));
        headers.attach(HeaderValue::from_static("Bearer b"));
        assert_eq!(
            shared.authorization(),
            Some(HeaderValue::from_static("Bearer b")),
        );
        assert_eq!(shared.snapshot().len(), 1);

        headers.detach();
        headers.detach();
        assert_eq!(shared.authorization(), None);
    }
}
