//! In-memory [`Storage`] implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

#[cfg(doc)]
use super::Storage;
use super::{Entry, Error, Key};

/// [`Storage`] keeping slots in memory, lost on restart.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<HashMap<Key, String>>>);

impl Memory {
    /// Creates a new empty [`Memory`] storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value of the slot with the provided [`Key`].
    #[must_use]
    pub fn get(&self, key: Key) -> Option<String> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Puts the `value` into the slot with the provided [`Key`].
    pub fn set(&self, key: Key, value: impl Into<String>) {
        drop(
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key, value.into()),
        );
    }
}

impl common::Handler<Select<By<Option<String>, Key>>> for Memory {
    type Ok = Option<String>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<String>, Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.get(by.into_inner()))
    }
}

impl common::Handler<Insert<Entry>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(Entry { key, value }): Insert<Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.set(key, value);
        Ok(())
    }
}

impl common::Handler<Delete<By<String, Key>>> for Memory {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<String, Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&by.into_inner()),
        );
        Ok(())
    }
}
