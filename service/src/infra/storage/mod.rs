//! Persisted key-value [`Storage`].

pub mod file;
pub mod memory;

use common::operations::{By, Delete, Insert, Select};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

pub use self::{file::File, memory::Memory};

/// Persisted key-value slot operation.
///
/// Implementations handle [`Select`] of an optional value by [`Key`],
/// [`Insert`] of an [`Entry`] and [`Delete`] by [`Key`].
pub use common::Handler as Storage;

/// [`Storage`] supporting every operation on slots.
pub trait Slots:
    Storage<
        Select<By<Option<String>, Key>>,
        Ok = Option<String>,
        Err = Traced<Error>,
    > + Storage<Insert<Entry>, Ok = (), Err = Traced<Error>>
    + Storage<Delete<By<String, Key>>, Ok = (), Err = Traced<Error>>
{
}

impl<T> Slots for T where
    T: Storage<
            Select<By<Option<String>, Key>>,
            Ok = Option<String>,
            Err = Traced<Error>,
        > + Storage<Insert<Entry>, Ok = (), Err = Traced<Error>>
        + Storage<Delete<By<String, Key>>, Ok = (), Err = Traced<Error>>
{
}

/// Key of a persisted slot.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub struct Key(&'static str);

impl Key {
    /// Slot holding the raw session token.
    pub const TOKEN: Self = Self("token");

    /// Returns the string representation of this [`Key`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Value to be put into a slot.
#[derive(Clone, Debug)]
pub struct Entry {
    /// [`Key`] of the slot.
    pub key: Key,

    /// Value to be stored.
    pub value: String,
}

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O operation failed.
    #[display("I/O operation failed: {_0}")]
    Io(std::io::Error),
}
