//! File-backed [`Storage`] implementation.

use std::{io, path::PathBuf};

use common::operations::{By, Delete, Insert, Select};
use tokio::fs;
use tracerr::Traced;

#[cfg(doc)]
use super::Storage;
use super::{Entry, Error, Key};

/// [`Storage`] keeping every slot in its own file inside a directory.
#[derive(Clone, Debug)]
pub struct File {
    /// Directory the slot files are kept in.
    dir: PathBuf,
}

impl File {
    /// Creates a new [`File`] storage rooted at the provided `dir`.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns path of the file backing the slot with the provided [`Key`].
    fn path(&self, key: Key) -> PathBuf {
        self.dir.join(key.as_str())
    }
}

impl common::Handler<Select<By<Option<String>, Key>>> for File {
    type Ok = Option<String>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<String>, Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        match fs::read_to_string(self.path(by.into_inner())).await {
            Ok(value) => {
                let value = value.trim();
                Ok((!value.is_empty()).then(|| value.to_owned()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(tracerr::new!(Error::Io(e))),
        }
    }
}

impl common::Handler<Insert<Entry>> for File {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(Entry { key, value }): Insert<Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        fs::write(self.path(key), value)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl common::Handler<Delete<By<String, Key>>> for File {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<String, Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        match fs::remove_file(self.path(by.into_inner())).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(tracerr::new!(Error::Io(e)))
            }
            Ok(()) | Err(_) => Ok(()),
        }
    }
}
