//! File-backed session store.
//!
//! The snapshot is one JSON document, `session.json`, holding the `token`
//! and `user` entries together so they are written and removed as a unit.
//! All access goes through a `cap_std` directory handle opened once at
//! construction.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use tracing::{debug, warn};

use super::atomic_io::write_atomic;
use crate::domain::SessionSnapshot;
use crate::domain::ports::{SessionStore, SessionStoreError};

const SESSION_FILE: &str = "session.json";

/// Durable session store rooted in one directory.
#[derive(Debug)]
pub struct FileSessionStore {
    dir: Dir,
    root: Utf8PathBuf,
}

impl FileSessionStore {
    /// Open (creating if needed) the session directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: &Utf8Path) -> Result<Self, SessionStoreError> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|err| io_error("creating", root, &err))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| io_error("opening", root, &err))?;
        Ok(Self {
            dir,
            root: root.to_path_buf(),
        })
    }

    /// Directory holding the session file.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<SessionSnapshot>, SessionStoreError> {
        let text = match self.dir.read_to_string(SESSION_FILE) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error("reading", &self.root, &err)),
        };
        match serde_json::from_str::<SessionSnapshot>(&text) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(error) => {
                warn!(%error, root = %self.root, "stored session is incomplete or corrupt; ignoring it");
                Ok(None)
            }
        }
    }

    fn set(&self, snapshot: &SessionSnapshot) -> Result<(), SessionStoreError> {
        let encoded = serde_json::to_string_pretty(snapshot)
            .map_err(|err| SessionStoreError::encode(err.to_string()))?;
        write_atomic(&self.dir, Utf8Path::new(SESSION_FILE), &encoded)?;
        debug!(root = %self.root, "session snapshot written");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match self.dir.remove_file(SESSION_FILE) {
            Ok(()) => {
                debug!(root = %self.root, "session snapshot removed");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("removing", &self.root, &err)),
        }
    }
}

fn io_error(action: &str, root: &Utf8Path, err: &io::Error) -> SessionStoreError {
    SessionStoreError::io(format!("{action} session store at '{root}': {err}"))
}
