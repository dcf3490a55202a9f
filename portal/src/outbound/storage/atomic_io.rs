//! Atomic file replacement inside a capability-scoped directory.
//!
//! Contents are written to a hidden temporary sibling, synced, and renamed
//! over the target, so readers observe either the previous file or the new
//! one and never a partial write.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

use crate::domain::ports::SessionStoreError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Owner-only permission bits for files holding credentials.
#[cfg(unix)]
const PRIVATE_FILE_MODE: u32 = 0o600;

/// Replace `path` in `dir` with `contents`.
///
/// # Errors
///
/// Returns [`SessionStoreError::Io`] if `path` is not a bare file name or the
/// file cannot be written.
pub(super) fn write_atomic(
    dir: &Dir,
    path: &Utf8Path,
    contents: &str,
) -> Result<(), SessionStoreError> {
    let mut components = path.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(SessionStoreError::io(format!(
            "session path '{path}' must be a bare file name"
        )));
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{file_name}.tmp.{}.{suffix}.{counter}",
        std::process::id()
    );

    write_to_temp_file(dir, &tmp_name, contents)
        .map_err(|err| SessionStoreError::io(format!("writing '{tmp_name}': {err}")))?;
    if let Err(err) = dir.rename(&tmp_name, dir, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(SessionStoreError::io(format!("replacing '{path}': {err}")));
    }
    sync_directory(dir);
    Ok(())
}

fn write_to_temp_file(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use cap_std::fs::OpenOptionsExt;
        options.mode(PRIVATE_FILE_MODE);
    }
    let mut file = dir.open_with(tmp_name, &options)?;

    let written = file.write_all(contents.as_bytes()).and_then(|()| file.sync_all());
    if written.is_err() {
        drop(file);
        drop(dir.remove_file(tmp_name));
    }
    written
}

fn sync_directory(dir: &Dir) {
    // Best effort; the rename has already happened.
    if dir.open(".").and_then(|handle| handle.sync_all()).is_err() {
        tracing::debug!("session directory sync skipped");
    }
}
