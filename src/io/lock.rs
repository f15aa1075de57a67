use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const LOCK_FILE: &str = ".lock";

/// How long a write command waits for another one to finish
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

const MAX_PAUSE: Duration = Duration::from_millis(100);

/// Advisory lock on a data directory.
///
/// Held by every command that writes, so two `pulse` processes never
/// interleave a load and a save. Dropping it releases the lock and removes
/// the lock file.
pub struct FileLock {
    _file: File,
    path: PathBuf,
    acquired: Instant,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError { path: PathBuf, source: io::Error },
    #[error("could not lock {path}: {source}")]
    Flock { path: PathBuf, source: io::Error },
    #[error(
        "{} is busy: another pulse command has been writing for over {}ms (delete {} if none is running)",
        .dir.display(),
        .waited.as_millis(),
        .dir.join(LOCK_FILE).display()
    )]
    Busy { dir: PathBuf, waited: Duration },
}

impl FileLock {
    /// Lock `data_dir`, waiting up to `wait` for a running command to finish.
    /// Polls with a doubling pause capped at 100ms.
    pub fn acquire(data_dir: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let start = Instant::now();
        let mut pause = Duration::from_millis(5);
        while !try_lock(&file).map_err(|source| LockError::Flock {
            path: path.clone(),
            source,
        })? {
            let waited = start.elapsed();
            if waited >= wait {
                tracing::warn!(dir = %data_dir.display(), ?waited, "data dir busy");
                return Err(LockError::Busy {
                    dir: data_dir.to_path_buf(),
                    waited,
                });
            }
            std::thread::sleep(pause.min(wait - waited));
            pause = (pause * 2).min(MAX_PAUSE);
        }

        tracing::debug!(path = %path.display(), waited = ?start.elapsed(), "lock acquired");
        Ok(FileLock {
            _file: file,
            path,
            acquired: Instant::now(),
        })
    }

    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, DEFAULT_WAIT)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // flock goes with the file handle
        let _ = fs::remove_file(&self.path);
        tracing::debug!(held = ?self.acquired.elapsed(), "lock released");
    }
}

/// Ok(false) while another process holds the lock
#[cfg(unix)]
fn try_lock(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> io::Result<bool> {
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_released_on_drop() {
        let tmp = TempDir::new().unwrap();
        let lock = FileLock::acquire_default(tmp.path()).unwrap();
        assert!(tmp.path().join(LOCK_FILE).exists());
        drop(lock);
        assert!(!tmp.path().join(LOCK_FILE).exists());
        assert!(FileLock::acquire_default(tmp.path()).is_ok());
    }

    #[test]
    fn second_writer_gets_busy_error() {
        let tmp = TempDir::new().unwrap();
        let _held = FileLock::acquire_default(tmp.path()).unwrap();
        let err = FileLock::acquire(tmp.path(), Duration::from_millis(50)).err().unwrap();
        match &err {
            LockError::Busy { dir, waited } => {
                assert_eq!(dir, tmp.path());
                assert!(*waited >= Duration::from_millis(50));
            }
            other => panic!("expected Busy, got {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("another pulse command"));
        assert!(msg.contains(".lock"));
    }

    #[test]
    fn missing_directory_is_create_error() {
        let tmp = TempDir::new().unwrap();
        let err = FileLock::acquire_default(&tmp.path().join("nope"));
        assert!(matches!(err, Err(LockError::CreateError { .. })));
    }
}
