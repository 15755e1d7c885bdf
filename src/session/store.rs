//! Session store implementations

use super::{Session, SessionResult, SessionStore};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Session persisted as a small JSON file.
///
/// The file is read once on open and cached; every write goes through to
/// disk before the cache is updated, so a restart sees the last stored pair.
pub struct FileSessionStore {
    path: PathBuf,
    current: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Open the store at `path`, loading any previously saved session
    pub fn open(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref().to_path_buf();

        let current = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Session>(&content) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Ignoring unreadable session file");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, session: &Session) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write to a sibling temp file and rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        match std::fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let mut file = private_file(&tmp)?;
        file.write_all(&serde_json::to_vec_pretty(session)?)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// New file readable by the owner only; tokens are credentials
fn private_file(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

impl SessionStore for FileSessionStore {
    fn set(&self, session: Session) -> SessionResult<()> {
        self.write_file(&session)?;
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        tracing::debug!(path = ?self.path, "Session stored");
        Ok(())
    }

    fn get(&self) -> Option<Session> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The cached pair is dropped even if the file cannot be removed
    fn clear(&self) -> SessionResult<()> {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Could not remove session file");
                return Err(e.into());
            }
        }
        tracing::debug!(path = ?self.path, "Session cleared");
        Ok(())
    }
}

/// Process-local session, lost on exit
#[derive(Default)]
pub struct MemorySessionStore {
    current: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: RwLock::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn set(&self, session: Session) -> SessionResult<()> {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        Ok(())
    }

    fn get(&self) -> Option<Session> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn clear(&self) -> SessionResult<()> {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
