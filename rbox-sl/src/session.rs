//! Bearer token storage
//!
//! The backend issues a token at login (outside this tool). The client only
//! needs to read it back for every authenticated call, and to forget it on
//! logout.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use rbox_common::{Error, Result};
use tracing::{debug, info};

/// Source of the current session's bearer token
pub trait TokenStore: Send + Sync {
    /// Current token, `None` when logged out
    fn token(&self) -> Option<String>;

    /// Replace the token; `None` clears it
    fn set_token(&self, token: Option<&str>) -> Result<()>;
}

/// Token held in memory for the life of the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn set_token(&self, token: Option<&str>) -> Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| Error::Internal("token lock poisoned".to_string()))?;
        *guard = token.map(str::to_string);
        Ok(())
    }
}

/// Token persisted in a single file
///
/// The file is re-read on every call so separate invocations of the CLI
/// share one session.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                debug!("No token at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set_token(&self, token: Option<&str>) -> Result<()> {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => {
                write_atomic(&self.path, token)?;
                info!("Saved token to {}", self.path.display());
            }
            None => match fs::remove_file(&self.path) {
                Ok(()) => info!("Removed token file {}", self.path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }
        Ok(())
    }
}

/// Write via a temp file and rename so readers never see a partial token.
/// On Unix the file is created with mode 0600. A temp file left behind by an
/// earlier run is removed first so its permissions are never inherited.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    match fs::remove_file(&tmp_path) {
        Ok(()) => debug!("Removed stale {}", tmp_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}
