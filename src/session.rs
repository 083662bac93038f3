//! Session management for the Telegram client
//!
//! Provides:
//! - File-based session locking so one session is never used by two runs
//! - Opening (or creating) the persisted session
//! - Client creation on top of the grammers sender pool

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use grammers_client::client::updates::UpdatesLike;
use grammers_client::Client;
use grammers_mtsender::{SenderPool, SenderPoolHandle};
use grammers_session::storages::SqliteSession;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};

/// Session lock guard that ensures exclusive access to the Telegram session.
pub struct SessionLock {
    path: PathBuf,
    lock_file: Option<File>,
}

impl SessionLock {
    /// Acquire an exclusive lock at `path`.
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::LockError(format!("Failed to open {}: {}", path.display(), e)))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                lock_file: Some(lock_file),
            }),
            Err(e) => {
                debug!("Lock {} is held elsewhere: {}", path.display(), e);
                Err(Error::SessionLocked)
            }
        }
    }

    /// Release the lock manually
    pub fn release(&mut self) {
        if let Some(file) = self.lock_file.take() {
            let _ = file.unlock();
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Open the persisted session, creating it on first use.
pub fn open_session<P: AsRef<Path>>(path: P) -> Result<Arc<SqliteSession>> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("No session at {}, a new one will be created", path.display());
    }
    let session = SqliteSession::open(path).map_err(|e| {
        Error::SessionError(format!("Failed to open {}: {}", path.display(), e))
    })?;
    Ok(Arc::new(session))
}

/// Holder for SenderPool components and Client
pub struct TelegramClient {
    pub client: Client,
    _handle: SenderPoolHandle,
    // Updates are not consumed, but the runner expects a live receiver.
    _updates: mpsc::UnboundedReceiver<UpdatesLike>,
    _runner_handle: tokio::task::JoinHandle<()>,
}

impl TelegramClient {
    /// Create a new TelegramClient from session
    pub async fn connect(session: Arc<SqliteSession>, api_id: i32) -> Result<Self> {
        let pool = SenderPool::new(session, api_id);

        // Client borrows the whole pool, split it afterwards.
        let client = Client::new(&pool);

        let SenderPool {
            runner,
            updates,
            handle,
        } = pool;

        let runner_handle = tokio::spawn(async move {
            runner.run().await;
        });

        Ok(Self {
            client,
            _handle: handle,
            _updates: updates,
            _runner_handle: runner_handle,
        })
    }
}

impl std::ops::Deref for TelegramClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}
