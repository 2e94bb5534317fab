//! Credential storage.
//!
//! One process-wide string slot, the single source of truth for whether a
//! session is active. Every write is pushed to a durable slot so a restart
//! restores the previous session, and subscribers run synchronously before
//! `set` returns. Writes never fail from the caller's point of view: a
//! persistence error is logged and the in-memory value still wins.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use anyhow::Context as _;

use aula_client::CredentialSource;

type Subscriber = Arc<dyn Fn(&str) + Send + Sync>;

/// Durable backing for the credential slot (a single named key-value slot).
pub trait CredentialSlot: Send + Sync {
    fn load(&self) -> anyhow::Result<String>;
    fn store(&self, value: &str) -> anyhow::Result<()>;
}

/// File-backed slot under the OS data directory.
#[derive(Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Slot at `{app_data_dir}/aula/credential`.
    pub fn default_path() -> anyhow::Result<Self> {
        let base = dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut home| {
                    home.push(".local");
                    home.push("share");
                    home
                })
            })
            .context("failed to resolve OS app data directory")?;

        let mut dir = base;
        dir.push("aula");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory at {dir:?}"))?;

        dir.push("credential");
        Ok(Self { path: dir })
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialSlot for FileSlot {
    fn load(&self) -> anyhow::Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(value) => Ok(value),
            // No slot yet means no session, not an error.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to read credential slot at {:?}", self.path)),
        }
    }

    fn store(&self, value: &str) -> anyhow::Result<()> {
        std::fs::write(&self.path, value)
            .with_context(|| format!("failed to write credential slot at {:?}", self.path))
    }
}

/// In-memory slot (tests, deliberately ephemeral sessions).
#[derive(Debug, Default)]
pub struct MemorySlot(Mutex<String>);

impl CredentialSlot for MemorySlot {
    fn load(&self) -> anyhow::Result<String> {
        Ok(lock(&self.0).clone())
    }

    fn store(&self, value: &str) -> anyhow::Result<()> {
        *lock(&self.0) = value.to_string();
        Ok(())
    }
}

/// Process-wide credential slot with change notification.
///
/// Owned by the session manager, which is its only writer; readers hold it
/// behind [`CredentialSource`]. Last write wins, no version check.
pub struct CredentialStore {
    value: RwLock<String>,
    subscribers: Mutex<Vec<Subscriber>>,
    slot: Box<dyn CredentialSlot>,
}

impl CredentialStore {
    /// Restore the store from its durable slot.
    pub fn open(slot: Box<dyn CredentialSlot>) -> Self {
        let value = slot.load().unwrap_or_else(|err| {
            tracing::error!("failed to restore credential slot: {err:?}");
            String::new()
        });
        Self {
            value: RwLock::new(value),
            subscribers: Mutex::new(Vec::new()),
            slot,
        }
    }

    /// Store backed by the default on-disk slot.
    pub fn file() -> anyhow::Result<Self> {
        Ok(Self::open(Box::new(FileSlot::default_path()?)))
    }

    /// Store with no durability (tests, ephemeral sessions).
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemorySlot::default()))
    }

    /// Current credential; empty string when no session is active.
    pub fn get(&self) -> String {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the credential.
    ///
    /// The new value is persisted and every subscriber runs synchronously
    /// before this returns.
    pub fn set(&self, value: &str) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = value.to_string();

        if let Err(err) = self.slot.store(value) {
            tracing::error!("failed to persist credential: {err:?}");
        }

        let subscribers: Vec<Subscriber> = lock(&self.subscribers).clone();
        for subscriber in subscribers {
            subscriber(value);
        }
    }

    /// Register a callback invoked on every `set` with the new value.
    pub fn subscribe(&self, subscriber: impl Fn(&str) + Send + Sync + 'static) {
        lock(&self.subscribers).push(Arc::new(subscriber));
    }
}

impl CredentialSource for CredentialStore {
    fn credential(&self) -> String {
        self.get()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
