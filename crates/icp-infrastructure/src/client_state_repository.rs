//! Client state repository implementations.
//!
//! [`TomlClientStateRepository`] keeps the state cached in memory and writes
//! every change through to `client_state.toml`. [`InMemoryClientStateRepository`]
//! is the non-persistent variant used by tests and `--ephemeral` runs.

use crate::paths::{IcpPaths, ServiceType};
use crate::storage::AtomicTomlFile;
use icp_core::error::{IcpError, Result};
use icp_core::state::{ClientState, ClientStateRepository, StateUpdate};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// File-backed client state.
#[derive(Clone)]
pub struct TomlClientStateRepository {
    /// Cached state; the file is only read once, at construction.
    state: Arc<Mutex<ClientState>>,
    file: Arc<AtomicTomlFile<ClientState>>,
}

impl TomlClientStateRepository {
    /// Opens the repository at the default location.
    pub async fn new() -> Result<Self> {
        let path = IcpPaths::default().get_path(ServiceType::ClientState)?;
        Self::at(path).await
    }

    /// Opens the repository at `path`. A corrupt file is logged and replaced
    /// by defaults on the next save.
    pub async fn at(path: PathBuf) -> Result<Self> {
        let file = Arc::new(AtomicTomlFile::<ClientState>::new(path));

        let loader = file.clone();
        let loaded = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| IcpError::internal(format!("Failed to join task: {}", e)))?;

        let initial_state = match loaded {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    "[ClientState] Ignoring unreadable {}: {}",
                    file.path().display(),
                    e
                );
                ClientState::default()
            }
        };

        Ok(Self {
            state: Arc::new(Mutex::new(initial_state)),
            file,
        })
    }
}

impl TomlClientStateRepository {
    /// Writes `state` to disk. Callers hold the cache lock, so writes land in
    /// the same order as the cache changes.
    async fn persist(&self, state: ClientState) -> Result<()> {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || {
            file.save_locked(&state)
                .map_err(|e| IcpError::data_access(format!("Failed to save client state: {}", e)))
        })
        .await
        .map_err(|e| IcpError::internal(format!("Failed to join task: {}", e)))?
    }
}

#[async_trait::async_trait]
impl ClientStateRepository for TomlClientStateRepository {
    async fn save_state(&self, state: ClientState) -> Result<()> {
        let mut state_lock = self.state.lock().await;
        self.persist(state.clone()).await?;
        *state_lock = state;
        Ok(())
    }

    async fn get_state(&self) -> Result<ClientState> {
        Ok(self.state.lock().await.clone())
    }

    async fn update(&self, apply: StateUpdate) -> Result<ClientState> {
        let mut state_lock = self.state.lock().await;
        let mut next = state_lock.clone();
        apply(&mut next);
        // The cache only moves once the file has the new state.
        self.persist(next.clone()).await?;
        *state_lock = next.clone();
        Ok(next)
    }
}

/// Client state that lives only as long as the process.
#[derive(Clone, Default)]
pub struct InMemoryClientStateRepository {
    state: Arc<Mutex<ClientState>>,
}

impl InMemoryClientStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ClientState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

#[async_trait::async_trait]
impl ClientStateRepository for InMemoryClientStateRepository {
    async fn save_state(&self, state: ClientState) -> Result<()> {
        *self.state.lock().await = state;
        Ok(())
    }

    async fn get_state(&self) -> Result<ClientState> {
        Ok(self.state.lock().await.clone())
    }

    async fn update(&self, apply: StateUpdate) -> Result<ClientState> {
        let mut state = self.state.lock().await;
        apply(&mut *state);
        Ok(state.clone())
    }
}
