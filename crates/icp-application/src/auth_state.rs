//! Process-wide authentication state.
//!
//! `AuthStateService` owns the bearer token. Components that care about
//! sign-in changes subscribe to [`AuthEvent`]s instead of polling.

use icp_core::auth::{TokenClaims, decode_claims, is_placeholder_token};
use icp_core::error::Result;
use icp_core::session::TokenSource;
use icp_core::state::ClientStateRepository;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { claims: TokenClaims },
    SignedOut,
}

#[derive(Debug, Clone, Default)]
struct AuthSnapshot {
    token: Option<String>,
    claims: Option<TokenClaims>,
}

pub struct AuthStateService {
    repository: Arc<dyn ClientStateRepository>,
    // Read synchronously by `TokenSource`, so not a tokio lock.
    current: RwLock<AuthSnapshot>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthStateService {
    pub fn new(repository: Arc<dyn ClientStateRepository>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            repository,
            current: RwLock::new(AuthSnapshot::default()),
            events,
        }
    }

    /// Loads the persisted token.
    ///
    /// Placeholder tokens ("undefined", "null"), undecodable tokens and
    /// already-expired tokens are discarded and the user starts signed out.
    pub async fn init(&self) -> Result<Option<TokenClaims>> {
        let Some(token) = self.repository.get_token().await else {
            tracing::debug!("[AuthState] No persisted token");
            return Ok(None);
        };

        if is_placeholder_token(&token) {
            tracing::info!("[AuthState] Dropping placeholder token");
            self.clear_token().await?;
            return Ok(None);
        }

        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("[AuthState] Persisted token is unreadable: {}", e);
                self.clear_token().await?;
                return Ok(None);
            }
        };

        if claims.remaining_secs(chrono::Utc::now().timestamp()) == Some(0) {
            tracing::info!("[AuthState] Persisted token has expired");
            self.clear_token().await?;
            return Ok(None);
        }

        self.store(Some(token), Some(claims.clone()));
        let _ = self.events.send(AuthEvent::SignedIn {
            claims: claims.clone(),
        });
        Ok(Some(claims))
    }

    /// Signs in with a freshly issued token.
    pub async fn set_token(&self, token: String) -> Result<TokenClaims> {
        let claims = decode_claims(&token)?;
        self.repository.set_token(token.clone()).await?;
        self.store(Some(token), Some(claims.clone()));

        tracing::info!(
            "[AuthState] Signed in as {}",
            claims.email.as_deref().unwrap_or("<unknown>")
        );
        let _ = self.events.send(AuthEvent::SignedIn {
            claims: claims.clone(),
        });
        Ok(claims)
    }

    /// Signs out and wipes every piece of persisted client state.
    pub async fn clear_token(&self) -> Result<()> {
        self.store(None, None);
        self.repository.clear_all().await?;
        tracing::info!("[AuthState] Signed out");
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().token.is_some()
    }

    pub fn claims(&self) -> Option<TokenClaims> {
        self.snapshot().claims
    }

    /// Seconds until the token expires, if it carries an `exp` claim.
    pub fn remaining_secs(&self) -> Option<u64> {
        self.claims()?
            .remaining_secs(chrono::Utc::now().timestamp())
    }

    fn snapshot(&self) -> AuthSnapshot {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store(&self, token: Option<String>, claims: Option<TokenClaims>) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = AuthSnapshot { token, claims };
    }
}

impl TokenSource for AuthStateService {
    fn bearer_token(&self) -> Option<String> {
        self.snapshot().token
    }
}
