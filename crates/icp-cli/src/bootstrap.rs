use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use icp_application::{AuthStateService, Capabilities, InterviewController};
use icp_core::config::Settings;
use icp_core::session::{InterviewBackend, TokenSource};
use icp_core::state::ClientStateRepository;
use icp_infrastructure::{
    IcpPaths, InMemoryClientStateRepository, ServiceType, TomlClientStateRepository,
    load_settings,
};
use icp_interaction::HttpInterviewBackend;

use crate::terminal::TerminalPrompt;

/// Startup options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    pub config_dir: Option<PathBuf>,
    pub api_url: Option<String>,
    /// Keep client state in memory only.
    pub ephemeral: bool,
}

/// The wired-up client: one controller over one repository and one backend.
pub struct AppBootstrap {
    pub settings: Settings,
    pub paths: IcpPaths,
    pub repository: Arc<dyn ClientStateRepository>,
    pub auth: Arc<AuthStateService>,
    pub controller: Arc<InterviewController>,
    pub prompt: Arc<TerminalPrompt>,
}

impl AppBootstrap {
    pub async fn new(options: BootstrapOptions) -> Result<Self> {
        let paths = IcpPaths::new(options.config_dir);
        let mut settings = load_settings(&paths).context("Failed to load settings")?;
        if let Some(url) = options.api_url {
            settings.api_base_url = url.trim_end_matches('/').to_string();
        }
        tracing::debug!("[Bootstrap] API base URL: {}", settings.api_base_url);

        let repository: Arc<dyn ClientStateRepository> = if options.ephemeral {
            tracing::info!("[Bootstrap] Using in-memory client state");
            Arc::new(InMemoryClientStateRepository::new())
        } else {
            let path = paths.get_path(ServiceType::ClientState)?;
            tracing::info!("[Bootstrap] Client state at {}", path.display());
            Arc::new(
                TomlClientStateRepository::at(path)
                    .await
                    .context("Failed to open client state")?,
            )
        };

        let auth = Arc::new(AuthStateService::new(repository.clone()));
        let tokens: Arc<dyn TokenSource> = auth.clone();
        let backend: Arc<dyn InterviewBackend> =
            Arc::new(HttpInterviewBackend::from_settings(&settings, tokens));
        let prompt = Arc::new(TerminalPrompt::new());

        // The terminal has no camera, microphone or speech engine.
        let controller = InterviewController::new(
            settings.clone(),
            backend,
            repository.clone(),
            auth.clone(),
            prompt.clone(),
            Capabilities::none(),
        );

        Ok(Self {
            settings,
            paths,
            repository,
            auth,
            controller,
            prompt,
        })
    }

    /// Loads auth and preferences, fetches the quota and re-attaches to an
    /// interrupted session.
    pub async fn initialize(&self) -> Result<()> {
        self.controller
            .init()
            .await
            .context("Failed to initialize the interview controller")
    }

    /// Fails with a sign-in hint when no valid token is stored.
    pub async fn require_sign_in(&self) -> Result<()> {
        if self.auth.init().await?.is_none() {
            anyhow::bail!("Not signed in. Run `icp login <TOKEN>` first.");
        }
        Ok(())
    }
}
