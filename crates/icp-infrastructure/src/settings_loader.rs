//! Settings loading.
//!
//! Reads `settings.toml` when present, falls back to defaults per field and
//! applies environment overrides last.

use crate::paths::{IcpPaths, ServiceType};
use crate::storage::AtomicTomlFile;
use icp_core::config::Settings;
use icp_core::error::Result;
use std::path::Path;

/// Overrides `api_base_url`.
pub const API_URL_ENV: &str = "ICP_API_URL";

pub fn load_settings(paths: &IcpPaths) -> Result<Settings> {
    let path = paths.get_path(ServiceType::Settings)?;
    load_settings_from(&path, |key| std::env::var(key).ok())
}

/// Loads settings from `path`, resolving overrides through `env`.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Settings> {
    let file = AtomicTomlFile::<Settings>::new(path.to_path_buf());
    let mut settings = match file.load()? {
        Some(settings) => {
            tracing::debug!("[Settings] Loaded {}", path.display());
            settings
        }
        None => Settings::default(),
    };

    if let Some(url) = env(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
        tracing::debug!("[Settings] {} overrides the API base URL", API_URL_ENV);
        settings.api_base_url = url.trim().to_string();
    }
    settings.api_base_url = settings.api_base_url.trim_end_matches('/').to_string();

    Ok(settings)
}
