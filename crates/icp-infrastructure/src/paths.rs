//! Path management for client files.
//!
//! # Directory Structure
//!
//! ```text
//! <config dir>/interview-coach-prep/
//! ├── settings.toml        # Optional user settings
//! ├── client_state.toml    # Token, session cache and device preferences
//! └── logs/                # Rolling CLI logs
//!     └── icp.log.YYYY-MM-DD
//! ```
//!
//! `<config dir>` is `~/.config` on Linux, `~/Library/Application Support`
//! on macOS and `%APPDATA%` on Windows.

use icp_core::error::{IcpError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "interview-coach-prep";

/// Which file to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Settings,
    ClientState,
    Logs,
}

impl ServiceType {
    fn relative_path(self) -> &'static str {
        match self {
            ServiceType::Settings => "settings.toml",
            ServiceType::ClientState => "client_state.toml",
            ServiceType::Logs => "logs",
        }
    }
}

/// Resolves client paths, optionally under an override base directory.
#[derive(Debug, Clone, Default)]
pub struct IcpPaths {
    base_override: Option<PathBuf>,
}

impl IcpPaths {
    /// `base` replaces `<config dir>/interview-coach-prep` when given.
    pub fn new(base: Option<PathBuf>) -> Self {
        Self {
            base_override: base,
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_override {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| IcpError::config("Cannot find the user configuration directory"))
    }

    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(service.relative_path()))
    }
}
