pub mod auth;
pub mod capability;
pub mod config;
pub mod error;
pub mod presence;
pub mod prompt;
pub mod session;
pub mod speech;
pub mod state;
pub mod timer;
pub mod validator;

// Re-export common error type
pub use error::{Guidance, IcpError, Result};
