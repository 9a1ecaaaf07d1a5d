pub mod client_state_repository;
pub mod paths;
pub mod settings_loader;
pub mod storage;

pub use crate::client_state_repository::{
    InMemoryClientStateRepository, TomlClientStateRepository,
};
pub use crate::paths::{IcpPaths, ServiceType};
pub use crate::settings_loader::load_settings;
