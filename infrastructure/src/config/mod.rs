//! Configuration: TOML file structure, multi-source loader, and
//! environment-driven toggles.

pub mod env;
pub mod file_config;
pub mod loader;

pub use env::{EnvSnapshot, env_snapshot, has_credential, tool_enabled, tool_path_override};
pub use file_config::{FileApiConfig, FileConfig, FileRetryConfig, FileToolConfig, FileToolsConfig};
pub use loader::ConfigLoader;
