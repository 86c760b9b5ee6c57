#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, ItemArg, LineArg};
pub use toml_config::{Backend, StorefrontConfig};
