//! Runtime configuration for form behaviour.
//!
//! Every section is optional; an absent file or section falls back to the
//! defaults in [`types`].

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    Config, ErrorsConfig, FormsetConfig, LegacyConfig, NavigationConfig, RenderCheckMode,
    RenderChecksConfig,
};
