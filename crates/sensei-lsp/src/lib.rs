//! Sensei Language Server
//!
//! LSP server for SENSEI user-profile YAML, providing:
//! - Completions (schema keys and values for the cursor's context path)
//! - Diagnostics (misspelled keys, missing required keys)
//! - Quick fixes for misspelled keys
//! - Hover information from the schema

mod config;
mod server;

pub use config::{
    LoadConfigError, SenseiUserConfig, TypoConfig, config_path, load_config, load_config_from,
};
pub use server::{SenseiLanguageServer, run};
