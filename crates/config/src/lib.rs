//! Configuration loading and env substitution.
//!
//! Config files: `postwright.toml`, `postwright.yaml`, or `postwright.json`,
//! searched in `./` then `~/.config/postwright/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values; credentials fall
//! back to `NAVER_ID` / `NAVER_PW` when the config section is empty.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config},
    schema::{
        Credentials, CredentialsConfig, EditorConfig, Locators, PostwrightConfig, ServerConfig,
    },
};
