//! Browser-driven authoring against the Naver blog SmartEditor.
//!
//! Drives a Chromium instance over CDP to create and incrementally edit a
//! blog post, without the caller knowing the editor's DOM structure.
//!
//! # Structure
//!
//! - **session**: lazy single-session bring-up and login
//! - **gate**: navigation, frame switch, overlay dismissal
//! - **editor**: the content operations (create, append, replace, remove)
//!   and the live body snapshot
//! - **service**: the serialized front door the HTTP boundary talks to
//!
//! # Example
//!
//! ```ignore
//! use postwright_browser::EditorService;
//! use postwright_config::{Credentials, EditorConfig};
//!
//! let service = EditorService::new(EditorConfig::default(), credentials);
//! service.create("Hello", "Hello\nWorld").await?;
//! service.replace("World", "Rust").await?;
//! ```

mod dom;
pub mod editor;
pub mod error;
mod gate;
mod launch;
mod session;
pub mod service;

pub use {
    editor::{EditMode, substitute_first},
    error::EditorError,
    service::EditorService,
};
