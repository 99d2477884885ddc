//! Shared types, error model, and configuration for reddit2epub.
//!
//! This crate is the foundation depended on by all other reddit2epub crates.
//! It provides:
//! - [`Reddit2EpubError`]: the unified error type
//! - Domain types ([`Post`], [`PostId`], [`Book`], [`Chapter`], [`Toc`])
//! - Configuration ([`AppConfig`], [`ClientConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClientConfig, Credentials, DEFAULT_OVERLAP, DEFAULT_USER_AGENT, DefaultsConfig,
    RedditConfig, TOO_MANY_CHAPTERS_WARNING, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_credentials,
};
pub use error::{Reddit2EpubError, Result};
pub use types::{Book, Chapter, Post, PostId, Toc, TocEntry};
