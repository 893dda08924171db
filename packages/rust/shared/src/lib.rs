//! Shared error model, configuration, and file helpers for hostfilter.
//!
//! This crate is the foundation depended on by all other hostfilter crates.
//! It provides:
//! - [`HostFilterError`] — the unified error type
//! - Configuration ([`AppConfig`], [`FilterConfig`], config loading)
//! - [`write_atomic`] — all-or-nothing output writes

pub mod config;
pub mod error;
pub mod fs;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ColumnNames, DEFAULT_MARKER, FilterConfig, FilterSection, MergeSection,
    OutputSection, config_dir, config_file_path, default_output_path, downloads_dir, init_config,
    load_config, load_config_from, validate_filter_config,
};
pub use error::{HostFilterError, Result};
pub use fs::write_atomic;
