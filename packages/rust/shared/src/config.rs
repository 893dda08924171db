//! Application configuration for hostfilter.
//!
//! User config lives at `~/.hostfilter/hostfilter.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HostFilterError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "hostfilter.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".hostfilter";

/// Process name fragment that marks a host as already running the agent.
pub const DEFAULT_MARKER: &str = "NinjaRMMAgent";

// ---------------------------------------------------------------------------
// Config structs (matching hostfilter.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Filter settings.
    #[serde(default)]
    pub filter: FilterSection,

    /// Output location defaults.
    #[serde(default)]
    pub output: OutputSection,

    /// Folder merge settings.
    #[serde(default)]
    pub merge: MergeSection,
}

/// `[filter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSection {
    /// Substring that identifies the agent process in the `Name` column.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Header of the process/agent name column.
    #[serde(default = "default_name_column")]
    pub name_column: String,

    /// Header of the IP address column.
    #[serde(default = "default_ip_column")]
    pub ip_column: String,

    /// Header of the host name column.
    #[serde(default = "default_hostname_column")]
    pub hostname_column: String,

    /// Encoding label of input files (WHATWG label, e.g. `windows-1252`).
    #[serde(default = "default_input_encoding")]
    pub input_encoding: String,

    /// Encoding label for the written CSV.
    #[serde(default = "default_output_encoding")]
    pub output_encoding: String,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            name_column: default_name_column(),
            ip_column: default_ip_column(),
            hostname_column: default_hostname_column(),
            input_encoding: default_input_encoding(),
            output_encoding: default_output_encoding(),
        }
    }
}

fn default_marker() -> String {
    DEFAULT_MARKER.into()
}
fn default_name_column() -> String {
    "Name".into()
}
fn default_ip_column() -> String {
    "IP".into()
}
fn default_hostname_column() -> String {
    "HostName".into()
}
fn default_input_encoding() -> String {
    "windows-1252".into()
}
fn default_output_encoding() -> String {
    "utf-8".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Directory for the filtered CSV when none is chosen. Empty means Downloads.
    #[serde(default)]
    pub default_dir: String,

    /// File name for the filtered CSV when none is chosen.
    #[serde(default = "default_file_name")]
    pub default_file_name: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            default_dir: String::new(),
            default_file_name: default_file_name(),
        }
    }
}

fn default_file_name() -> String {
    "MachinesWithoutNinja.csv".into()
}

/// `[merge]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSection {
    /// Output file for `hostfilter merge`, relative to the working directory.
    #[serde(default = "default_merge_output")]
    pub output_file: String,
}

impl Default for MergeSection {
    fn default() -> Self {
        Self {
            output_file: default_merge_output(),
        }
    }
}

fn default_merge_output() -> String {
    "merged_file.txt".into()
}

// ---------------------------------------------------------------------------
// Filter config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Header names of the three columns the filter reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub name: String,
    pub ip: String,
    pub host_name: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            name: default_name_column(),
            ip: default_ip_column(),
            host_name: default_hostname_column(),
        }
    }
}

/// Runtime filter configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Marker substring (case-sensitive).
    pub marker: String,
    /// Column triple used for classification and host keys.
    pub columns: ColumnNames,
    /// Input encoding label.
    pub input_encoding: String,
    /// Output encoding label.
    pub output_encoding: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FilterConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            marker: config.filter.marker.clone(),
            columns: ColumnNames {
                name: config.filter.name_column.clone(),
                ip: config.filter.ip_column.clone(),
                host_name: config.filter.hostname_column.clone(),
            },
            input_encoding: config.filter.input_encoding.clone(),
            output_encoding: config.filter.output_encoding.clone(),
        }
    }
}

/// Reject configurations the filter cannot run with.
pub fn validate_filter_config(config: &FilterConfig) -> Result<()> {
    if config.marker.is_empty() {
        return Err(HostFilterError::config("marker must not be empty"));
    }

    let cols = &config.columns;
    for (what, value) in [
        ("name column", &cols.name),
        ("IP column", &cols.ip),
        ("host name column", &cols.host_name),
    ] {
        if value.trim().is_empty() {
            return Err(HostFilterError::config(format!("{what} must not be empty")));
        }
    }

    if cols.name == cols.ip || cols.name == cols.host_name || cols.ip == cols.host_name {
        return Err(HostFilterError::config(format!(
            "column names must be distinct (got {:?}, {:?}, {:?})",
            cols.name, cols.ip, cols.host_name
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.hostfilter/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| HostFilterError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.hostfilter/hostfilter.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// The user's Downloads folder, falling back to `<home>/Downloads`, then `.`.
pub fn downloads_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Where the filtered CSV goes when the user does not choose a destination.
pub fn default_output_path(config: &AppConfig) -> PathBuf {
    let dir = if config.output.default_dir.trim().is_empty() {
        downloads_dir()
    } else {
        PathBuf::from(&config.output.default_dir)
    };
    dir.join(&config.output.default_file_name)
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HostFilterError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        HostFilterError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HostFilterError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| HostFilterError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HostFilterError::write(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
