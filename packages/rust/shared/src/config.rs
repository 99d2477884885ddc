//! Application configuration for reddit2epub.
//!
//! User config lives at `~/.reddit2epub/reddit2epub.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Reddit2EpubError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "reddit2epub.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".reddit2epub";

/// Number of leading title words that must match when none is given.
pub const DEFAULT_OVERLAP: usize = 2;

/// Chapter count at which the caller is warned that Reddit's listing
/// pagination may have cut off the oldest chapters.
pub const TOO_MANY_CHAPTERS_WARNING: usize = 200;

/// User-Agent string for API requests.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "script:reddit2epub:",
    env!("CARGO_PKG_VERSION"),
    " (reddit2epub)"
);

// ---------------------------------------------------------------------------
// Config structs (matching reddit2epub.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Reddit API settings.
    #[serde(default)]
    pub reddit: RedditConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Leading title words shared by all chapters of a series.
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Scan the author's posts in every subreddit, not just the anchor's.
    #[serde(default)]
    pub all_subreddits: bool,

    /// Directory where derived output file names are placed.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            overlap: default_overlap(),
            all_subreddits: false,
            output_dir: default_output_dir(),
        }
    }
}

fn default_overlap() -> usize {
    DEFAULT_OVERLAP
}
fn default_output_dir() -> String {
    ".".into()
}

/// `[reddit]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    /// Name of the env var holding the OAuth client id.
    #[serde(default = "default_client_id_env")]
    pub client_id_env: String,

    /// Name of the env var holding the OAuth client secret (never store the secret itself).
    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,

    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base URL for authenticated API calls.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Base URL for the OAuth token endpoint.
    #[serde(default = "default_auth_base")]
    pub auth_base: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Listing page size (Reddit caps this at 100).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause between listing page requests, in ms.
    #[serde(default)]
    pub rate_limit_ms: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id_env: default_client_id_env(),
            client_secret_env: default_client_secret_env(),
            user_agent: default_user_agent(),
            api_base: default_api_base(),
            auth_base: default_auth_base(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            rate_limit_ms: 0,
        }
    }
}

fn default_client_id_env() -> String {
    "REDDIT_CLIENT_ID".into()
}
fn default_client_secret_env() -> String {
    "REDDIT_CLIENT_SECRET".into()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_api_base() -> String {
    "https://oauth.reddit.com".into()
}
fn default_auth_base() -> String {
    "https://www.reddit.com".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_page_size() -> u32 {
    100
}

// ---------------------------------------------------------------------------
// Client config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime API client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub api_base: String,
    pub auth_base: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub rate_limit_ms: u64,
}

impl From<&AppConfig> for ClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.reddit.user_agent.clone(),
            api_base: config.reddit.api_base.clone(),
            auth_base: config.reddit.auth_base.clone(),
            timeout_secs: config.reddit.timeout_secs,
            page_size: config.reddit.page_size.clamp(1, 100),
            rate_limit_ms: config.reddit.rate_limit_ms,
        }
    }
}

/// OAuth application credentials.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Resolve credentials: explicit values win, then the env vars named in config.
pub fn resolve_credentials(
    config: &AppConfig,
    client_id: Option<&str>,
    client_secret: Option<&str>,
) -> Result<Credentials> {
    let client_id = pick(client_id, &config.reddit.client_id_env).ok_or_else(|| {
        Reddit2EpubError::config(format!(
            "Reddit client id not found. Pass --client-id or set the {} environment variable.",
            config.reddit.client_id_env
        ))
    })?;
    let client_secret = pick(client_secret, &config.reddit.client_secret_env).ok_or_else(|| {
        Reddit2EpubError::config(format!(
            "Reddit API secret not found. Pass --api-secret or set the {} environment variable.\n\
             Create a script app at https://www.reddit.com/prefs/apps",
            config.reddit.client_secret_env
        ))
    })?;

    Ok(Credentials {
        client_id,
        client_secret,
    })
}

fn pick(explicit: Option<&str>, env_name: &str) -> Option<String> {
    match explicit {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => std::env::var(env_name).ok().filter(|v| !v.is_empty()),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.reddit2epub/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Reddit2EpubError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.reddit2epub/reddit2epub.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

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
    let content = std::fs::read_to_string(path).map_err(|e| Reddit2EpubError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        Reddit2EpubError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| Reddit2EpubError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| Reddit2EpubError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| Reddit2EpubError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
