//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.openaictl/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! A `.env` file is honored too (loaded by `dotenv` in `main`); the only
//! required setting anywhere is the API key.

use log::{debug, info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub history_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Overrides taken from the command line (None = not specified).
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_HISTORY_FILE: &str = "/history/.openaictl_history";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub history_file: PathBuf,
    pub base_url: String,
    pub system_prompt: String,
    pub log_level: LevelFilter,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::MissingApiKey => write!(
                f,
                "OPENAI_API_KEY is not set (add it to your environment or .env file)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.openaictl/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".openaictl").join("config.toml"))
}

/// Load config from `~/.openaictl/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `AppConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(AppConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: AppConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# openaictl Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# model = "gpt-3.5-turbo"
# max_tokens = 150
# history_file = "/history/.openaictl_history"
# log_level = "warn"                 # off, error, warn, info, debug, trace
# system_prompt = "You are a helpful assistant."

# [openai]
# api_key = "sk-..."                 # Or set OPENAI_API_KEY env var
# base_url = "https://api.openai.com/v1"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env
/// vars → CLI flags.
///
/// The API key is the one required setting; everything else degrades to a
/// default. Returns `ConfigError::MissingApiKey` when no key is found in
/// either the environment or the config file.
pub fn resolve(config: &AppConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    // API key: env → config. Required.
    let api_key = env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .or_else(|| config.openai.api_key.clone())
        .ok_or(ConfigError::MissingApiKey)?;

    // Model: CLI → env → config → default
    let model = cli
        .model
        .clone()
        .or_else(|| env::var("MODEL").ok())
        .or_else(|| config.general.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // Max output tokens: CLI → env → config → default
    let max_tokens = cli
        .max_tokens
        .or_else(|| env::var("MAX_TOKENS").ok().and_then(|raw| parse_max_tokens(&raw)))
        .or(config.general.max_tokens)
        .unwrap_or(DEFAULT_MAX_TOKENS);

    // History file: env → config → default
    let history_file = env::var("HISTORY_FILE")
        .ok()
        .map(PathBuf::from)
        .or_else(|| config.general.history_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE));

    // Base URL: env → config → default
    let base_url = env::var("OPENAI_BASE_URL")
        .ok()
        .or_else(|| config.openai.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

    // Log level: env → config → default
    let log_level = env::var("LOG_LEVEL")
        .ok()
        .or_else(|| config.general.log_level.clone())
        .map(|raw| {
            parse_log_level(&raw).unwrap_or_else(|| {
                warn!("Unrecognized log level {raw:?}, using {DEFAULT_LOG_LEVEL}");
                DEFAULT_LOG_LEVEL
            })
        })
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let system_prompt = config
        .general
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    Ok(ResolvedConfig {
        api_key,
        model,
        max_tokens,
        history_file,
        base_url,
        system_prompt,
        log_level,
    })
}

/// Parses the MAX_TOKENS value; a non-integer logs a warning and is
/// treated as unset.
fn parse_max_tokens(raw: &str) -> Option<u32> {
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("MAX_TOKENS is not an integer: {raw:?}, using default");
            None
        }
    }
}

/// Parses a log level name. Accepts the standard filter names plus
/// `warning` as an alias for `warn`.
fn parse_log_level(raw: &str) -> Option<LevelFilter> {
    match raw.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolution reads the process environment, so every resolve test
    /// clears the consulted variables first. No test sets them.
    fn clear_env() {
        for var in [
            "OPENAI_API_KEY",
            "MODEL",
            "MAX_TOKENS",
            "HISTORY_FILE",
            "OPENAI_BASE_URL",
            "LOG_LEVEL",
        ] {
            unsafe { env::remove_var(var) };
        }
    }

    fn config_with_key() -> AppConfig {
        AppConfig {
            openai: OpenAiConfig {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert!(config.general.model.is_none());
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_sparse() {
        clear_env();
        let resolved = resolve(&config_with_key(), &CliOverrides::default()).unwrap();
        assert_eq!(resolved.api_key, "sk-test");
        assert_eq!(resolved.model, DEFAULT_MODEL);
        assert_eq!(resolved.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(resolved.history_file, PathBuf::from(DEFAULT_HISTORY_FILE));
        assert_eq!(resolved.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(resolved.log_level, LevelFilter::Warn);
        assert_eq!(resolved.system_prompt, "You are a helpful assistant.");
    }

    #[test]
    fn test_resolve_missing_api_key_is_fatal() {
        clear_env();
        let result = resolve(&AppConfig::default(), &CliOverrides::default());
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        clear_env();
        let config = AppConfig {
            general: GeneralConfig {
                model: Some("gpt-4o-mini".to_string()),
                max_tokens: Some(512),
                history_file: Some(PathBuf::from("/tmp/histfile")),
                log_level: Some("debug".to_string()),
                system_prompt: Some("Custom prompt.".to_string()),
            },
            openai: OpenAiConfig {
                api_key: Some("sk-test".to_string()),
                base_url: Some("http://localhost:8080/v1".to_string()),
            },
        };
        let resolved = resolve(&config, &CliOverrides::default()).unwrap();
        assert_eq!(resolved.model, "gpt-4o-mini");
        assert_eq!(resolved.max_tokens, 512);
        assert_eq!(resolved.history_file, PathBuf::from("/tmp/histfile"));
        assert_eq!(resolved.base_url, "http://localhost:8080/v1");
        assert_eq!(resolved.log_level, LevelFilter::Debug);
        assert_eq!(resolved.system_prompt, "Custom prompt.");
    }

    #[test]
    fn test_resolve_cli_flags_win() {
        clear_env();
        let config = AppConfig {
            general: GeneralConfig {
                model: Some("from-config".to_string()),
                max_tokens: Some(99),
                ..Default::default()
            },
            openai: OpenAiConfig {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
        };
        let cli = CliOverrides {
            model: Some("from-cli".to_string()),
            max_tokens: Some(42),
        };
        let resolved = resolve(&config, &cli).unwrap();
        assert_eq!(resolved.model, "from-cli");
        assert_eq!(resolved.max_tokens, 42);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
model = "gpt-4o"
max_tokens = 300
history_file = "/data/history"
log_level = "info"

[openai]
api_key = "sk-test-123"
base_url = "http://127.0.0.1:4000/v1"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.general.max_tokens, Some(300));
        assert_eq!(
            config.general.history_file,
            Some(PathBuf::from("/data/history"))
        );
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test-123"));
        assert_eq!(
            config.openai.base_url.as_deref(),
            Some("http://127.0.0.1:4000/v1")
        );
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing — everything else stays default
        let toml_str = r#"
[general]
model = "my-model"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.model.as_deref(), Some("my-model"));
        assert!(config.general.max_tokens.is_none());
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn test_parse_log_level_names() {
        assert_eq!(parse_log_level("warn"), Some(LevelFilter::Warn));
        assert_eq!(parse_log_level("WARNING"), Some(LevelFilter::Warn));
        assert_eq!(parse_log_level("Error"), Some(LevelFilter::Error));
        assert_eq!(parse_log_level("trace"), Some(LevelFilter::Trace));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_parse_max_tokens_rejects_garbage() {
        assert_eq!(parse_max_tokens("150"), Some(150));
        assert_eq!(parse_max_tokens(" 42 "), Some(42));
        assert_eq!(parse_max_tokens("lots"), None);
        assert_eq!(parse_max_tokens("-5"), None);
    }
}
