//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.parley/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! The API key and the instruction prefix are only ever read from here or
//! from the environment.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::inference::providers::gemini::DEFAULT_GEMINI_BASE_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Directory of the file this was read from; relative paths resolve here.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub model: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub instruction: Option<String>,
    pub instruction_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_MODEL: &str = "PARLEY_MODEL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model_name: String,
    pub request_timeout_secs: u64,
    pub instruction: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
}

impl ResolvedConfig {
    /// The API key, or `ConfigError::MissingApiKey` when none was configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
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
                "no Gemini API key: set {ENV_API_KEY} or [gemini] api_key in ~/.parley/config.toml"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.parley`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".parley"))
}

/// Returns the path to `~/.parley/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `explicit` or `~/.parley/config.toml`.
///
/// A missing default file is generated (commented out) and treated as empty.
/// A missing explicit file is an error. A malformed file returns
/// `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<ParleyConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ParleyConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ParleyConfig::default());
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<ParleyConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ParleyConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    config.base_dir = path.parent().map(Path::to_path_buf);
    info!("Loaded config from {}", path.display());
    debug!(
        "Config: model={:?}, timeout={:?}, api_key_set={}",
        config.general.model,
        config.general.request_timeout_secs,
        config.gemini.api_key.is_some()
    );
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# parley configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# model = "gemini-2.0-flash"          # Or set PARLEY_MODEL
# request_timeout_secs = 60
# instruction_file = "instruction.md" # Path relative to this file
# instruction = """
# You are a shopping assistant. Answer with a JSON array of products.
# Each product has the fields: name, price, description.
# """

# [gemini]
# api_key = "..."                     # Or set GEMINI_API_KEY
# base_url = "https://generativelanguage.googleapis.com/v1beta"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ParleyConfig, cli_model: Option<&str>) -> ResolvedConfig {
    resolve_with_env(config, cli_model, |key| std::env::var(key).ok())
}

/// [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(
    config: &ParleyConfig,
    cli_model: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Model: CLI → env → config → default
    let model_name = cli_model
        .map(|s| s.to_string())
        .or_else(|| env(ENV_MODEL))
        .or_else(|| config.general.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // API key: env → config
    let gemini_api_key = env(ENV_API_KEY).or_else(|| config.gemini.api_key.clone());

    // Base URL: env → config → default
    let gemini_base_url = env(ENV_BASE_URL)
        .or_else(|| config.gemini.base_url.clone())
        .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

    let request_timeout_secs = config
        .general
        .request_timeout_secs
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    ResolvedConfig {
        model_name,
        request_timeout_secs,
        instruction: resolve_instruction(
            config,
            config.base_dir.clone().or_else(config_dir).as_deref(),
        ),
        gemini_api_key,
        gemini_base_url,
    }
}

/// Resolves the instruction prefix: inline wins over file; neither means none.
fn resolve_instruction(config: &ParleyConfig, base_dir: Option<&Path>) -> Option<String> {
    if let Some(ref instruction) = config.general.instruction {
        return Some(instruction.clone());
    }

    let file = config.general.instruction_file.as_ref()?;
    let path = match base_dir {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    };
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let trimmed = contents.trim().to_string();
            if trimmed.is_empty() {
                warn!("Instruction file is empty: {}", path.display());
                None
            } else {
                info!("Loaded instruction from {}", path.display());
                Some(trimmed)
            }
        }
        Err(e) => {
            warn!("Failed to read instruction file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_parses() {
        let config = ParleyConfig::default();
        assert!(config.general.model.is_none());
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&ParleyConfig::default(), None, no_env);
        assert_eq!(resolved.model_name, DEFAULT_MODEL);
        assert_eq!(resolved.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(resolved.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
        assert!(resolved.instruction.is_none());
        assert!(resolved.gemini_api_key.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = ParleyConfig {
            general: GeneralConfig {
                model: Some("gemini-2.5-pro".to_string()),
                request_timeout_secs: Some(15),
                instruction: Some("Be brief.".to_string()),
                instruction_file: None,
            },
            gemini: GeminiConfig {
                api_key: Some("file-key".to_string()),
                base_url: Some("http://proxy.local/v1beta".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, None, no_env);
        assert_eq!(resolved.model_name, "gemini-2.5-pro");
        assert_eq!(resolved.request_timeout_secs, 15);
        assert_eq!(resolved.instruction.as_deref(), Some("Be brief."));
        assert_eq!(resolved.gemini_api_key.as_deref(), Some("file-key"));
        assert_eq!(resolved.gemini_base_url, "http://proxy.local/v1beta");
    }

    #[test]
    fn test_env_overrides_config_and_cli_overrides_env() {
        let config = ParleyConfig {
            general: GeneralConfig {
                model: Some("from-file".to_string()),
                ..Default::default()
            },
            gemini: GeminiConfig {
                api_key: Some("file-key".to_string()),
                base_url: None,
            },
            ..Default::default()
        };
        let env = env_from(&[
            (ENV_MODEL, "from-env"),
            (ENV_API_KEY, "env-key"),
            (ENV_BASE_URL, "http://env.local"),
        ]);

        let resolved = resolve_with_env(&config, None, &env);
        assert_eq!(resolved.model_name, "from-env");
        assert_eq!(resolved.gemini_api_key.as_deref(), Some("env-key"));
        assert_eq!(resolved.gemini_base_url, "http://env.local");

        let resolved = resolve_with_env(&config, Some("from-cli"), &env);
        assert_eq!(resolved.model_name, "from-cli");
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = ParleyConfig {
            general: GeneralConfig {
                request_timeout_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, None, no_env);
        assert_eq!(resolved.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_require_api_key() {
        let mut resolved = resolve_with_env(&ParleyConfig::default(), None, no_env);
        assert!(matches!(
            resolved.require_api_key(),
            Err(ConfigError::MissingApiKey)
        ));
        resolved.gemini_api_key = Some("   ".to_string());
        assert!(resolved.require_api_key().is_err());
        resolved.gemini_api_key = Some("k".to_string());
        assert_eq!(resolved.require_api_key().unwrap(), "k");
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
model = "gemini-2.0-flash"
request_timeout_secs = 30
instruction = """
Answer as JSON.
Fields: name, price, description.
"""

[gemini]
api_key = "test-key-123"
base_url = "http://127.0.0.1:8080/v1beta"
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(config.general.request_timeout_secs, Some(30));
        assert_eq!(
            config.general.instruction.as_deref(),
            Some("Answer as JSON.\nFields: name, price, description.\n")
        );
        assert_eq!(config.gemini.api_key.as_deref(), Some("test-key-123"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[general]
model = "my-model"
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.model.as_deref(), Some("my-model"));
        assert!(config.general.request_timeout_secs.is_none());
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("parley-config-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        fs::write(&path, "[general\nmodel = ").unwrap();

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let path = std::env::temp_dir().join("parley-definitely-missing.toml");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_inline_instruction_wins_over_file() {
        let config = ParleyConfig {
            general: GeneralConfig {
                instruction: Some("Inline wins.".to_string()),
                instruction_file: Some("should-not-load.md".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            resolve_instruction(&config, None).as_deref(),
            Some("Inline wins.")
        );
    }

    #[test]
    fn test_instruction_file_is_read_relative_to_base_dir() {
        let dir = std::env::temp_dir().join(format!("parley-instr-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("prefix.md"), "\n  Reply as a JSON array.  \n").unwrap();

        let config = ParleyConfig {
            general: GeneralConfig {
                instruction_file: Some("prefix.md".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            resolve_instruction(&config, Some(&dir)).as_deref(),
            Some("Reply as a JSON array.")
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_explicit_config_resolves_instruction_file_beside_it() {
        let dir = std::env::temp_dir().join(format!("parley-explicit-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("custom.toml");
        fs::write(&path, "[general]\ninstruction_file = \"prefix.md\"\n").unwrap();
        fs::write(dir.join("prefix.md"), "Answer in French.\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.base_dir.as_deref(), Some(dir.as_path()));

        let resolved = resolve_with_env(&config, None, no_env);
        assert_eq!(resolved.instruction.as_deref(), Some("Answer in French."));

        let _ = fs::remove_dir_all(&dir);
    }
}
