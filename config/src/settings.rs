//! Typed settings read from the environment (after [`crate::load_and_apply`]).

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("{key}: invalid value {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings of the assistant.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// `OPENAI_API_KEY`; the client falls back to its own env lookup when unset.
    pub openai_api_key: Option<String>,
    /// `OPENAI_BASE_URL`, for OpenAI-compatible servers.
    pub openai_base_url: Option<String>,
    /// `OPENAI_MODEL`.
    pub model: String,
    /// `PROMPTSMITH_TEMPERATURE`.
    pub temperature: f32,
    /// `PROMPTSMITH_MAX_TOKENS`.
    pub max_tokens: u32,
    /// `PROMPTS_DIR`: directory of YAML template overrides.
    pub prompts_dir: Option<PathBuf>,
    /// `PROMPTSMITH_SESSION_DB`: SQLite file for sessions; in-memory when unset.
    pub session_db: Option<PathBuf>,
    /// `PROMPTSMITH_IMPROVEMENT_FILTER`, parsed by the library.
    pub improvement_filter: Option<String>,
    /// `LOG_FILE`.
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            prompts_dir: None,
            session_db: None,
            improvement_filter: None,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let temperature = match get("PROMPTSMITH_TEMPERATURE") {
            Some(v) => parse_temperature(&v)?,
            None => defaults.temperature,
        };
        let max_tokens = match get("PROMPTSMITH_MAX_TOKENS") {
            Some(v) => parse_max_tokens(&v)?,
            None => defaults.max_tokens,
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            temperature,
            max_tokens,
            prompts_dir: get("PROMPTS_DIR").map(PathBuf::from),
            session_db: get("PROMPTSMITH_SESSION_DB").map(PathBuf::from),
            improvement_filter: get("PROMPTSMITH_IMPROVEMENT_FILTER"),
            log_file: get("LOG_FILE").map(PathBuf::from),
        })
    }
}

fn parse_temperature(value: &str) -> Result<f32, SettingsError> {
    let invalid = |reason: &str| SettingsError::Invalid {
        key: "PROMPTSMITH_TEMPERATURE",
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let t: f32 = value.parse().map_err(|_| invalid("not a number"))?;
    if !(0.0..=2.0).contains(&t) {
        return Err(invalid("expected 0.0..=2.0"));
    }
    Ok(t)
}

fn parse_max_tokens(value: &str) -> Result<u32, SettingsError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(SettingsError::Invalid {
            key: "PROMPTSMITH_MAX_TOKENS",
            value: value.to_string(),
            reason: "expected a positive integer".to_string(),
        }),
    }
}
