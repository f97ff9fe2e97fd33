//! Load prompt templates from a directory of YAML files and apply env overrides.
//!
//! **Canonical source**: default template text lives in `promptsmith/prompts/templates.yaml`,
//! embedded at compile time. Each `*.yaml` / `*.yml` file of the prompts directory is a flat
//! `name: text` map overlaid on the defaults (files in name order), and
//! `PROMPTSMITH_TEMPLATE_<NAME>` env vars override single templates last.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::PromptTemplates;

/// Embedded default templates.
const EMBED_TEMPLATES: &str = include_str!("../../prompts/templates.yaml");

/// Default directory name when `PROMPTS_DIR` is not set.
const DEFAULT_PROMPTS_DIR: &str = "prompts";

/// Env prefix for single-template overrides, e.g. `PROMPTSMITH_TEMPLATE_DRAFT_SYSTEM`.
const ENV_OVERRIDE_PREFIX: &str = "PROMPTSMITH_TEMPLATE_";

/// Error when loading templates from a directory (missing dir, unreadable file, invalid YAML).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("prompts directory not found or not readable: {0}")]
    DirNotFound(String),
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
}

/// `dir` if `Some`, else `PROMPTS_DIR` env, else `./prompts`.
fn prompts_dir(dir: Option<&Path>) -> PathBuf {
    dir.map(Path::to_path_buf).unwrap_or_else(|| {
        std::env::var("PROMPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROMPTS_DIR))
    })
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// YAML files directly under `dir`, sorted by file name.
fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries =
        std::fs::read_dir(dir).map_err(|_| LoadError::DirNotFound(dir.display().to_string()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::ReadFile {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if path.is_file() && is_yaml(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn parse_templates(content: &str, path: &str) -> Result<PromptTemplates, LoadError> {
    // An empty file parses as null; treat it as "no overrides".
    let map: Option<BTreeMap<String, String>> =
        serde_yaml::from_str(content).map_err(|e| LoadError::ParseYaml {
            path: path.to_string(),
            message: e.to_string(),
        })?;
    Ok(PromptTemplates::from_map(map.unwrap_or_default()))
}

fn read_templates_file(path: &Path) -> Result<PromptTemplates, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::ReadFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_templates(&content, &path.display().to_string())
}

/// Applies `PROMPTSMITH_TEMPLATE_<NAME>` overrides; `<NAME>` is the template name uppercased.
fn apply_env(mut templates: PromptTemplates) -> PromptTemplates {
    for (key, value) in std::env::vars() {
        if let Some(name) = key.strip_prefix(ENV_OVERRIDE_PREFIX) {
            if !name.is_empty() {
                debug!(template = %name.to_lowercase(), "template overridden from env");
                templates.insert(name.to_lowercase(), value);
            }
        }
    }
    templates
}

/// Loads templates: embedded defaults, overlaid with every YAML file in the prompts directory,
/// then env overrides.
///
/// If `dir` is `None`, uses `PROMPTS_DIR` env or `./prompts`. Fails when the directory is
/// missing or a file in it cannot be read or parsed.
pub fn load(dir: Option<&Path>) -> Result<PromptTemplates, LoadError> {
    let base = prompts_dir(dir);
    if !base.is_dir() {
        return Err(LoadError::DirNotFound(base.display().to_string()));
    }
    let mut templates = embedded();
    for file in yaml_files(&base)? {
        debug!(path = %file.display(), "loading prompt templates");
        templates.merge(read_templates_file(&file)?);
    }
    Ok(apply_env(templates))
}

fn embedded() -> PromptTemplates {
    parse_templates(EMBED_TEMPLATES, "embedded templates.yaml").unwrap_or_default()
}

/// Default templates from the embedded YAML, with env overrides applied.
pub fn default_from_embedded() -> PromptTemplates {
    apply_env(embedded())
}

/// Loads from `dir` when it exists and is valid; otherwise the embedded defaults.
pub fn load_or_default(dir: Option<&Path>) -> PromptTemplates {
    match load(dir) {
        Ok(t) => t,
        Err(e) => {
            debug!(error = %e, "using embedded prompt templates");
            default_from_embedded()
        }
    }
}
