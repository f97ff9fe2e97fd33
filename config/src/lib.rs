//! Configuration for promptsmith.
//!
//! [`load_and_apply`] fills the process environment from a project `.env` and the `[env]`
//! table of `$XDG_CONFIG_HOME/<app>/config.toml`, never overriding variables that are
//! already set (priority: **existing env > .env > XDG**). [`Settings::from_env`] then reads
//! the typed settings. With feature `tracing-init`, [`logging::init`] installs the
//! subscriber used by the binaries.

mod dotenv;
#[cfg(feature = "tracing-init")]
pub mod logging;
mod settings;
mod xdg_toml;

pub use settings::{Settings, SettingsError};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no config directory for this platform")]
    NoConfigDir,
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
}

/// Loads `.env` and XDG config and sets the variables that are not already set.
///
/// * `app_name`: XDG subdirectory, e.g. `"promptsmith"` for `~/.config/promptsmith/config.toml`.
/// * `override_dir`: directory holding `.env`; defaults to the current directory.
///
/// Returns the keys that were applied.
pub fn load_and_apply(
    app_name: &str,
    override_dir: Option<&Path>,
) -> Result<Vec<String>, LoadError> {
    let xdg = xdg_toml::load_env_map(app_name)?;
    let dotenv = dotenv::load_env_map(override_dir)?;

    let keys: BTreeSet<&String> = xdg.keys().chain(dotenv.keys()).collect();
    let mut applied = Vec::new();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(value) = dotenv.get(key).or_else(|| xdg.get(key)) {
            std::env::set_var(key, value);
            applied.push(key.clone());
        }
    }
    Ok(applied)
}

/// Serializes tests that mutate process-wide variables such as `XDG_CONFIG_HOME`.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
pub(crate) struct ScopedVar {
    key: &'static str,
    prev: Option<std::ffi::OsString>,
}

#[cfg(test)]
impl ScopedVar {
    pub(crate) fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    pub(crate) fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

#[cfg(test)]
impl Drop for ScopedVar {
    fn drop(&mut self) {
        match self.prev.take() {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}
