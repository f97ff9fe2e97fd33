//! `[env]` table of `<config dir>/<app>/config.toml`.
//!
//! The config dir is `$XDG_CONFIG_HOME` when set, else the platform default from `dirs`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::LoadError;

fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .ok_or(LoadError::NoConfigDir)?;
    Ok(base.join(app_name).join("config.toml"))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// Missing file or missing `[env]` table yields an empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = config_path(app_name)?;
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content =
        std::fs::read_to_string(&path).map_err(|source| LoadError::Read { path, source })?;
    let file: ConfigFile = toml::from_str(&content)?;
    Ok(file.env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{env_lock, ScopedVar};

    fn write_config(dir: &std::path::Path, app: &str, body: &str) {
        let app_dir = dir.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn reads_env_table() {
        let _g = env_lock();
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "promptsmith",
            "[env]\nOPENAI_MODEL = \"gpt-4o-mini\"\nPROMPTSMITH_TEMPERATURE = \"0.2\"\n",
        );
        let _x = ScopedVar::set("XDG_CONFIG_HOME", dir.path());

        let map = load_env_map("promptsmith").unwrap();
        assert_eq!(map["OPENAI_MODEL"], "gpt-4o-mini");
        assert_eq!(map["PROMPTSMITH_TEMPERATURE"], "0.2");
    }

    #[test]
    fn file_without_env_table_is_empty() {
        let _g = env_lock();
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "promptsmith", "[other]\nx = 1\n");
        let _x = ScopedVar::set("XDG_CONFIG_HOME", dir.path());
        assert!(load_env_map("promptsmith").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_empty() {
        let _g = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let _x = ScopedVar::set("XDG_CONFIG_HOME", dir.path());
        assert!(load_env_map("promptsmith").unwrap().is_empty());
    }

    #[test]
    fn non_string_values_are_rejected() {
        let _g = env_lock();
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "promptsmith", "[env]\nPROMPTSMITH_MAX_TOKENS = 1500\n");
        let _x = ScopedVar::set("XDG_CONFIG_HOME", dir.path());
        assert!(matches!(
            load_env_map("promptsmith"),
            Err(LoadError::XdgParse(_))
        ));
    }
}
