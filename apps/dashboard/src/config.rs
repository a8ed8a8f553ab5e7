use std::{fs, path::Path, path::PathBuf};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub token_path: PathBuf,
    pub page_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        let token_path = dirs::data_local_dir()
            .map(|base| base.join("totem-dashboard").join("token"))
            .unwrap_or_else(|| PathBuf::from(".dashboard_token"));
        Self {
            api_base_url: "http://localhost:8080".into(),
            token_path,
            page_size: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    token_path: Option<PathBuf>,
    page_size: Option<u32>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// File values override defaults, environment values override the file.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_base_url {
                    settings.api_base_url = v;
                }
                if let Some(v) = file_cfg.token_path {
                    settings.token_path = v;
                }
                if let Some(v) = file_cfg.page_size {
                    settings.page_size = v;
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring malformed settings file"),
        }
    }

    if let Some(v) = env("DASHBOARD_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("DASHBOARD_TOKEN_PATH") {
        settings.token_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__TOKEN_PATH") {
        settings.token_path = PathBuf::from(v);
    }

    if let Some(v) = env("APP__PAGE_SIZE") {
        match v.parse::<u32>() {
            Ok(parsed) if parsed > 0 => settings.page_size = parsed,
            _ => warn!(value = %v, "APP__PAGE_SIZE is not a positive integer"),
        }
    }

    settings
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_settings_from(&dir.path().join("absent.toml"), env_of(&[]));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn file_then_env_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(
            &path,
            "api_base_url = \"https://api.totem.example\"\npage_size = 25\ntoken_path = \"/tmp/tok\"\n",
        )
        .expect("write settings");

        let settings = load_settings_from(&path, env_of(&[]));
        assert_eq!(settings.api_base_url, "https://api.totem.example");
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.token_path, PathBuf::from("/tmp/tok"));

        let settings = load_settings_from(
            &path,
            env_of(&[
                ("DASHBOARD_API_BASE_URL", "http://one"),
                ("APP__API_BASE_URL", "http://two"),
                ("APP__PAGE_SIZE", "zero"),
            ]),
        );
        assert_eq!(settings.api_base_url, "http://two");
        assert_eq!(settings.page_size, 25);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "page_size = \"lots\"").expect("write settings");
        assert_eq!(load_settings_from(&path, env_of(&[])), Settings::default());
    }
}
