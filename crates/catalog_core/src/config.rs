use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base url of the catalog API; `None` keeps the store local.
    pub api_base_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file if present, then environment variables.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    match read_file_settings(path) {
        Ok(Some(file_cfg)) => {
            if let Some(v) = file_cfg.api_url {
                settings.api_base_url = Some(v);
            }
            if let Some(v) = file_cfg.request_timeout_secs {
                settings.request_timeout_secs = v;
            }
        }
        Ok(None) => {}
        Err(err) => warn!(path = %path.display(), "ignoring settings file: {err:#}"),
    }

    if let Some(v) = env("CATALOG_API_URL") {
        settings.api_base_url = Some(v);
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_base_url = Some(v);
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings.api_base_url = settings
        .api_base_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());

    settings
}

fn read_file_settings(path: &Path) -> anyhow::Result<Option<FileSettings>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let parsed = toml::from_str::<FileSettings>(&raw)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("catalog_core_{tag}_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn missing_file_and_env_keep_defaults() {
        let settings = load_settings_from(Path::new("/nonexistent/catalog.toml"), |_| None);
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn env_overrides_file() {
        let dir = temp_dir("env_overrides");
        let path = dir.join("catalog.toml");
        fs::write(
            &path,
            "api_url = \"http://file:3000\"\nrequest_timeout_secs = 3\n",
        )
        .expect("write");

        let vars = HashMap::from([("APP__API_URL", "http://env:4000".to_string())]);
        let settings = load_settings_from(&path, |key| vars.get(key).cloned());

        assert_eq!(settings.api_base_url.as_deref(), Some("http://env:4000"));
        assert_eq!(settings.request_timeout_secs, 3);

        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn blank_url_means_local_mode() {
        let vars = HashMap::from([("CATALOG_API_URL", "   ".to_string())]);
        let settings =
            load_settings_from(Path::new("/nonexistent/catalog.toml"), |key| {
                vars.get(key).cloned()
            });
        assert!(settings.api_base_url.is_none());
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = temp_dir("malformed");
        let path = dir.join("catalog.toml");
        fs::write(&path, "api_url = [").expect("write");

        let settings = load_settings_from(&path, |_| None);
        assert_eq!(settings, ClientSettings::default());

        fs::remove_dir_all(dir).expect("cleanup");
    }
}
