// Configuration module: server address, credentials and bulk-refresh
// pacing, read once at startup and never mutated afterwards.
//
// Priority (highest to lowest): environment variables, config.toml in the
// platform config directory, built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "kodictl";
const CONFIG_FILENAME: &str = "config.toml";

/// Top-level settings, mirroring the layout of config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub refresh: RefreshSettings,
}

/// Where the Kodi JSON-RPC endpoint lives and how to authenticate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            username: None,
            password: None,
        }
    }
}

impl ServerSettings {
    /// Full URL of the JSON-RPC endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/jsonrpc", self.host, self.port)
    }

    /// Basic-auth credentials, if a username is configured. Kodi installs
    /// without auth exist; the client only sends the header when asked to.
    pub fn credentials(&self) -> Option<(String, String)> {
        self.username
            .as_ref()
            .map(|user| (user.clone(), self.password.clone().unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Pause between consecutive refresh calls during a bulk pass, in
    /// milliseconds. Exists to avoid hammering the server, not for
    /// correctness.
    pub delay_ms: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self { delay_ms: 250 }
    }
}

impl RefreshSettings {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Settings {
    /// Load settings from config.toml (if present) with environment
    /// overrides on top.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut settings = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?
        } else {
            tracing::debug!("no config file at {}, using defaults", path.display());
            Self::default()
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Path to config.toml: `KODICTL_CONFIG` if set, otherwise the
    /// platform config directory.
    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("KODICTL_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(CONFIG_FILENAME)
    }

    /// Apply environment overrides through a lookup closure, so tests can
    /// exercise the priority rules without touching the process environment.
    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(host) = get("KODI_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("KODI_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(user) = get("KODI_USERNAME") {
            self.server.username = Some(user);
        }
        if let Some(pass) = get("KODI_PASSWORD") {
            self.server.password = Some(pass);
        }
        if let Some(delay) = get("KODI_REFRESH_DELAY_MS").and_then(|d| d.parse().ok()) {
            self.refresh.delay_ms = delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8080);
        assert!(settings.server.credentials().is_none());
        assert_eq!(settings.refresh.delay_ms, 250);
    }

    #[test]
    fn endpoint_format() {
        let server = ServerSettings {
            host: "192.168.1.50".into(),
            port: 8080,
            username: None,
            password: None,
        };
        assert_eq!(server.endpoint(), "http://192.168.1.50:8080/jsonrpc");
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[server]
host = "htpc.local"
port = 9090
username = "kodi"
password = "secret"

[refresh]
delay_ms = 100
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.server.host, "htpc.local");
        assert_eq!(settings.server.port, 9090);
        assert_eq!(
            settings.server.credentials(),
            Some(("kodi".to_string(), "secret".to_string()))
        );
        assert_eq!(settings.refresh.delay_ms, 100);
    }

    #[test]
    fn parse_partial_config() {
        // Only specify what you need, the rest falls back to defaults.
        let toml_str = r#"
[server]
host = "10.0.0.7"
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.server.host, "10.0.0.7");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.refresh.delay_ms, 250);
    }

    #[test]
    fn username_without_password_gets_empty_password() {
        let server = ServerSettings {
            username: Some("kodi".into()),
            ..ServerSettings::default()
        };
        assert_eq!(
            server.credentials(),
            Some(("kodi".to_string(), String::new()))
        );
    }

    #[test]
    fn env_overrides_beat_file_values() {
        let mut settings: Settings = toml::from_str(
            r#"
[server]
host = "from-file"
port = 1234
"#,
        )
        .unwrap();
        settings.apply_overrides(|key| match key {
            "KODI_HOST" => Some("from-env".to_string()),
            "KODI_REFRESH_DELAY_MS" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(settings.server.host, "from-env");
        assert_eq!(settings.server.port, 1234);
        assert_eq!(settings.refresh.delay_ms, 0);
    }

    #[test]
    fn unparseable_env_port_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            "KODI_PORT" => Some("not-a-port".to_string()),
            _ => None,
        });
        assert_eq!(settings.server.port, 8080);
    }
}
