use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment variable that replaces `backend.base_url` when set and non-empty.
pub const BACKEND_URL_ENV: &str = "SYMCHECK_BACKEND_URL";

// ── Backend config ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base address of the validation / insight service.  Both `/validate`
    /// and `/chat` are resolved against it.
    pub base_url: String,
    /// Per-request timeout.  `0` disables the timeout.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// User-interface appearance settings exposed in `[ui]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Named colour theme.  Recognised values: `catppuccin-mocha` (default),
    /// `tokyo-night`, `nord`.
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Directory for the rolling log file written while the full-screen
    /// wizard owns the terminal.
    pub log_dir: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: ".symcheck/logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub ui: UiConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides through `lookup` so callers (and tests)
    /// control where values come from.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                self.backend.base_url = url.to_string();
            }
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `/validate` and `/chat` URLs derived from `backend.base_url`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(cfg.backend.timeout_secs, 30);
        assert_eq!(cfg.ui.theme, "catppuccin-mocha");
        assert_eq!(cfg.telemetry.log_level, "info");
        assert_eq!(cfg.telemetry.log_dir, ".symcheck/logs");
    }

    // ── load_from ──────────────────────────────────────────────────────────

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(cfg.ui.theme, "catppuccin-mocha");
        assert_eq!(cfg.backend.timeout_secs, 30);
    }

    #[test]
    fn load_from_valid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.toml");
        fs::write(
            &path,
            r#"
[backend]
timeout_secs = 5

[ui]
theme = "nord"

[telemetry]
log_level = "debug"
log_dir = "/tmp/symcheck-logs"
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.backend.timeout_secs, 5);
        assert_eq!(cfg.ui.theme, "nord");
        assert_eq!(cfg.telemetry.log_level, "debug");
        assert_eq!(cfg.telemetry.log_dir, "/tmp/symcheck-logs");
    }

    #[test]
    fn load_from_partial_toml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(
            &path,
            r#"
[ui]
theme = "tokyo-night"
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.ui.theme, "tokyo-night");
        assert_eq!(cfg.backend.timeout_secs, 30);
        assert_eq!(cfg.telemetry.log_level, "info");
    }

    #[test]
    fn load_from_invalid_toml_returns_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    // ── save_to + roundtrip ────────────────────────────────────────────────

    #[test]
    fn save_and_reload_keeps_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub/config.toml");

        let mut cfg = AppConfig::default();
        cfg.backend.timeout_secs = 12;
        cfg.ui.theme = "nord".to_string();
        cfg.telemetry.log_level = "trace".to_string();

        cfg.save_to(&path).unwrap();
        assert!(path.exists());

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.backend.timeout_secs, 12);
        assert_eq!(loaded.ui.theme, "nord");
        assert_eq!(loaded.telemetry.log_level, "trace");
    }

    #[test]
    fn render_contains_sections() {
        let rendered = AppConfig::default().render().unwrap();
        assert!(rendered.contains("[backend]"));
        assert!(rendered.contains("[ui]"));
        assert!(rendered.contains("[telemetry]"));
    }

    // ── Env overrides ──────────────────────────────────────────────────────

    #[test]
    fn env_backend_url_overrides_file() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(|key| {
            (key == BACKEND_URL_ENV).then(|| "http://10.0.0.2:9000".to_string())
        });
        assert_eq!(cfg.backend.base_url, "http://10.0.0.2:9000");
    }

    #[test]
    fn blank_env_backend_url_is_ignored() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(|_| Some("   ".to_string()));
        assert_eq!(cfg.backend.base_url, "http://127.0.0.1:8000");
    }

    // ── endpoint ───────────────────────────────────────────────────────────

    #[test]
    fn endpoint_joins_without_double_slash() {
        let mut cfg = AppConfig::default();
        cfg.backend.base_url = "http://localhost:8000/".to_string();
        assert_eq!(cfg.endpoint("/validate"), "http://localhost:8000/validate");
        assert_eq!(cfg.endpoint("chat"), "http://localhost:8000/chat");
    }
}
