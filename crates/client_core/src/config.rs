use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewaySettings {
    pub gateway_url: String,
    pub api_key: String,
    pub records_path: String,
    pub filters_path: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:8000".into(),
            api_key: String::new(),
            records_path: "/resource/ecd49b12-3084-4521-8f7e-ca8bf72069ba".into(),
            filters_path: "/metadata/filters".into(),
            request_timeout_secs: None,
        }
    }
}

impl GatewaySettings {
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(self.gateway_url.trim())
            .with_context(|| format!("invalid gateway url '{}'", self.gateway_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("gateway url must start with http:// or https://");
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Defaults, then `dashboard.toml` in the working directory, then environment.
pub fn load_settings() -> GatewaySettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> GatewaySettings {
    let mut settings = GatewaySettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file_overrides(&mut settings, &raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!("ignoring unreadable settings file '{}': {err}", path.display());
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file_overrides(settings: &mut GatewaySettings, raw: &str) {
    let table = match raw.parse::<toml::Table>() {
        Ok(table) => table,
        Err(err) => {
            tracing::warn!("ignoring malformed settings file: {err}");
            return;
        }
    };

    if let Some(v) = table.get("gateway_url").and_then(toml::Value::as_str) {
        settings.gateway_url = v.to_string();
    }
    if let Some(v) = table.get("api_key").and_then(toml::Value::as_str) {
        settings.api_key = v.to_string();
    }
    if let Some(v) = table.get("records_path").and_then(toml::Value::as_str) {
        settings.records_path = v.to_string();
    }
    if let Some(v) = table.get("filters_path").and_then(toml::Value::as_str) {
        settings.filters_path = v.to_string();
    }
    if let Some(v) = table
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
    {
        if let Ok(parsed) = u64::try_from(v) {
            settings.request_timeout_secs = Some(parsed);
        }
    }
}

fn apply_env_overrides(settings: &mut GatewaySettings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("DASHBOARD_GATEWAY_URL") {
        settings.gateway_url = v;
    }
    if let Some(v) = env("APP__GATEWAY_URL") {
        settings.gateway_url = v;
    }

    if let Some(v) = env("DASHBOARD_API_KEY") {
        settings.api_key = v;
    }
    if let Some(v) = env("APP__API_KEY") {
        settings.api_key = v;
    }

    if let Some(v) = env("APP__RECORDS_PATH") {
        settings.records_path = v;
    }
    if let Some(v) = env("APP__FILTERS_PATH") {
        settings.filters_path = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }
}
