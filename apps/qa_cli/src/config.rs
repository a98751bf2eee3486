use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use url::Url;

pub const CONFIG_FILE: &str = "finqa.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn base_url(&self) -> anyhow::Result<Option<String>> {
        match &self.api_base_url {
            Some(raw) => normalize_base_url(raw),
            None => Ok(None),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(CONFIG_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let Ok(file_cfg) = toml::from_str::<toml::Table>(&raw) else {
        return;
    };

    if let Some(v) = file_cfg.get("api_base_url").and_then(|v| v.as_str()) {
        settings.api_base_url = Some(v.to_string());
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(|v| v.as_integer())
    {
        settings.request_timeout_secs = u64::try_from(v).ok();
    }
    if let Some(v) = file_cfg.get("log_filter").and_then(|v| v.as_str()) {
        settings.log_filter = v.to_string();
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("FINQA_API_BASE_URL") {
        settings.api_base_url = Some(v);
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = Some(v);
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }

    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

/// Blank means "not configured". Anything else must be an absolute http(s) URL;
/// trailing slashes are dropped so endpoint paths can be appended directly.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<Option<String>> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid api base url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("api base url '{raw}' must use http or https");
    }

    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
