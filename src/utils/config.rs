use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::Settings;

const ENV_CONFIG_PATH: &str = "JUSTWRITE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/settings.json";

const ENV_PORT: &str = "PORT";
const ENV_AUTH_URL: &str = "SUPABASE_URL";
const ENV_AUTH_ANON_KEY: &str = "SUPABASE_ANON_KEY";
const ENV_API_KEY: &str = "GOOGLE_GEMINI_API_KEY";
const ENV_AI_BASE_URL: &str = "JUSTWRITE_AI_BASE_URL";
const ENV_AI_MODEL: &str = "JUSTWRITE_AI_MODEL";
const ENV_DATABASE: &str = "JUSTWRITE_DATABASE";
const ENV_TIMEZONE: &str = "JUSTWRITE_TIMEZONE";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn config_path() -> PathBuf {
    env_value(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Reads settings from `path`, falling back to defaults when the file does not exist.
pub fn read_settings_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        log::info!("{} not found, using default settings", path.display());
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let settings = serde_json::from_str(&content)
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(settings)
}

pub fn apply_env_overrides(settings: &mut Settings) {
    if let Some(port) = env_value(ENV_PORT) {
        match port.parse() {
            Ok(port) => settings.server.port = port,
            Err(e) => log::warn!("Ignoring invalid {} value {}: {}", ENV_PORT, port, e),
        }
    }
    if let Some(url) = env_value(ENV_AUTH_URL) {
        settings.auth.url = url;
    }
    if let Some(key) = env_value(ENV_AUTH_ANON_KEY) {
        settings.auth.anon_key = key;
    }
    if settings.ai.api_key.trim().is_empty() {
        settings.ai.api_key = env_value(ENV_API_KEY).unwrap_or_default();
    }
    if let Some(base_url) = env_value(ENV_AI_BASE_URL) {
        settings.ai.base_url = base_url;
    }
    if let Some(model) = env_value(ENV_AI_MODEL) {
        settings.ai.model = model;
    }
    if let Some(path) = env_value(ENV_DATABASE) {
        settings.storage.database_path = path;
    }
    if let Some(tz) = env_value(ENV_TIMEZONE) {
        settings.server.timezone = tz;
    }
}

pub fn load_settings() -> Result<Settings> {
    let mut settings = read_settings_file(&config_path())?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}
