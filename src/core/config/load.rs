//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `SUMMCHAT_*` / `OLLAMA_HOST` env overrides.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

use super::raw::{self, RawApp, RawClient, RawConfig, RawLlm, RawServer};
use super::types::*;

/// Values taken from the environment that win over the file.
///
/// Tests build this directly instead of mutating process env vars.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub work_dir: Option<String>,
    pub log_level: Option<String>,
    pub server_url: Option<String>,
    pub ollama_host: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            work_dir: env::var("SUMMCHAT_WORK_DIR").ok(),
            log_level: env::var("SUMMCHAT_LOG_LEVEL").ok(),
            server_url: env::var("SUMMCHAT_SERVER_URL").ok(),
            ollama_host: env::var("OLLAMA_HOST").ok(),
        }
    }
}

/// Deep-merge two TOML values.
/// Tables are merged recursively — the overlay only needs to specify keys that
/// differ from the base. For every other type (string, integer, array, …)
/// the overlay value replaces the base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// fully merged `toml::Value`. `visited` carries canonicalized paths already
/// seen in this chain so circular references are caught early.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    if let Some(base_str) = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
    {
        let base_path = if Path::new(base_str).is_absolute() {
            PathBuf::from(base_str)
        } else {
            path.parent().unwrap_or(Path::new(".")).join(base_str)
        };
        let base_val = load_raw_merged(&base_path, visited)?;
        Ok(merge_toml(base_val, overlay_val))
    } else {
        Ok(overlay_val)
    }
}

/// Load config from the given path, or `config/default.toml`, then apply env-var overrides.
/// If no path is given and `config/default.toml` does not exist, the built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        builtin(&overrides)
    }
}

/// Built-in configuration, used when no config file is present.
pub fn builtin(overrides: &EnvOverrides) -> Result<Config, AppError> {
    let raw = RawConfig {
        app: RawApp {
            name: raw::default_app_name(),
            work_dir: "~/.summchat".to_string(),
            log_level: raw::default_log_level(),
        },
        server: RawServer::default(),
        client: RawClient::default(),
        llm: RawLlm::default(),
    };
    resolve(raw, overrides)
}

/// Internal loader — accepts an explicit path and the overrides to apply.
/// Follows `[meta] base = "..."` inheritance chains before resolving.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let merged_val = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged_val).map_err(|e: toml::de::Error| {
        AppError::Config(format!("config error in {}: {e}", path.display()))
    })?;

    resolve(parsed, overrides)
}

fn resolve(parsed: RawConfig, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let app = parsed.app;

    let work_dir = expand_home(overrides.work_dir.as_deref().unwrap_or(&app.work_dir));
    let log_level = overrides.log_level.clone().unwrap_or(app.log_level);

    let history_file = {
        let p = expand_home(&parsed.client.history_file);
        if p.is_absolute() { p } else { work_dir.join(p) }
    };

    let server_url = overrides
        .server_url
        .clone()
        .unwrap_or(parsed.client.server_url);

    let ollama_url = overrides
        .ollama_host
        .as_deref()
        .map(normalize_ollama_host)
        .unwrap_or(parsed.llm.ollama.base_url);

    let models: Vec<ModelEntry> = parsed
        .llm
        .models
        .into_iter()
        .map(|m| ModelEntry { key: m.key, name: m.name })
        .collect();

    if models.is_empty() {
        return Err(AppError::Config("[[llm.models]] must list at least one model".into()));
    }

    let mut seen = HashSet::new();
    for m in &models {
        if !seen.insert(m.key.as_str()) {
            return Err(AppError::Config(format!("duplicate model key '{}'", m.key)));
        }
    }

    if !models.iter().any(|m| m.key == parsed.llm.default_model) {
        return Err(AppError::Config(format!(
            "llm.default_model '{}' is not a registered model key",
            parsed.llm.default_model
        )));
    }

    Ok(Config {
        app_name: app.name,
        work_dir,
        log_level,
        server: ServerConfig { bind: parsed.server.bind },
        client: ClientConfig {
            server_url: server_url.trim_end_matches('/').to_string(),
            timeout_seconds: parsed.client.timeout_seconds.max(1),
            history_file,
            default_model: parsed.client.default_model,
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            default_model: parsed.llm.default_model,
            max_new_tokens: parsed.llm.max_new_tokens.max(1),
            ollama: OllamaConfig {
                base_url: ollama_url.trim_end_matches('/').to_string(),
                timeout_seconds: parsed.llm.ollama.timeout_seconds.max(1),
                temperature: parsed.llm.ollama.temperature,
                top_p: parsed.llm.ollama.top_p,
                repeat_penalty: parsed.llm.ollama.repeat_penalty,
                json_mode: parsed.llm.ollama.json_mode,
            },
            models,
        },
    })
}

/// `OLLAMA_HOST` is commonly given as a bare `host:port`.
fn normalize_ollama_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
