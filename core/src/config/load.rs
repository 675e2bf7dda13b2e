use std::path::{Path, PathBuf};

use super::types::{AppConfig, BackendConfig};

/// Get the default taskweave data directory: ~/.taskweave
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".taskweave"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.taskweave/config.toml
    let user_config = get_data_dir()?.join("config.toml");

    // Priority 2: ./config.toml
    let local_config = Path::new("config.toml");

    let mut cfg = if user_config.exists() {
        parse_file(&user_config)?
    } else if local_config.exists() {
        parse_file(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load an explicit config file. Environment overrides still apply.
pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let mut cfg = parse_file(path)?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn parse_file(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))
}

pub fn apply_env_overrides(cfg: &mut AppConfig) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

fn apply_overrides(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = lookup("TASKWEAVE_MODEL") {
        cfg.agent.model = Some(v);
    }

    if let Some(v) = lookup("TASKWEAVE_BACKEND_URL") {
        match &mut cfg.backend {
            BackendConfig::OpenAi(http) | BackendConfig::Anthropic(http) => http.base_url = v,
            BackendConfig::Scripted(_) => {
                tracing::warn!("TASKWEAVE_BACKEND_URL ignored for the scripted backend");
            }
        }
    }

    if let Some(v) = lookup("TASKWEAVE_MAX_RETRIES") {
        match v.trim().parse::<u32>() {
            Ok(n) if n > 0 => cfg.executor.max_retries = n,
            _ => tracing::warn!(value = %v, "ignoring invalid TASKWEAVE_MAX_RETRIES"),
        }
    }
}
