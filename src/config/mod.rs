pub mod init;
mod schema;

pub use init::run_init_wizard;
pub use schema::{Config, DEFAULT_FLASH_DURATION};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/recitation-tracker/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("recitation-tracker")
}

/// Get the default config file path (~/.config/recitation-tracker/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///
/// A missing file yields the default configuration, so a first run needs no
/// setup.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

/// Validate configuration values at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref duration) = config.flash_duration {
        if let Err(e) = humantime::parse_duration(duration) {
            errors.push(format!("flash_duration: invalid '{}' - {}", duration, e));
        }
    }

    if let Some(ref path) = config.data_path {
        if path.trim().is_empty() {
            errors.push("data_path: must not be empty".to_string());
        }
    }

    if let Some(ref dir) = config.report_dir {
        if dir.trim().is_empty() {
            errors.push("report_dir: must not be empty".to_string());
        }
    }

    for (name, email) in &config.parent_emails {
        if !looks_like_email(email) {
            errors.push(format!("parent_emails.{}: invalid address '{}'", name, email));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub(crate) fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}
