use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpandocError};

/// Tag promotion policy shared by every conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConverterConfig {
    pub all_tags_as_fields: bool,
    pub tag_keys_as_fields: Vec<String>,
    pub tag_dot_replacement: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            all_tags_as_fields: false,
            tag_keys_as_fields: Vec::new(),
            tag_dot_replacement: "@".to_string(),
        }
    }
}

impl ConverterConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(file_overrides) = load_file_overrides(config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    all_tags_as_fields: Option<bool>,
    tag_keys_as_fields: Option<Vec<String>>,
    tag_dot_replacement: Option<String>,
    tag_keys_file: Option<PathBuf>,
}

pub fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("SPANDOC_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("spandoc/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| SpandocError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| SpandocError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    let all_tags_as_fields = match env::var("SPANDOC_TAGS_AS_FIELDS_ALL") {
        Ok(v) => Some(parse_bool(&v).ok_or_else(|| {
            SpandocError::Config(format!(
                "bad SPANDOC_TAGS_AS_FIELDS_ALL in environment (value={v})"
            ))
        })?),
        Err(_) => None,
    };

    Ok(ConfigOverrides {
        all_tags_as_fields,
        tag_keys_as_fields: env::var("SPANDOC_TAGS_AS_FIELDS_KEYS")
            .ok()
            .map(|v| parse_key_list(&v)),
        tag_dot_replacement: env::var("SPANDOC_TAGS_AS_FIELDS_DOT_REPLACEMENT").ok(),
        tag_keys_file: env::var("SPANDOC_TAGS_AS_FIELDS_KEYS_FILE")
            .ok()
            .map(PathBuf::from),
    })
}

fn apply_overrides(
    cfg: &mut ConverterConfig,
    overrides: ConfigOverrides,
    source: &str,
) -> Result<()> {
    if let Some(v) = overrides.all_tags_as_fields {
        cfg.all_tags_as_fields = v;
    }
    if let Some(v) = overrides.tag_keys_as_fields {
        cfg.tag_keys_as_fields = v;
    }
    if let Some(v) = overrides.tag_dot_replacement {
        cfg.tag_dot_replacement = v;
    }
    if let Some(path) = overrides.tag_keys_file {
        let raw = fs::read_to_string(&path).map_err(|e| {
            SpandocError::Config(format!(
                "bad tag_keys_file in {source}: {e} (value={})",
                path.display()
            ))
        })?;
        cfg.tag_keys_as_fields.extend(parse_keys_file(&raw));
    }
    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_keys_file(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
