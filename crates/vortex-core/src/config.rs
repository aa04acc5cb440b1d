use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::VortexError;
use crate::source::DEFAULT_SOURCE_URL;

/// Environment variable overriding the configured source URL.
pub const SOURCE_URL_ENV: &str = "VORTEX_SOURCE_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory exports are written to; the working directory when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub source_url: String,
    pub export_dir: PathBuf,
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    load_toml(&project_root.join(".vortex/config.toml"))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_toml(&config_dir.join("vortex/config.toml"))
}

/// Merge project config, user config and environment.
///
/// Source URL precedence: `cli_url` > `VORTEX_SOURCE_URL` > project config >
/// built-in dataset URL.
pub fn resolve_config(project_root: &Path, cli_url: Option<&str>) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_url = env::var(SOURCE_URL_ENV).ok();
    let source_url = resolve_source_url(cli_url, env_url.as_deref(), &project);
    let export_dir = match &project.export.dir {
        Some(dir) if dir.is_relative() => project_root.join(dir),
        Some(dir) => dir.clone(),
        None => project_root.to_path_buf(),
    };

    Ok(EffectiveConfig {
        project,
        user,
        source_url,
        export_dir,
    })
}

fn resolve_source_url(cli_url: Option<&str>, env_url: Option<&str>, project: &ProjectConfig) -> String {
    [cli_url, env_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map_or_else(|| project.source.url.clone(), str::to_string)
}

fn load_toml<T: Default + serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<T>(&content).map_err(|err| {
        VortexError::ConfigParse {
            path: path.to_path_buf(),
            reason: err.message().to_string(),
        }
        .into()
    })
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}
