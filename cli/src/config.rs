use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tastecycle_core::openai::DEFAULT_MODEL;

const CONFIG_FILE: &str = "config.json";

/// Values read from `config.json`; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_anon_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Environment wins over the file.
    fn with_env(mut self, env: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        for (var, slot) in [
            ("SUPABASE_URL", &mut self.supabase_url),
            ("SUPABASE_ANON_KEY", &mut self.supabase_anon_key),
            ("TASTECYCLE_ACCESS_TOKEN", &mut self.access_token),
            ("TASTECYCLE_USER_ID", &mut self.user_id),
            ("OPENAI_API_KEY", &mut self.openai_api_key),
            ("OPENAI_MODEL", &mut self.openai_model),
        ] {
            if let Some(value) = pick(var) {
                *slot = Some(value);
            }
        }
        self
    }
}

/// Connection settings for the PostgREST recipe backend.
#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    /// User JWT; the anon key is sent as bearer when absent.
    pub access_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
}

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub menus_dir: PathBuf,
    pub config_path: PathBuf,
    pub values: FileConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "tastecycle").context("Could not determine home directory")?;
        Self::load_from(proj_dirs.data_dir(), |name| std::env::var(name).ok())
    }

    pub fn load_from(data_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = data_dir.to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let config_path = data_dir.join(CONFIG_FILE);
        let values = FileConfig::read(&config_path)?.with_env(env);

        Ok(Config {
            db_path: data_dir.join("tastecycle.db"),
            menus_dir: data_dir.join("menus"),
            data_dir,
            config_path,
            values,
        })
    }

    pub fn supabase(&self) -> Option<SupabaseSettings> {
        Some(SupabaseSettings {
            url: self.values.supabase_url.clone()?.trim_end_matches('/').to_string(),
            anon_key: self.values.supabase_anon_key.clone()?,
            access_token: self.values.access_token.clone(),
        })
    }

    pub fn openai(&self) -> Option<OpenAiSettings> {
        Some(OpenAiSettings {
            api_key: self.values.openai_api_key.clone()?,
            model: self
                .values
                .openai_model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    pub fn require_user_id(&self) -> Result<&str> {
        self.values.user_id.as_deref().with_context(|| {
            format!(
                "No user id configured. Set TASTECYCLE_USER_ID or add \"user_id\" to {}",
                self.config_path.display()
            )
        })
    }
}

/// Show only the first four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}
