use anyhow::Result;
use serde::Serialize;

use crate::config::{Config, mask_secret};

#[derive(Serialize)]
struct ConfigView {
    data_dir: String,
    db_path: String,
    menus_dir: String,
    config_file: String,
    config_file_exists: bool,
    user_id: Option<String>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    access_token: Option<String>,
    openai_api_key: Option<String>,
    openai_model: String,
}

impl ConfigView {
    fn new(config: &Config) -> Self {
        let values = &config.values;
        let masked = |v: &Option<String>| v.as_deref().map(mask_secret);
        Self {
            data_dir: config.data_dir.display().to_string(),
            db_path: config.db_path.display().to_string(),
            menus_dir: config.menus_dir.display().to_string(),
            config_file: config.config_path.display().to_string(),
            config_file_exists: config.config_path.exists(),
            user_id: values.user_id.clone(),
            supabase_url: values.supabase_url.clone(),
            supabase_anon_key: masked(&values.supabase_anon_key),
            access_token: masked(&values.access_token),
            openai_api_key: masked(&values.openai_api_key),
            openai_model: config
                .openai()
                .map_or_else(|| tastecycle_core::openai::DEFAULT_MODEL.to_string(), |o| o.model),
        }
    }
}

pub(crate) fn cmd_config(config: &Config, json: bool) -> Result<()> {
    let view = ConfigView::new(config);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let unset = "(not set)";
    println!("Data directory:  {}", view.data_dir);
    println!("Database:        {}", view.db_path);
    println!("Menus:           {}", view.menus_dir);
    let exists = if view.config_file_exists { "" } else { " (missing)" };
    println!("Config file:     {}{exists}\n", view.config_file);
    println!("User ID:         {}", view.user_id.as_deref().unwrap_or(unset));
    println!("Supabase URL:    {}", view.supabase_url.as_deref().unwrap_or(unset));
    println!("Supabase key:    {}", view.supabase_anon_key.as_deref().unwrap_or(unset));
    println!("Access token:    {}", view.access_token.as_deref().unwrap_or(unset));
    println!("OpenAI key:      {}", view.openai_api_key.as_deref().unwrap_or(unset));
    println!("OpenAI model:    {}", view.openai_model);
    Ok(())
}
