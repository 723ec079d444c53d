//! Weekly menu documents on local storage, one JSON file per ISO week.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::models::WeeklyMenu;

/// Whole-document store for weekly menus, keyed by week.
pub trait MenuStore: Send + Sync {
    fn load(&self, week: &str) -> Result<Option<WeeklyMenu>>;
    /// Overwrites any existing document for `menu.week`.
    fn save(&self, menu: &WeeklyMenu) -> Result<()>;
}

/// `<dir>/<week>.json`, pretty-printed.
pub struct FileMenuStore {
    dir: PathBuf,
}

impl FileMenuStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, week: &str) -> PathBuf {
        self.dir.join(format!("{week}.json"))
    }
}

impl MenuStore for FileMenuStore {
    fn load(&self, week: &str) -> Result<Option<WeeklyMenu>> {
        let path = self.path_for(week);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read menu file: {}", path.display()))?;
        let menu = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse menu file: {}", path.display()))?;
        Ok(Some(menu))
    }

    fn save(&self, menu: &WeeklyMenu) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create menu directory: {}", self.dir.display())
        })?;
        let path = self.path_for(&menu.week);
        let json = serde_json::to_string_pretty(menu)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write menu file: {}", path.display()))?;
        Ok(())
    }
}
