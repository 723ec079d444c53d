//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::ai::ReplacementPrompt;
use crate::models::{NewRecipe, Recipe, RecipePatch, WeeklyMenu};
use crate::service::{MenuAssistant, RecipeBackend};
use crate::store::MenuStore;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

/// `n` recipes `r0..` owned by `u1`, created one minute apart.
pub fn sample_recipes(n: usize) -> Vec<Recipe> {
    (0..n)
        .map(|i| Recipe {
            id: format!("r{i}"),
            user_id: "u1".to_string(),
            title: format!("Recipe {i}"),
            ingredients: vec![format!("ingredient {i}")],
            instructions: vec!["Cook".to_string()],
            servings: Some(4),
            created_at: base_time() + Duration::minutes(i64::try_from(i).unwrap()),
            updated_at: None,
        })
        .collect()
}

#[derive(Default)]
struct BackendState {
    recipes: Vec<Recipe>,
    cursor: i64,
    cursor_writes: Vec<i64>,
    fail_range_reads: bool,
    missing_profile: bool,
    inserted: usize,
}

/// Recipe backend over a shared vector. Clones share state, so a test can
/// keep a handle after boxing one into the service.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().recipes = recipes;
        backend
    }

    pub fn set_cursor(&self, cursor: i64) {
        self.state.lock().unwrap().cursor = cursor;
    }

    pub fn cursor(&self) -> i64 {
        self.state.lock().unwrap().cursor
    }

    pub fn cursor_writes(&self) -> Vec<i64> {
        self.state.lock().unwrap().cursor_writes.clone()
    }

    pub fn fail_range_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_range_reads = fail;
    }

    /// Cursor reads and writes fail as if the user had no profile row.
    pub fn remove_profile(&self) {
        self.state.lock().unwrap().missing_profile = true;
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.state.lock().unwrap().recipes.clone()
    }

    fn ordered(state: &BackendState, user_id: &str) -> Vec<Recipe> {
        let mut owned: Vec<Recipe> = state
            .recipes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        owned
    }
}

impl RecipeBackend for FakeBackend {
    fn count_recipes(&self, user_id: &str) -> Result<usize> {
        let state = self.state.lock().unwrap();
        Ok(state.recipes.iter().filter(|r| r.user_id == user_id).count())
    }

    fn fetch_recipe_range(
        &self,
        user_id: &str,
        start: usize,
        end_inclusive: usize,
    ) -> Result<Vec<Recipe>> {
        let state = self.state.lock().unwrap();
        if state.fail_range_reads {
            bail!("range read failed");
        }
        Ok(Self::ordered(&state, user_id)
            .into_iter()
            .skip(start)
            .take(end_inclusive + 1 - start)
            .collect())
    }

    fn menu_cursor(&self, user_id: &str) -> Result<i64> {
        let state = self.state.lock().unwrap();
        if state.missing_profile {
            bail!("no profile row for user {user_id}");
        }
        Ok(state.cursor)
    }

    fn set_menu_cursor(&self, user_id: &str, index: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.missing_profile {
            bail!("no profile row for user {user_id}");
        }
        state.cursor = index;
        state.cursor_writes.push(index);
        Ok(())
    }

    fn insert_recipe(&self, user_id: &str, recipe: &NewRecipe) -> Result<Recipe> {
        let mut state = self.state.lock().unwrap();
        state.inserted += 1;
        let created = Recipe {
            id: format!("new-{}", state.inserted),
            user_id: user_id.to_string(),
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            servings: recipe.servings,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.recipes.push(created.clone());
        Ok(created)
    }

    fn list_recipes(&self, user_id: &str, search: Option<&str>) -> Result<Vec<Recipe>> {
        let state = self.state.lock().unwrap();
        let needle = search.map(str::to_lowercase);
        let mut found: Vec<Recipe> = Self::ordered(&state, user_id)
            .into_iter()
            .filter(|r| {
                needle
                    .as_deref()
                    .is_none_or(|n| r.title.to_lowercase().contains(n))
            })
            .collect();
        found.reverse();
        Ok(found)
    }

    fn get_recipe(&self, id: &str) -> Result<Option<Recipe>> {
        let state = self.state.lock().unwrap();
        Ok(state.recipes.iter().find(|r| r.id == id).cloned())
    }

    fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<Option<Recipe>> {
        let mut state = self.state.lock().unwrap();
        let Some(recipe) = state.recipes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            recipe.title.clone_from(title);
        }
        if let Some(ingredients) = &patch.ingredients {
            recipe.ingredients.clone_from(ingredients);
        }
        if let Some(instructions) = &patch.instructions {
            recipe.instructions.clone_from(instructions);
        }
        if patch.servings.is_some() {
            recipe.servings = patch.servings;
        }
        recipe.updated_at = Some(Utc::now());
        Ok(Some(recipe.clone()))
    }

    fn delete_recipe(&self, id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.recipes.len();
        state.recipes.retain(|r| r.id != id);
        Ok(state.recipes.len() < before)
    }
}

/// Assistant with a canned reply that records every prompt it receives.
#[derive(Clone)]
pub struct FakeAssistant {
    reply: Result<String, String>,
    prompts: Arc<Mutex<Vec<ReplacementPrompt>>>,
}

impl FakeAssistant {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Arc::default(),
        }
    }

    pub fn prompts(&self) -> Vec<ReplacementPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

impl MenuAssistant for FakeAssistant {
    fn suggest_replacements(&self, prompt: &ReplacementPrompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.reply.clone().map_err(|message| anyhow!(message))
    }
}

#[derive(Clone, Default)]
pub struct MemoryMenuStore {
    menus: Arc<Mutex<HashMap<String, WeeklyMenu>>>,
}

impl MemoryMenuStore {
    pub fn get(&self, week: &str) -> Option<WeeklyMenu> {
        self.menus.lock().unwrap().get(week).cloned()
    }
}

impl MenuStore for MemoryMenuStore {
    fn load(&self, week: &str) -> Result<Option<WeeklyMenu>> {
        Ok(self.get(week))
    }

    fn save(&self, menu: &WeeklyMenu) -> Result<()> {
        self.menus
            .lock()
            .unwrap()
            .insert(menu.week.clone(), menu.clone());
        Ok(())
    }
}
