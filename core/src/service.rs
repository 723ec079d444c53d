use tracing::info;

use crate::ai::{self, ReplacementPrompt};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::menu::{build_weekly_menu, current_week_key, validate_week_key};
use crate::models::{MenuConstraints, NewRecipe, Recipe, RecipePatch, ShoppingItem, WeeklyMenu};
use crate::normalize::normalize_list;
use crate::rotation::{self, RotationWindow};
use crate::shopping;
use crate::store::MenuStore;

/// Remote recipe collection and per-user rotation cursor.
///
/// The CLI implements this over PostgREST with reqwest. Calls are blocking;
/// hosts with their own event loop should call `MenuService` methods from a
/// background thread.
pub trait RecipeBackend: Send + Sync {
    fn count_recipes(&self, user_id: &str) -> anyhow::Result<usize>;
    /// Records `start..=end_inclusive` in rotation order (`created_at`, then `id`).
    fn fetch_recipe_range(
        &self,
        user_id: &str,
        start: usize,
        end_inclusive: usize,
    ) -> anyhow::Result<Vec<Recipe>>;
    /// Stored cursor, `0` when the profile has none.
    fn menu_cursor(&self, user_id: &str) -> anyhow::Result<i64>;
    fn set_menu_cursor(&self, user_id: &str, index: i64) -> anyhow::Result<()>;

    fn insert_recipe(&self, user_id: &str, recipe: &NewRecipe) -> anyhow::Result<Recipe>;
    /// Newest first, optionally filtered by a case-insensitive title match.
    fn list_recipes(&self, user_id: &str, search: Option<&str>) -> anyhow::Result<Vec<Recipe>>;
    fn get_recipe(&self, id: &str) -> anyhow::Result<Option<Recipe>>;
    /// `None` when no row matched.
    fn update_recipe(&self, id: &str, patch: &RecipePatch) -> anyhow::Result<Option<Recipe>>;
    /// `false` when no row matched.
    fn delete_recipe(&self, id: &str) -> anyhow::Result<bool>;
}

/// Language model that proposes replacement dishes. Returns the raw reply text.
pub trait MenuAssistant: Send + Sync {
    fn suggest_replacements(&self, prompt: &ReplacementPrompt) -> anyhow::Result<String>;
}

pub struct MenuService {
    backend: Box<dyn RecipeBackend>,
    assistant: Box<dyn MenuAssistant>,
    menus: Box<dyn MenuStore>,
    db: Database,
}

impl MenuService {
    pub fn new(
        backend: Box<dyn RecipeBackend>,
        assistant: Box<dyn MenuAssistant>,
        menus: Box<dyn MenuStore>,
        db: Database,
    ) -> Self {
        Self {
            backend,
            assistant,
            menus,
            db,
        }
    }

    fn resolve_week(week: Option<&str>) -> Result<String> {
        week.map_or_else(|| Ok(current_week_key()), validate_week_key)
    }

    // --- Weekly menu ---

    /// Next rotation window without moving the cursor.
    pub fn preview_rotation(&self, user_id: &str) -> Result<RotationWindow> {
        rotation::select_next(self.backend.as_ref(), user_id)
    }

    /// Pick the next five recipes, advance the cursor and save the week's menu.
    pub fn generate_weekly_menu(
        &self,
        user_id: &str,
        week: Option<&str>,
        constraints: Option<MenuConstraints>,
    ) -> Result<WeeklyMenu> {
        let week = Self::resolve_week(week)?;
        let window = rotation::advance(self.backend.as_ref(), user_id)?;
        let menu = build_weekly_menu(&window.items, user_id, Some(&week), constraints);
        self.menus.save(&menu).map_err(Error::Storage)?;
        info!(
            user_id,
            week = %menu.week,
            recipes = window.count,
            start = window.start_index,
            next = window.next_index,
            "saved weekly menu"
        );
        Ok(menu)
    }

    pub fn weekly_menu(&self, week: Option<&str>) -> Result<Option<WeeklyMenu>> {
        let week = Self::resolve_week(week)?;
        self.menus.load(&week).map_err(Error::Storage)
    }

    /// Ask the assistant for new dishes in place of `selected_ids`, store each
    /// accepted dish as a recipe and save the updated menu.
    pub fn replace_with_ai(
        &self,
        user_id: &str,
        selected_ids: &[String],
        week: Option<&str>,
    ) -> Result<WeeklyMenu> {
        if selected_ids.is_empty() {
            return Err(Error::InvalidInput(
                "Select at least one dish to replace".to_string(),
            ));
        }
        let week = Self::resolve_week(week)?;
        let menu = self
            .menus
            .load(&week)
            .map_err(Error::Storage)?
            .ok_or_else(|| Error::NotFound(format!("Weekly menu {week}")))?;

        let prompt = ai::build_prompt(&menu, selected_ids)?;
        let reply = self
            .assistant
            .suggest_replacements(&prompt)
            .map_err(Error::Assistant)?;
        let replacements = ai::parse_replacements(&reply)?;

        let (updated, applied) =
            ai::apply_replacements(&menu, selected_ids, replacements, |new| {
                self.backend
                    .insert_recipe(user_id, new)
                    .map_err(Error::Backend)
            })?;
        self.menus.save(&updated).map_err(Error::Storage)?;
        info!(user_id, week = %updated.week, applied, "replaced menu days");
        Ok(updated)
    }

    // --- Shopping list ---

    pub fn build_shopping_list(
        &self,
        selected_ids: &[String],
        week: Option<&str>,
    ) -> Result<Vec<ShoppingItem>> {
        let week = Self::resolve_week(week)?;
        let menu = self.menus.load(&week).map_err(Error::Storage)?;
        let checked = shopping::load_check_state(&self.db).map_err(Error::Storage)?;
        Ok(shopping::aggregate(menu.as_ref(), selected_ids, &checked))
    }

    pub fn set_item_checked(&self, id: &str, checked: bool) -> Result<()> {
        shopping::set_item_checked(&self.db, id, checked).map_err(Error::Storage)
    }

    pub fn set_all_checked(&self, ids: &[String], checked: bool) -> Result<()> {
        shopping::set_all_checked(&self.db, ids, checked).map_err(Error::Storage)
    }

    pub fn clear_checked(&self) -> Result<()> {
        shopping::clear_checked(&self.db).map_err(Error::Storage)
    }

    // --- Recipes ---

    pub fn create_recipe(&self, user_id: &str, recipe: &NewRecipe) -> Result<Recipe> {
        let title = recipe.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("Recipe title cannot be empty".to_string()));
        }
        let cleaned = NewRecipe {
            title: title.to_string(),
            ingredients: normalize_list(&recipe.ingredients),
            instructions: normalize_list(&recipe.instructions),
            servings: recipe.servings,
        };
        let created = self
            .backend
            .insert_recipe(user_id, &cleaned)
            .map_err(Error::Backend)?;
        info!(user_id, id = %created.id, "created recipe");
        Ok(created)
    }

    pub fn list_recipes(&self, user_id: &str, search: Option<&str>) -> Result<Vec<Recipe>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.backend
            .list_recipes(user_id, search)
            .map_err(Error::Backend)
    }

    pub fn get_recipe(&self, id: &str) -> Result<Recipe> {
        self.backend
            .get_recipe(id)
            .map_err(Error::Backend)?
            .ok_or_else(|| Error::NotFound(format!("Recipe {id}")))
    }

    pub fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<Recipe> {
        if patch.is_empty() {
            return Err(Error::InvalidInput("Nothing to update".to_string()));
        }
        let mut patch = patch.clone();
        if let Some(title) = &patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(Error::InvalidInput("Recipe title cannot be empty".to_string()));
            }
            patch.title = Some(title.to_string());
        }
        patch.ingredients = patch.ingredients.as_deref().map(normalize_list);
        patch.instructions = patch.instructions.as_deref().map(normalize_list);

        self.backend
            .update_recipe(id, &patch)
            .map_err(Error::Backend)?
            .ok_or_else(|| Error::NotFound(format!("Recipe {id}")))
    }

    pub fn delete_recipe(&self, id: &str) -> Result<()> {
        if self.backend.delete_recipe(id).map_err(Error::Backend)? {
            info!(id, "deleted recipe");
            Ok(())
        } else {
            Err(Error::NotFound(format!("Recipe {id}")))
        }
    }
}
