use anyhow::{Context, Result, bail};
use reqwest::{RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::SupabaseSettings;
use tastecycle_core::models::{NewRecipe, Recipe, RecipePatch};
use tastecycle_core::postgrest::{
    CursorUpdate, NEWEST_FIRST, PROFILES_TABLE, ProfileRow, RECIPES_TABLE, ROTATION_ORDER,
    RecipeInsert, cursor_from_profiles, describe_error, eq, ilike_contains,
    parse_content_range_total, range_params,
};
use tastecycle_core::service::RecipeBackend;

/// PostgREST client for the `recipes` and `profiles` tables.
pub struct SupabaseClient {
    client: reqwest::Client,
    settings: Option<SupabaseSettings>,
    rt: tokio::runtime::Handle,
}

impl SupabaseClient {
    /// `settings` may be missing; requests then fail with a configuration hint.
    pub fn new(settings: Option<SupabaseSettings>, rt: tokio::runtime::Handle) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("tastecycle-cli/{}", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            settings,
            rt,
        })
    }

    fn settings(&self) -> Result<&SupabaseSettings> {
        match &self.settings {
            Some(s) => Ok(s),
            None => bail!(
                "Recipe backend is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY \
                 (and TASTECYCLE_ACCESS_TOKEN for a signed-in user)"
            ),
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> Result<RequestBuilder> {
        let settings = self.settings()?;
        let bearer = settings
            .access_token
            .as_deref()
            .unwrap_or(&settings.anon_key);
        let url = format!("{}/rest/v1/{table}", settings.url);
        debug!(%method, %url, "postgrest request");
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &settings.anon_key)
            .bearer_auth(bearer))
    }

    async fn send(builder: RequestBuilder, what: &str) -> Result<Response> {
        let resp = builder
            .send()
            .await
            .with_context(|| format!("Failed to reach recipe backend ({what})"))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        bail!("{what} failed: {}", describe_error(status.as_u16(), &body))
    }

    async fn json<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
        resp.json()
            .await
            .with_context(|| format!("Failed to parse recipe backend response ({what})"))
    }

    pub async fn count_recipes_async(&self, user_id: &str) -> Result<usize> {
        let req = self
            .request(reqwest::Method::HEAD, RECIPES_TABLE)?
            .query(&[("select", "id".to_string()), ("user_id", eq(user_id))])
            .header("Prefer", "count=exact");
        let resp = Self::send(req, "count recipes").await?;
        let range = resp
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .context("Recipe backend response is missing Content-Range")?;
        parse_content_range_total(range)
            .with_context(|| format!("Unexpected Content-Range header: {range}"))
    }

    pub async fn fetch_recipe_range_async(
        &self,
        user_id: &str,
        start: usize,
        end_inclusive: usize,
    ) -> Result<Vec<Recipe>> {
        let req = self
            .request(reqwest::Method::GET, RECIPES_TABLE)?
            .query(&[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", ROTATION_ORDER.to_string()),
            ])
            .query(&range_params(start, end_inclusive));
        let resp = Self::send(req, "fetch recipes").await?;
        Self::json(resp, "fetch recipes").await
    }

    pub async fn menu_cursor_async(&self, user_id: &str) -> Result<i64> {
        let req = self
            .request(reqwest::Method::GET, PROFILES_TABLE)?
            .query(&[
                ("select", "id,next_menu_index".to_string()),
                ("id", eq(user_id)),
            ]);
        let resp = Self::send(req, "read menu cursor").await?;
        let rows: Vec<ProfileRow> = Self::json(resp, "read menu cursor").await?;
        cursor_from_profiles(&rows)
            .with_context(|| format!("No profile row for user {user_id}; cannot read menu cursor"))
    }

    pub async fn set_menu_cursor_async(&self, user_id: &str, index: i64) -> Result<()> {
        let req = self
            .request(reqwest::Method::PATCH, PROFILES_TABLE)?
            .query(&[
                ("id", eq(user_id)),
                ("select", "id,next_menu_index".to_string()),
            ])
            .header("Prefer", "return=representation")
            .json(&CursorUpdate {
                next_menu_index: index,
            });
        let resp = Self::send(req, "update menu cursor").await?;
        let rows: Vec<ProfileRow> = Self::json(resp, "update menu cursor").await?;
        if rows.is_empty() {
            bail!("No profile row for user {user_id}; menu cursor was not saved");
        }
        Ok(())
    }

    pub async fn insert_recipe_async(&self, user_id: &str, recipe: &NewRecipe) -> Result<Recipe> {
        let req = self
            .request(reqwest::Method::POST, RECIPES_TABLE)?
            .header("Prefer", "return=representation")
            .json(&RecipeInsert { user_id, recipe });
        let resp = Self::send(req, "insert recipe").await?;
        let rows: Vec<Recipe> = Self::json(resp, "insert recipe").await?;
        rows.into_iter()
            .next()
            .context("Recipe backend returned no row for the inserted recipe")
    }

    pub async fn list_recipes_async(
        &self,
        user_id: &str,
        search: Option<&str>,
    ) -> Result<Vec<Recipe>> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("user_id", eq(user_id)),
            ("order", NEWEST_FIRST.to_string()),
        ];
        if let Some(search) = search {
            params.push(("title", ilike_contains(search)));
        }
        let req = self
            .request(reqwest::Method::GET, RECIPES_TABLE)?
            .query(&params);
        let resp = Self::send(req, "list recipes").await?;
        Self::json(resp, "list recipes").await
    }

    pub async fn get_recipe_async(&self, id: &str) -> Result<Option<Recipe>> {
        let req = self
            .request(reqwest::Method::GET, RECIPES_TABLE)?
            .query(&[("select", "*".to_string()), ("id", eq(id))]);
        let resp = Self::send(req, "get recipe").await?;
        let rows: Vec<Recipe> = Self::json(resp, "get recipe").await?;
        Ok(rows.into_iter().next())
    }

    pub async fn update_recipe_async(
        &self,
        id: &str,
        patch: &RecipePatch,
    ) -> Result<Option<Recipe>> {
        let req = self
            .request(reqwest::Method::PATCH, RECIPES_TABLE)?
            .query(&[("id", eq(id))])
            .header("Prefer", "return=representation")
            .json(patch);
        let resp = Self::send(req, "update recipe").await?;
        let rows: Vec<Recipe> = Self::json(resp, "update recipe").await?;
        Ok(rows.into_iter().next())
    }

    pub async fn delete_recipe_async(&self, id: &str) -> Result<bool> {
        let req = self
            .request(reqwest::Method::DELETE, RECIPES_TABLE)?
            .query(&[("id", eq(id)), ("select", "id".to_string())])
            .header("Prefer", "return=representation");
        let resp = Self::send(req, "delete recipe").await?;
        let rows: Vec<serde_json::Value> = Self::json(resp, "delete recipe").await?;
        Ok(!rows.is_empty())
    }
}

impl RecipeBackend for SupabaseClient {
    fn count_recipes(&self, user_id: &str) -> Result<usize> {
        self.rt.block_on(self.count_recipes_async(user_id))
    }

    fn fetch_recipe_range(
        &self,
        user_id: &str,
        start: usize,
        end_inclusive: usize,
    ) -> Result<Vec<Recipe>> {
        self.rt
            .block_on(self.fetch_recipe_range_async(user_id, start, end_inclusive))
    }

    fn menu_cursor(&self, user_id: &str) -> Result<i64> {
        self.rt.block_on(self.menu_cursor_async(user_id))
    }

    fn set_menu_cursor(&self, user_id: &str, index: i64) -> Result<()> {
        self.rt.block_on(self.set_menu_cursor_async(user_id, index))
    }

    fn insert_recipe(&self, user_id: &str, recipe: &NewRecipe) -> Result<Recipe> {
        self.rt.block_on(self.insert_recipe_async(user_id, recipe))
    }

    fn list_recipes(&self, user_id: &str, search: Option<&str>) -> Result<Vec<Recipe>> {
        self.rt.block_on(self.list_recipes_async(user_id, search))
    }

    fn get_recipe(&self, id: &str) -> Result<Option<Recipe>> {
        self.rt.block_on(self.get_recipe_async(id))
    }

    fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<Option<Recipe>> {
        self.rt.block_on(self.update_recipe_async(id, patch))
    }

    fn delete_recipe(&self, id: &str) -> Result<bool> {
        self.rt.block_on(self.delete_recipe_async(id))
    }
}
