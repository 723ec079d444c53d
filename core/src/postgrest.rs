//! Wire types and query helpers for the PostgREST recipe backend.
//!
//! The HTTP transport lives with the host (see the CLI's `SupabaseClient`);
//! everything here is pure so it can be shared and tested.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::NewRecipe;

pub const RECIPES_TABLE: &str = "recipes";
pub const PROFILES_TABLE: &str = "profiles";

/// Stable rotation order.
pub const ROTATION_ORDER: &str = "created_at.asc,id.asc";
/// Recipe collection listing order.
pub const NEWEST_FIRST: &str = "created_at.desc";

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub next_menu_index: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CursorUpdate {
    pub next_menu_index: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeInsert<'a> {
    pub user_id: &'a str,
    #[serde(flatten)]
    pub recipe: &'a NewRecipe,
}

/// Error body returned by PostgREST on 4xx/5xx.
#[derive(Debug, Clone, Deserialize)]
pub struct PostgrestError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl fmt::Display for PostgrestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if let Some(details) = self.details.as_deref().filter(|d| !d.is_empty()) {
            write!(f, ": {details}")?;
        }
        if let Some(hint) = self.hint.as_deref().filter(|h| !h.is_empty()) {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

/// Human-readable message for a failed response.
#[must_use]
pub fn describe_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(err) => format!("HTTP {status}: {err}"),
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {}", body.trim()),
    }
}

/// `eq.<value>` filter.
#[must_use]
pub fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Case-insensitive substring filter on a text column.
///
/// PostgREST reads `*` as the SQL `%` wildcard; any `*` or `%` typed by the
/// user is dropped so the search stays literal.
#[must_use]
pub fn ilike_contains(search: &str) -> String {
    let cleaned: String = search
        .trim()
        .chars()
        .filter(|c| *c != '*' && *c != '%')
        .collect();
    format!("ilike.*{cleaned}*")
}

/// `offset`/`limit` pair for an inclusive index range.
#[must_use]
pub fn range_params(start: usize, end_inclusive: usize) -> [(&'static str, String); 2] {
    let limit = end_inclusive.saturating_sub(start) + 1;
    [("offset", start.to_string()), ("limit", limit.to_string())]
}

/// Rotation cursor from a `profiles` read. `None` when the profile row is
/// missing; a null `next_menu_index` reads as 0.
#[must_use]
pub fn cursor_from_profiles(rows: &[ProfileRow]) -> Option<i64> {
    rows.first().map(|row| row.next_menu_index.unwrap_or(0))
}

/// Total from a `Content-Range` header (`0-4/42`, `*/42`).
#[must_use]
pub fn parse_content_range_total(header: &str) -> Option<usize> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}
