//! Round-robin menu rotation over a user's recipe collection.
//!
//! The collection is ordered by `created_at`, then `id`. A per-user cursor
//! (`next_menu_index`) marks where the next generation starts; it is read
//! modulo the current collection size so a stale or negative value is still
//! usable.

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{MENU_DAYS, Recipe};
use crate::service::RecipeBackend;

/// Outcome of one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationWindow {
    /// Exactly `MENU_DAYS` recipes, or none when the collection is empty.
    pub items: Vec<Recipe>,
    pub count: usize,
    pub start_index: usize,
    pub next_index: usize,
}

impl RotationWindow {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            start_index: 0,
            next_index: 0,
        }
    }
}

/// `((cursor mod count) + count) mod count`. `count` must be non-zero.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn start_index(cursor: i64, count: usize) -> usize {
    let n = count as i64;
    (((cursor % n) + n) % n) as usize
}

/// Distance the cursor moves per generation.
#[must_use]
pub fn step(count: usize) -> usize {
    MENU_DAYS.min(count)
}

#[must_use]
pub fn next_index(start: usize, count: usize) -> usize {
    (start + step(count)) % count
}

/// Inclusive index ranges covering `step(count)` records from `start`,
/// split in two when the window runs past the end of the collection.
#[must_use]
pub fn window_ranges(start: usize, count: usize) -> Vec<(usize, usize)> {
    let len = step(count);
    if len == 0 {
        return Vec::new();
    }
    let first_end = (start + len).min(count) - 1;
    let mut ranges = vec![(start, first_end)];
    let taken = first_end - start + 1;
    if taken < len {
        ranges.push((0, len - taken - 1));
    }
    ranges
}

/// Cycle the fetched window across all menu slots. Small collections repeat.
#[must_use]
pub fn fill_slots(window: &[Recipe]) -> Vec<Recipe> {
    window.iter().cycle().take(MENU_DAYS).cloned().collect()
}

/// Read the next window without touching the cursor.
pub fn select_next(backend: &dyn RecipeBackend, user_id: &str) -> Result<RotationWindow> {
    let count = backend.count_recipes(user_id).map_err(Error::Backend)?;
    if count == 0 {
        debug!(user_id, "no recipes, nothing to rotate");
        return Ok(RotationWindow::empty());
    }

    let cursor = backend.menu_cursor(user_id).map_err(Error::Backend)?;
    let start = start_index(cursor, count);

    let mut window = Vec::with_capacity(step(count));
    for (from, to) in window_ranges(start, count) {
        let part = backend
            .fetch_recipe_range(user_id, from, to)
            .map_err(Error::Backend)?;
        window.extend(part);
    }
    debug!(user_id, count, cursor, start, fetched = window.len(), "selected rotation window");

    Ok(RotationWindow {
        items: fill_slots(&window),
        count,
        start_index: start,
        next_index: next_index(start, count),
    })
}

/// Select the next window and persist the advanced cursor.
///
/// The cursor is written only after every read succeeded, and never when the
/// collection is empty. Two concurrent calls can both read the same cursor;
/// the later write wins.
pub fn advance(backend: &dyn RecipeBackend, user_id: &str) -> Result<RotationWindow> {
    let window = select_next(backend, user_id)?;
    if window.count > 0 {
        let next = i64::try_from(window.next_index)
            .map_err(|_| Error::InvalidInput("cursor out of range".to_string()))?;
        backend
            .set_menu_cursor(user_id, next)
            .map_err(Error::Backend)?;
    }
    Ok(window)
}
