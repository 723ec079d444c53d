//! Shopping list aggregation.
//!
//! Ingredients of the chosen menu days are split, normalized into dedup keys
//! and merged. Only the check-state is persisted; the items themselves are
//! recomputed from the current weekly menu on every build.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::collate::swedish_cmp;
use crate::db::Database;
use crate::models::{MENU_DAYS, MenuDay, ShoppingItem, WeeklyMenu};
use crate::normalize::normalize_list;

/// Key of the check-state blob in the local key-value store.
pub const CHECKED_STATE_KEY: &str = "tastecycle.shoppinglist.checked.v1";

/// Normalized ingredient key -> checked.
pub type CheckState = BTreeMap<String, bool>;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));
static BULLETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[•\-–—]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Dedup key for one ingredient fragment: parentheticals removed, bullets and
/// dashes turned into spaces, whitespace collapsed, lowercased.
#[must_use]
pub fn normalize_key(fragment: &str) -> String {
    let s = PARENTHETICAL.replace_all(fragment, "");
    let s = BULLETS.replace_all(&s, " ");
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim().to_lowercase()
}

/// First character uppercased, the rest unchanged.
#[must_use]
pub fn display_name(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keys of every ingredient on the included days, deduplicated.
///
/// Only the first `MENU_DAYS` slots are considered. A non-empty selection
/// keeps the slots whose id is selected.
#[must_use]
pub fn collect_keys(days: &[MenuDay], selected_ids: &[String]) -> Vec<String> {
    let selected: HashSet<&str> = selected_ids.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for day in days.iter().take(MENU_DAYS) {
        if !selected.is_empty() && !selected.contains(day.id.as_str()) {
            continue;
        }
        for entry in normalize_list(&day.ingredients) {
            for fragment in entry.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                let key = normalize_key(fragment);
                if !key.is_empty() && seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
        }
    }
    keys
}

/// Build the sorted, checkable list for a menu.
#[must_use]
pub fn aggregate(
    menu: Option<&WeeklyMenu>,
    selected_ids: &[String],
    checked: &CheckState,
) -> Vec<ShoppingItem> {
    let Some(menu) = menu else {
        return Vec::new();
    };

    let mut items: Vec<ShoppingItem> = collect_keys(&menu.days, selected_ids)
        .into_iter()
        .map(|key| ShoppingItem {
            name: display_name(&key),
            checked: checked.get(&key).copied().unwrap_or(false),
            id: key,
        })
        .collect();
    items.sort_by(|a, b| swedish_cmp(&a.name, &b.name));
    items
}

// --- Check-state persistence ---

pub fn load_check_state(db: &Database) -> Result<CheckState> {
    match db.get_setting(CHECKED_STATE_KEY)? {
        Some(raw) => {
            serde_json::from_str(&raw).context("Failed to parse saved shopping list state")
        }
        None => Ok(CheckState::new()),
    }
}

fn save_check_state(db: &Database, state: &CheckState) -> Result<()> {
    let raw = serde_json::to_string(state)?;
    db.set_setting(CHECKED_STATE_KEY, &raw)
}

pub fn set_item_checked(db: &Database, id: &str, checked: bool) -> Result<()> {
    let mut state = load_check_state(db)?;
    state.insert(id.to_string(), checked);
    save_check_state(db, &state)
}

pub fn set_all_checked(db: &Database, ids: &[String], checked: bool) -> Result<()> {
    let mut state = load_check_state(db)?;
    for id in ids {
        state.insert(id.clone(), checked);
    }
    save_check_state(db, &state)
}

pub fn clear_checked(db: &Database) -> Result<()> {
    db.delete_setting(CHECKED_STATE_KEY)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayKey;

    fn day(id: &str, ingredients: &[&str]) -> MenuDay {
        MenuDay {
            day: DayKey::Mon,
            id: id.to_string(),
            title: id.to_string(),
            ingredients: ingredients.iter().map(ToString::to_string).collect(),
            servings: None,
        }
    }

    fn menu(days: Vec<MenuDay>) -> WeeklyMenu {
        WeeklyMenu {
            week: "2025-W44".to_string(),
            user_id: "u1".to_string(),
            days,
            constraints: None,
        }
    }

    fn names(items: &[ShoppingItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Flour (all-purpose)"), "flour");
        assert_eq!(normalize_key("2 cups flour"), "2 cups flour");
        assert_eq!(normalize_key("• Salt"), "salt");
        assert_eq!(normalize_key("olive-oil  —  extra"), "olive oil extra");
        assert_eq!(normalize_key("  Ägg (gärna ekologiska)  (6 st) "), "ägg");
        assert_eq!(normalize_key("(optional)"), "");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("flour"), "Flour");
        assert_eq!(display_name("ägg"), "Ägg");
        assert_eq!(display_name("2 cups flour"), "2 cups flour");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_flour_variants_stay_distinct() {
        let m = menu(vec![
            day("a", &["2 cups flour"]),
            day("b", &["Flour (all-purpose)"]),
        ]);
        let items = aggregate(Some(&m), &[], &CheckState::new());
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2 cups flour", "flour"]);
        assert_eq!(items[1].name, "Flour");
    }

    #[test]
    fn test_milk_eggs_flour_dedup() {
        let m = menu(vec![day("a", &["milk", "eggs"]), day("b", &["eggs", "flour"])]);
        let items = aggregate(Some(&m), &[], &CheckState::new());
        assert_eq!(names(&items), vec!["Eggs", "Flour", "Milk"]);
        assert!(items.iter().all(|i| !i.checked));
    }

    #[test]
    fn test_no_menu_is_empty() {
        assert!(aggregate(None, &[], &CheckState::new()).is_empty());
    }

    #[test]
    fn test_selection_filters_days() {
        let m = menu(vec![day("a", &["milk"]), day("b", &["flour"]), day("c", &["salt"])]);
        let selected = vec!["a".to_string(), "c".to_string()];
        let items = aggregate(Some(&m), &selected, &CheckState::new());
        assert_eq!(names(&items), vec!["Milk", "Salt"]);
    }

    #[test]
    fn test_selection_of_unknown_ids_is_empty() {
        let m = menu(vec![day("a", &["milk"])]);
        let items = aggregate(Some(&m), &["zzz".to_string()], &CheckState::new());
        assert!(items.is_empty());
    }

    #[test]
    fn test_only_first_five_days_count() {
        let mut days: Vec<MenuDay> = (0..5).map(|i| day(&format!("d{i}"), &["milk"])).collect();
        days.push(day("extra", &["caviar"]));
        let items = aggregate(Some(&menu(days)), &[], &CheckState::new());
        assert_eq!(names(&items), vec!["Milk"]);
    }

    #[test]
    fn test_comma_entries_are_split() {
        let m = menu(vec![day("a", &["salt, pepper", "Salt"])]);
        let items = aggregate(Some(&m), &[], &CheckState::new());
        assert_eq!(names(&items), vec!["Pepper", "Salt"]);
    }

    #[test]
    fn test_swedish_sort_order() {
        let m = menu(vec![day("a", &["ägg", "öl", "zucchini", "ål", "apelsin"])]);
        let items = aggregate(Some(&m), &[], &CheckState::new());
        assert_eq!(names(&items), vec!["Apelsin", "Zucchini", "Ål", "Ägg", "Öl"]);
    }

    #[test]
    fn test_check_state_merge() {
        let m = menu(vec![day("a", &["milk", "eggs"])]);
        let mut state = CheckState::new();
        state.insert("eggs".to_string(), true);
        state.insert("gone".to_string(), true);
        let items = aggregate(Some(&m), &[], &state);
        assert_eq!(items.len(), 2);
        assert!(items.iter().find(|i| i.id == "eggs").unwrap().checked);
        assert!(!items.iter().find(|i| i.id == "milk").unwrap().checked);
    }

    #[test]
    fn test_check_state_persistence() {
        let db = Database::open_in_memory().unwrap();
        assert!(load_check_state(&db).unwrap().is_empty());

        set_item_checked(&db, "eggs", true).unwrap();
        set_all_checked(&db, &["milk".to_string(), "flour".to_string()], true).unwrap();
        set_item_checked(&db, "milk", false).unwrap();

        let state = load_check_state(&db).unwrap();
        assert_eq!(state.get("eggs"), Some(&true));
        assert_eq!(state.get("flour"), Some(&true));
        assert_eq!(state.get("milk"), Some(&false));

        clear_checked(&db).unwrap();
        assert!(load_check_state(&db).unwrap().is_empty());
        assert!(db.get_setting(CHECKED_STATE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_check_state_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(CHECKED_STATE_KEY, "not json").unwrap();
        assert!(load_check_state(&db).is_err());
    }
}
