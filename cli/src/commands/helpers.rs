use serde::Serialize;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use tastecycle_core::Error;
use tastecycle_core::models::{DayKey, Recipe, ShoppingItem, WeeklyMenu};

pub(crate) fn print_recipe_table(recipes: &[Recipe]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
        #[tabled(rename = "Servings")]
        servings: String,
        #[tabled(rename = "Created")]
        created: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id.clone(),
            title: truncate(&r.title, 35),
            ingredients: r.ingredients.len(),
            servings: r.servings.map_or("-".into(), |s| s.to_string()),
            created: r.created_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_menu_table(menu: &WeeklyMenu) {
    #[derive(Tabled)]
    struct DayRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "Dish")]
        title: String,
        #[tabled(rename = "Servings")]
        servings: String,
        #[tabled(rename = "ID")]
        id: String,
    }

    let rows: Vec<DayRow> = menu
        .days
        .iter()
        .map(|d| DayRow {
            day: d.day.to_string(),
            title: if d.is_placeholder() {
                "-".to_string()
            } else {
                truncate(&d.title, 40)
            },
            servings: d.servings.map_or("-".into(), |s| s.to_string()),
            id: d.id.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(2)).with(Alignment::right()))
        .to_string();
    println!("Week {}", menu.week);
    println!("{table}");
}

pub(crate) fn print_shopping_table(items: &[ShoppingItem]) {
    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = " ")]
        mark: &'static str,
        #[tabled(rename = "Item")]
        name: String,
    }

    let rows: Vec<ItemRow> = items
        .iter()
        .map(|i| ItemRow {
            mark: if i.checked { "[x]" } else { "[ ]" },
            name: truncate(&i.name, 50),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Menu slot ids for a mix of recipe ids and weekday names (`mon`, `friday`).
pub(crate) fn resolve_selection(menu: Option<&WeeklyMenu>, args: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for arg in args {
        let id = match (menu, arg.parse::<DayKey>()) {
            (Some(menu), Ok(day)) => menu
                .days
                .iter()
                .find(|d| d.day == day)
                .map_or_else(|| arg.clone(), |d| d.id.clone()),
            _ => arg.clone(),
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Print a not-found message (JSON error object under `--json`) and exit 2.
pub(crate) fn exit_not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

/// Unwrap a service result; `NotFound` ends the process via [`exit_not_found`].
pub(crate) fn found<T>(result: tastecycle_core::Result<T>, json: bool) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(Error::NotFound(what)) => exit_not_found(&format!("{what} not found"), json),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
