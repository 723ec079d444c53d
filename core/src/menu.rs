//! Weekly menu documents and ISO week keys.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::models::{DayKey, MenuConstraints, MenuDay, Recipe, WeeklyMenu};

/// ISO 8601 week key (`YYYY-Www`) for a calendar date.
///
/// The date is moved to the Thursday of its ISO week; that Thursday's year
/// is the week-numbering year.
#[must_use]
pub fn iso_week_key(date: NaiveDate) -> String {
    let weekday = i64::from(date.weekday().number_from_monday());
    let thursday = date + Duration::days(4 - weekday);
    let week = (thursday.ordinal0() + 1).div_ceil(7);
    format!("{}-W{week:02}", thursday.year())
}

#[must_use]
pub fn week_key_at(now: DateTime<Utc>) -> String {
    iso_week_key(now.date_naive())
}

#[must_use]
pub fn current_week_key() -> String {
    week_key_at(Utc::now())
}

/// Accepts `YYYY-Www` with a week between 01 and 53.
pub fn validate_week_key(week: &str) -> Result<String> {
    let week = week.trim();
    let invalid =
        || Error::InvalidInput(format!("Invalid week '{week}'. Use YYYY-Www, e.g. 2025-W44"));

    let (year, number) = week.split_once("-W").ok_or_else(invalid)?;
    if year.len() != 4 || number.len() != 2 {
        return Err(invalid());
    }
    if !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let number: u32 = number.parse().map_err(|_| invalid())?;
    if !(1..=53).contains(&number) {
        return Err(invalid());
    }
    Ok(week.to_string())
}

/// Package up to five recipes into a Mon..Fri menu.
///
/// Missing slots become `empty-{i}` placeholders. The recipe slice is only
/// borrowed.
#[must_use]
pub fn build_weekly_menu(
    recipes: &[Recipe],
    user_id: &str,
    week: Option<&str>,
    constraints: Option<MenuConstraints>,
) -> WeeklyMenu {
    let week = week.map_or_else(current_week_key, str::to_string);
    let days = DayKey::ALL
        .iter()
        .enumerate()
        .map(|(i, &day)| match recipes.get(i) {
            Some(recipe) => MenuDay {
                day,
                id: recipe.id.clone(),
                title: recipe.title.clone(),
                ingredients: recipe.ingredients.clone(),
                servings: recipe.servings,
            },
            None => MenuDay::placeholder(day, i),
        })
        .collect();

    WeeklyMenu {
        week,
        user_id: user_id.to_string(),
        days,
        constraints,
    }
}
