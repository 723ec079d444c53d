use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::deserialize_list_field;

/// Slots in a weekly menu, and the rotation step: one recipe per weekday.
pub const MENU_DAYS: usize = 5;

/// Prefix of placeholder slot ids (`empty-0` .. `empty-4`).
pub const PLACEHOLDER_PREFIX: &str = "empty-";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_list_field")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list_field")]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
}

/// Partial update; `None` fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RecipePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
}

impl RecipePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
            && self.servings.is_none()
    }
}

// --- Weekly menu ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayKey {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl DayKey {
    pub const ALL: [DayKey; MENU_DAYS] = [
        DayKey::Mon,
        DayKey::Tue,
        DayKey::Wed,
        DayKey::Thu,
        DayKey::Fri,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DayKey::Mon => "Mon",
            DayKey::Tue => "Tue",
            DayKey::Wed => "Wed",
            DayKey::Thu => "Thu",
            DayKey::Fri => "Fri",
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mon" | "monday" => Ok(DayKey::Mon),
            "tue" | "tuesday" => Ok(DayKey::Tue),
            "wed" | "wednesday" => Ok(DayKey::Wed),
            "thu" | "thursday" => Ok(DayKey::Thu),
            "fri" | "friday" => Ok(DayKey::Fri),
            _ => Err(format!("Invalid weekday '{s}'. Use mon, tue, wed, thu or fri")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuDay {
    pub day: DayKey,
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_list_field")]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub servings: Option<u32>,
}

impl MenuDay {
    #[must_use]
    pub fn placeholder(day: DayKey, index: usize) -> Self {
        Self {
            day,
            id: format!("{PLACEHOLDER_PREFIX}{index}"),
            title: String::new(),
            ingredients: Vec::new(),
            servings: None,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_PREFIX)
    }
}

/// Dietary and budget hints; stored and forwarded, never interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MenuConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegetarian_days: Option<Vec<DayKey>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gluten_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_per_meal_sek: Option<f64>,
}

impl MenuConstraints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vegetarian_days.is_none()
            && self.gluten_free.is_none()
            && self.budget_per_meal_sek.is_none()
    }
}

/// One document per ISO week; regenerating a week overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyMenu {
    pub week: String,
    pub user_id: String,
    pub days: Vec<MenuDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<MenuConstraints>,
}

// --- Shopping list ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShoppingItem {
    /// Normalized ingredient key, also the check-state key.
    pub id: String,
    pub name: String,
    pub checked: bool,
}
