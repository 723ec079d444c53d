//! AI replacement of menu days.
//!
//! The assistant gets the current menu plus the ids to swap and must answer
//! with `{"replacements": [{old_id, title, ingredients, instructions}]}`.
//! Anything else is rejected before a single field is used.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{MenuDay, NewRecipe, Recipe, WeeklyMenu};
use crate::normalize::deserialize_list_field;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful kitchen assistant. Reply with valid JSON only, no extra text.";

/// Everything the assistant is sent for one replacement round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplacementPrompt {
    pub system: String,
    pub instructions: String,
    pub menu_json: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Replacement {
    pub old_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_list_field")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list_field")]
    pub instructions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReplacementPayload {
    #[serde(default)]
    replacements: Vec<Replacement>,
}

pub fn build_prompt(menu: &WeeklyMenu, selected_ids: &[String]) -> Result<ReplacementPrompt> {
    let ids = serde_json::to_string(selected_ids)?;
    let instructions = format!(
        "You receive a weekly dinner menu as JSON. Replace every dish whose id is listed in \
         \"selected_ids\" with a new recipe. Respect the servings and any dietary constraints \
         in the menu, and do not repeat dishes already on the menu.\n\
         Answer with exactly this JSON shape:\n\
         {{\"replacements\": [{{\"old_id\": \"<id from selected_ids>\", \"title\": \"...\", \
         \"ingredients\": [\"...\"], \"instructions\": [\"...\"]}}]}}\n\n\
         selected_ids: {ids}"
    );
    Ok(ReplacementPrompt {
        system: SYSTEM_PROMPT.to_string(),
        instructions,
        menu_json: serde_json::to_string(menu)?,
    })
}

/// Drop Markdown code fences a model may wrap its JSON in.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Validate the assistant's answer. Unparseable JSON or an empty
/// `replacements` array is a hard failure.
pub fn parse_replacements(text: &str) -> Result<Vec<Replacement>> {
    let cleaned = strip_code_fences(text);
    let payload: ReplacementPayload = serde_json::from_str(&cleaned)
        .map_err(|e| Error::AiParse(format!("invalid JSON ({e})")))?;
    if payload.replacements.is_empty() {
        return Err(Error::AiParse("response contained no replacements".to_string()));
    }
    Ok(payload.replacements)
}

/// Apply validated replacements to a copy of `menu`.
///
/// Entries that target an id outside `selected_ids`, an id no longer on the
/// menu, or that carry no title are skipped. Each accepted entry is stored
/// through `insert` and every slot holding the old id takes the new recipe,
/// keeping its day and servings. Returns the new menu and the number of
/// replacements applied.
pub fn apply_replacements<F>(
    menu: &WeeklyMenu,
    selected_ids: &[String],
    replacements: Vec<Replacement>,
    mut insert: F,
) -> Result<(WeeklyMenu, usize)>
where
    F: FnMut(&NewRecipe) -> Result<Recipe>,
{
    let selected: HashSet<&str> = selected_ids.iter().map(String::as_str).collect();
    let mut updated = menu.clone();
    let mut applied = 0;

    for replacement in replacements {
        if !selected.contains(replacement.old_id.as_str()) {
            debug!(old_id = %replacement.old_id, "ignoring replacement for unselected id");
            continue;
        }
        if !updated.days.iter().any(|d| d.id == replacement.old_id) {
            debug!(old_id = %replacement.old_id, "ignoring replacement for id not on menu");
            continue;
        }
        let title = replacement.title.trim();
        if title.is_empty() {
            debug!(old_id = %replacement.old_id, "ignoring replacement without title");
            continue;
        }

        let recipe = insert(&NewRecipe {
            title: title.to_string(),
            ingredients: replacement.ingredients,
            instructions: replacement.instructions,
            servings: None,
        })?;

        for slot in updated.days.iter_mut().filter(|d| d.id == replacement.old_id) {
            *slot = MenuDay {
                day: slot.day,
                id: recipe.id.clone(),
                title: recipe.title.clone(),
                ingredients: recipe.ingredients.clone(),
                servings: slot.servings,
            };
        }
        applied += 1;
    }

    Ok((updated, applied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayKey;
    use chrono::Utc;

    fn menu() -> WeeklyMenu {
        let days = DayKey::ALL
            .iter()
            .enumerate()
            .map(|(i, &day)| MenuDay {
                day,
                id: ["a", "b", "c", "a", "b"][i].to_string(),
                title: format!("Dish {i}"),
                ingredients: vec!["salt".to_string()],
                servings: Some(4),
            })
            .collect();
        WeeklyMenu {
            week: "2025-W44".to_string(),
            user_id: "u1".to_string(),
            days,
            constraints: None,
        }
    }

    fn inserter(created: &mut Vec<NewRecipe>) -> impl FnMut(&NewRecipe) -> Result<Recipe> + '_ {
        move |new| {
            created.push(new.clone());
            Ok(Recipe {
                id: format!("new-{}", created.len()),
                user_id: "u1".to_string(),
                title: new.title.clone(),
                ingredients: new.ingredients.clone(),
                instructions: new.instructions.clone(),
                servings: None,
                created_at: Utc::now(),
                updated_at: None,
            })
        }
    }

    #[test]
    fn test_prompt_mentions_selected_ids_and_menu() {
        let prompt = build_prompt(&menu(), &["a".to_string()]).unwrap();
        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert!(prompt.instructions.contains(r#"selected_ids: ["a"]"#));
        assert!(prompt.instructions.contains("\"replacements\""));
        let echoed: WeeklyMenu = serde_json::from_str(&prompt.menu_json).unwrap();
        assert_eq!(echoed, menu());
    }

    #[test]
    fn test_parse_plain_json() {
        let text = r#"{"replacements": [{"old_id": "a", "title": "Tacos",
            "ingredients": ["tortillas", "beans"], "instructions": "Heat\nServe"}]}"#;
        let parsed = parse_replacements(text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].ingredients, vec!["tortillas", "beans"]);
        assert_eq!(parsed[0].instructions, vec!["Heat", "Serve"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"replacements\": [{\"old_id\": \"a\", \"title\": \"Tacos\"}]}\n```";
        let parsed = parse_replacements(text).unwrap();
        assert_eq!(parsed[0].title, "Tacos");
        assert!(parsed[0].ingredients.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_replacements("Sure! Here is your menu").unwrap_err();
        assert!(matches!(err, Error::AiParse(_)));
    }

    #[test]
    fn test_parse_rejects_empty_or_missing_replacements() {
        assert!(matches!(
            parse_replacements(r#"{"replacements": []}"#),
            Err(Error::AiParse(_))
        ));
        assert!(matches!(
            parse_replacements(r#"{"week": "2025-W44"}"#),
            Err(Error::AiParse(_))
        ));
    }

    #[test]
    fn test_apply_replaces_all_slots_with_old_id() {
        let replacements = vec![Replacement {
            old_id: "a".to_string(),
            title: " Tacos ".to_string(),
            ingredients: vec!["beans".to_string()],
            instructions: vec![],
        }];
        let mut created = Vec::new();
        let original = menu();
        let (updated, applied) = apply_replacements(
            &original,
            &["a".to_string()],
            replacements,
            inserter(&mut created),
        )
        .unwrap();

        assert_eq!(applied, 1);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].title, "Tacos");
        for i in [0, 3] {
            assert_eq!(updated.days[i].id, "new-1");
            assert_eq!(updated.days[i].title, "Tacos");
            assert_eq!(updated.days[i].ingredients, vec!["beans"]);
            assert_eq!(updated.days[i].servings, Some(4));
            assert_eq!(updated.days[i].day, original.days[i].day);
        }
        assert_eq!(updated.days[1], original.days[1]);
        // input untouched
        assert_eq!(original, menu());
    }

    #[test]
    fn test_apply_ignores_unselected_and_unknown_ids() {
        let replacements = vec![
            Replacement {
                old_id: "b".to_string(),
                title: "Not asked for".to_string(),
                ingredients: vec![],
                instructions: vec![],
            },
            Replacement {
                old_id: "zzz".to_string(),
                title: "Unknown".to_string(),
                ingredients: vec![],
                instructions: vec![],
            },
            Replacement {
                old_id: "c".to_string(),
                title: String::new(),
                ingredients: vec![],
                instructions: vec![],
            },
        ];
        let mut created = Vec::new();
        let selected = vec!["c".to_string(), "zzz".to_string()];
        let (updated, applied) =
            apply_replacements(&menu(), &selected, replacements, inserter(&mut created)).unwrap();
        assert_eq!(applied, 0);
        assert!(created.is_empty());
        assert_eq!(updated, menu());
    }

    #[test]
    fn test_apply_propagates_insert_failure() {
        let replacements = vec![Replacement {
            old_id: "a".to_string(),
            title: "Tacos".to_string(),
            ingredients: vec![],
            instructions: vec![],
        }];
        let result = apply_replacements(&menu(), &["a".to_string()], replacements, |_| {
            Err(Error::Backend(anyhow::anyhow!("insert rejected")))
        });
        assert!(matches!(result, Err(Error::Backend(_))));
    }
}
