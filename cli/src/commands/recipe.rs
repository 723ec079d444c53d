use anyhow::Result;

use tastecycle_core::models::{NewRecipe, Recipe, RecipePatch};
use tastecycle_core::service::MenuService;

use super::helpers::{found, print_recipe_table};

pub(crate) fn cmd_recipe_add(
    svc: &MenuService,
    user_id: &str,
    recipe: &NewRecipe,
    json: bool,
) -> Result<()> {
    let created = svc.create_recipe(user_id, recipe)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        let ingredient_count = created.ingredients.len();
        println!(
            "Created recipe: {} (id: {}, {ingredient_count} ingredients)",
            created.title, created.id
        );
    }
    Ok(())
}

pub(crate) fn cmd_recipe_list(
    svc: &MenuService,
    user_id: &str,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let recipes = svc.list_recipes(user_id, search)?;
    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found");
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
    } else {
        print_recipe_table(&recipes);
    }
    Ok(())
}

fn print_recipe(recipe: &Recipe) {
    println!("=== {} ===", recipe.title);
    let servings = recipe
        .servings
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    println!(
        "  ID: {}  |  Servings: {servings}  |  Created: {}\n",
        recipe.id,
        recipe.created_at.format("%Y-%m-%d")
    );

    println!("  INGREDIENTS:");
    for ingredient in &recipe.ingredients {
        println!("    - {ingredient}");
    }
    if !recipe.instructions.is_empty() {
        println!("\n  INSTRUCTIONS:");
        for (i, step) in recipe.instructions.iter().enumerate() {
            println!("    {}. {step}", i + 1);
        }
    }
}

pub(crate) fn cmd_recipe_show(svc: &MenuService, id: &str, json: bool) -> Result<()> {
    let recipe = found(svc.get_recipe(id), json)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        print_recipe(&recipe);
    }
    Ok(())
}

pub(crate) fn cmd_recipe_edit(
    svc: &MenuService,
    id: &str,
    patch: &RecipePatch,
    json: bool,
) -> Result<()> {
    let recipe = found(svc.update_recipe(id, patch), json)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        println!("Updated recipe: {} (id: {})", recipe.title, recipe.id);
    }
    Ok(())
}

pub(crate) fn cmd_recipe_delete(svc: &MenuService, id: &str, json: bool) -> Result<()> {
    found(svc.delete_recipe(id), json)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted recipe {id}");
    }
    Ok(())
}
