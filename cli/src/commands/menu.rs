use anyhow::Result;

use tastecycle_core::models::MenuConstraints;
use tastecycle_core::service::MenuService;

use super::helpers::{exit_not_found, found, print_menu_table, resolve_selection};

pub(crate) fn cmd_menu_generate(
    svc: &MenuService,
    user_id: &str,
    week: Option<&str>,
    constraints: Option<MenuConstraints>,
    json: bool,
) -> Result<()> {
    let menu = svc.generate_weekly_menu(user_id, week, constraints)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&menu)?);
        return Ok(());
    }

    print_menu_table(&menu);
    if menu.days.iter().all(|d| d.is_placeholder()) {
        eprintln!("No recipes yet. Add some with: tastecycle recipe add <title>");
    }
    Ok(())
}

pub(crate) fn cmd_menu_show(svc: &MenuService, week: Option<&str>, json: bool) -> Result<()> {
    let Some(menu) = svc.weekly_menu(week)? else {
        exit_not_found(
            "No menu for this week. Create one with: tastecycle menu generate",
            json,
        );
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&menu)?);
        return Ok(());
    }

    print_menu_table(&menu);
    if let Some(c) = &menu.constraints {
        if let Some(days) = &c.vegetarian_days {
            let days: Vec<String> = days.iter().map(ToString::to_string).collect();
            println!("  Vegetarian: {}", days.join(", "));
        }
        if c.gluten_free == Some(true) {
            println!("  Gluten free");
        }
        if let Some(budget) = c.budget_per_meal_sek {
            println!("  Budget: {budget:.0} SEK per meal");
        }
    }
    Ok(())
}

/// `dishes` are recipe ids or weekday names.
pub(crate) fn cmd_menu_replace(
    svc: &MenuService,
    user_id: &str,
    dishes: &[String],
    week: Option<&str>,
    json: bool,
) -> Result<()> {
    let current = svc.weekly_menu(week)?;
    let selected = resolve_selection(current.as_ref(), dishes);
    let menu = found(svc.replace_with_ai(user_id, &selected, week), json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&menu)?);
    } else {
        print_menu_table(&menu);
    }
    Ok(())
}
