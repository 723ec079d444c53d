use anyhow::{Result, bail};

use tastecycle_core::service::MenuService;
use tastecycle_core::shopping::normalize_key;

use super::helpers::{print_shopping_table, resolve_selection};

/// Slot ids for `--only`, resolved against the week's menu.
fn selection(svc: &MenuService, only: &[String], week: Option<&str>) -> Result<Vec<String>> {
    if only.is_empty() {
        return Ok(Vec::new());
    }
    let menu = svc.weekly_menu(week)?;
    Ok(resolve_selection(menu.as_ref(), only))
}

pub(crate) fn cmd_shop_list(
    svc: &MenuService,
    only: &[String],
    week: Option<&str>,
    json: bool,
) -> Result<()> {
    let selected = selection(svc, only, week)?;
    let items = svc.build_shopping_list(&selected, week)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        eprintln!("Shopping list is empty");
        return Ok(());
    }

    print_shopping_table(&items);
    let done = items.iter().filter(|i| i.checked).count();
    println!("{done}/{} checked", items.len());
    Ok(())
}

/// Items are addressed by name; the name is normalized the same way list keys are.
pub(crate) fn cmd_shop_check(
    svc: &MenuService,
    item: &str,
    checked: bool,
    json: bool,
) -> Result<()> {
    let key = normalize_key(item);
    if key.is_empty() {
        bail!("Item name cannot be empty");
    }
    svc.set_item_checked(&key, checked)?;

    if json {
        println!("{}", serde_json::json!({ "id": key, "checked": checked }));
    } else if checked {
        println!("Checked {key}");
    } else {
        println!("Unchecked {key}");
    }
    Ok(())
}

pub(crate) fn cmd_shop_check_all(
    svc: &MenuService,
    checked: bool,
    only: &[String],
    week: Option<&str>,
    json: bool,
) -> Result<()> {
    let selected = selection(svc, only, week)?;
    let items = svc.build_shopping_list(&selected, week)?;
    let ids: Vec<String> = items.into_iter().map(|i| i.id).collect();
    svc.set_all_checked(&ids, checked)?;

    if json {
        println!("{}", serde_json::json!({ "updated": ids.len(), "checked": checked }));
    } else {
        let verb = if checked { "Checked" } else { "Unchecked" };
        println!("{verb} {} items", ids.len());
    }
    Ok(())
}

pub(crate) fn cmd_shop_clear(svc: &MenuService, json: bool) -> Result<()> {
    svc.clear_checked()?;
    if json {
        println!("{}", serde_json::json!({ "cleared": true }));
    } else {
        println!("Cleared all checkmarks");
    }
    Ok(())
}
