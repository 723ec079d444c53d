mod config;
mod helpers;
mod menu;
mod recipe;
mod shopping;

pub(crate) use config::cmd_config;
pub(crate) use menu::{cmd_menu_generate, cmd_menu_replace, cmd_menu_show};
pub(crate) use recipe::{
    cmd_recipe_add, cmd_recipe_delete, cmd_recipe_edit, cmd_recipe_list, cmd_recipe_show,
};
pub(crate) use shopping::{cmd_shop_check, cmd_shop_check_all, cmd_shop_clear, cmd_shop_list};
