mod commands;
mod config;
mod openai;
mod supabase;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_config, cmd_menu_generate, cmd_menu_replace, cmd_menu_show, cmd_recipe_add,
    cmd_recipe_delete, cmd_recipe_edit, cmd_recipe_list, cmd_recipe_show, cmd_shop_check,
    cmd_shop_check_all, cmd_shop_clear, cmd_shop_list,
};
use crate::config::Config;
use crate::openai::OpenAiClient;
use crate::supabase::SupabaseClient;
use tastecycle_core::db::Database;
use tastecycle_core::models::{DayKey, MenuConstraints, NewRecipe, RecipePatch};
use tastecycle_core::service::MenuService;
use tastecycle_core::store::FileMenuStore;

#[derive(Parser)]
#[command(
    name = "tastecycle",
    version,
    about = "Weekly dinner menus rotated from your own recipes, plus a shopping list"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage your recipe collection
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Generate and inspect weekly menus
    Menu {
        #[command(subcommand)]
        command: MenuCommands,
    },
    /// Shopping list for the week's menu
    Shop {
        #[command(subcommand)]
        command: ShopCommands,
    },
    /// Show resolved paths and settings (secrets masked)
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Add a recipe
    Add {
        /// Recipe title
        title: String,
        /// Ingredient (repeatable, e.g. -i "3 dl mjöl" -i "3 ägg")
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
        /// Instruction step (repeatable)
        #[arg(short = 's', long = "step")]
        steps: Vec<String>,
        /// Number of servings
        #[arg(long)]
        servings: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recipes, newest first
    List {
        /// Only titles containing this text
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one recipe
    Show {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a recipe (given fields replace the stored ones)
    Edit {
        /// Recipe ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Replace ingredients (repeatable)
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
        /// Replace instruction steps (repeatable)
        #[arg(short = 's', long = "step")]
        steps: Vec<String>,
        /// New number of servings
        #[arg(long)]
        servings: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe
    Delete {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MenuCommands {
    /// Pick the next five recipes in rotation and save them as the week's menu
    Generate {
        /// ISO week (YYYY-Www, default: current week)
        #[arg(long)]
        week: Option<String>,
        /// Vegetarian days, comma separated (e.g. mon,thu)
        #[arg(long, value_delimiter = ',')]
        vegetarian: Vec<DayKey>,
        /// Gluten free week
        #[arg(long)]
        gluten_free: bool,
        /// Budget per meal in SEK
        #[arg(long)]
        budget: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the saved menu
    Show {
        /// ISO week (YYYY-Www, default: current week)
        #[arg(long)]
        week: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Let the AI swap out dishes (by recipe ID or weekday)
    Replace {
        /// Recipe IDs or weekdays (mon..fri)
        #[arg(required = true)]
        dishes: Vec<String>,
        /// ISO week (YYYY-Www, default: current week)
        #[arg(long)]
        week: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ShopCommands {
    /// Show the shopping list
    List {
        /// Only these dishes (recipe IDs or weekdays, comma separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
        /// ISO week (YYYY-Www, default: current week)
        #[arg(long)]
        week: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check off an item
    Check {
        /// Item name
        item: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Uncheck an item
    Uncheck {
        /// Item name
        item: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check every item on the list
    CheckAll {
        /// Only these dishes (recipe IDs or weekdays, comma separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
        /// ISO week (YYYY-Www, default: current week)
        #[arg(long)]
        week: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Uncheck every item on the list
    UncheckAll {
        /// Only these dishes (recipe IDs or weekdays, comma separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
        /// ISO week (YYYY-Www, default: current week)
        #[arg(long)]
        week: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget all checkmarks
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Logs go to stderr so `--json` output stays clean.
fn init_tracing() {
    let filter = std::env::var("TASTECYCLE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(|_| EnvFilter::new("warn"), EnvFilter::new);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn build_service(config: &Config, rt: &tokio::runtime::Runtime) -> Result<MenuService> {
    let backend = SupabaseClient::new(config.supabase(), rt.handle().clone())?;
    let assistant = OpenAiClient::new(config.openai(), rt.handle().clone())?;
    let menus = FileMenuStore::new(&config.menus_dir);
    let db = Database::open(&config.db_path)?;
    Ok(MenuService::new(
        Box::new(backend),
        Box::new(assistant),
        Box::new(menus),
        db,
    ))
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() { None } else { Some(items) }
}

/// `None` when no constraint flag was given.
fn constraints_from_flags(
    vegetarian: Vec<DayKey>,
    gluten_free: bool,
    budget: Option<f64>,
) -> Option<MenuConstraints> {
    let constraints = MenuConstraints {
        vegetarian_days: non_empty(vegetarian),
        gluten_free: gluten_free.then_some(true),
        budget_per_meal_sek: budget,
    };
    (!constraints.is_empty()).then_some(constraints)
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let svc = build_service(&config, &rt)?;

    match cli.command {
        Commands::Config { json } => cmd_config(&config, json),
        Commands::Recipe { command } => match command {
            RecipeCommands::Add {
                title,
                ingredients,
                steps,
                servings,
                json,
            } => {
                let recipe = NewRecipe {
                    title,
                    ingredients,
                    instructions: steps,
                    servings,
                };
                cmd_recipe_add(&svc, config.require_user_id()?, &recipe, json)
            }
            RecipeCommands::List { search, json } => {
                cmd_recipe_list(&svc, config.require_user_id()?, search.as_deref(), json)
            }
            RecipeCommands::Show { id, json } => cmd_recipe_show(&svc, &id, json),
            RecipeCommands::Edit {
                id,
                title,
                ingredients,
                steps,
                servings,
                json,
            } => {
                let patch = RecipePatch {
                    title,
                    ingredients: non_empty(ingredients),
                    instructions: non_empty(steps),
                    servings,
                };
                cmd_recipe_edit(&svc, &id, &patch, json)
            }
            RecipeCommands::Delete { id, json } => cmd_recipe_delete(&svc, &id, json),
        },
        Commands::Menu { command } => match command {
            MenuCommands::Generate {
                week,
                vegetarian,
                gluten_free,
                budget,
                json,
            } => {
                let constraints = constraints_from_flags(vegetarian, gluten_free, budget);
                cmd_menu_generate(
                    &svc,
                    config.require_user_id()?,
                    week.as_deref(),
                    constraints,
                    json,
                )
            }
            MenuCommands::Show { week, json } => cmd_menu_show(&svc, week.as_deref(), json),
            MenuCommands::Replace { dishes, week, json } => cmd_menu_replace(
                &svc,
                config.require_user_id()?,
                &dishes,
                week.as_deref(),
                json,
            ),
        },
        Commands::Shop { command } => match command {
            ShopCommands::List { only, week, json } => {
                cmd_shop_list(&svc, &only, week.as_deref(), json)
            }
            ShopCommands::Check { item, json } => cmd_shop_check(&svc, &item, true, json),
            ShopCommands::Uncheck { item, json } => cmd_shop_check(&svc, &item, false, json),
            ShopCommands::CheckAll { only, week, json } => {
                cmd_shop_check_all(&svc, true, &only, week.as_deref(), json)
            }
            ShopCommands::UncheckAll { only, week, json } => {
                cmd_shop_check_all(&svc, false, &only, week.as_deref(), json)
            }
            ShopCommands::Clear { json } => cmd_shop_clear(&svc, json),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_with_constraints() {
        let cli = Cli::try_parse_from([
            "tastecycle",
            "menu",
            "generate",
            "--week",
            "2025-W44",
            "--vegetarian",
            "mon,thu",
            "--gluten-free",
        ])
        .unwrap();
        let Commands::Menu {
            command:
                MenuCommands::Generate {
                    week,
                    vegetarian,
                    gluten_free,
                    budget,
                    ..
                },
        } = cli.command
        else {
            panic!("expected menu generate");
        };
        assert_eq!(week.as_deref(), Some("2025-W44"));
        assert_eq!(vegetarian, vec![DayKey::Mon, DayKey::Thu]);
        assert!(gluten_free);
        assert!(budget.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_weekday() {
        assert!(
            Cli::try_parse_from(["tastecycle", "menu", "generate", "--vegetarian", "sun"]).is_err()
        );
    }

    #[test]
    fn test_replace_needs_a_dish() {
        assert!(Cli::try_parse_from(["tastecycle", "menu", "replace"]).is_err());
    }

    #[test]
    fn test_constraints_from_flags() {
        assert!(constraints_from_flags(Vec::new(), false, None).is_none());

        let constraints = constraints_from_flags(vec![DayKey::Tue], true, Some(60.0)).unwrap();
        assert_eq!(constraints.vegetarian_days, Some(vec![DayKey::Tue]));
        assert_eq!(constraints.gluten_free, Some(true));
        assert_eq!(constraints.budget_per_meal_sek, Some(60.0));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Vec::<u32>::new()), None);
        assert_eq!(non_empty(vec![1]), Some(vec![1]));
    }
}
