//! `favorites`: the saved-services list.

use crate::output::Status;
use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;
use seoul_services_catalog::Category;
use seoul_services_core::favorites::FavoritesStore;
use std::path::Path;

#[derive(Subcommand)]
pub enum Action {
    /// Show saved services
    List {
        #[arg(long)]
        json: bool,
    },
    /// Save a service
    Add {
        id: String,
        name: String,
        category: Category,
    },
    /// Forget a service
    Remove { id: String },
    /// Save if absent, forget if present
    Toggle {
        id: String,
        name: String,
        category: Category,
    },
    /// Forget everything
    Clear,
}

pub fn run(path: &Path, action: &Action) -> Result<()> {
    let mut store = FavoritesStore::open(path)?;

    match action {
        Action::List { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(store.list())?);
            } else if store.is_empty() {
                Status::info("No favorites yet");
            } else {
                for favorite in store.list() {
                    let label = favorite
                        .category
                        .parse::<Category>()
                        .map(Category::label)
                        .unwrap_or(favorite.category.as_str());
                    println!("{} {} [{}]", favorite.id.dimmed(), favorite.name, label.cyan());
                }
            }
        }
        Action::Add { id, name, category } => {
            if store.add(id, name, category.as_str())? {
                Status::success(&format!("Saved {name}"));
            } else {
                Status::info(&format!("{name} is already saved"));
            }
        }
        Action::Remove { id } => {
            if store.remove(id)? {
                Status::success(&format!("Removed {id}"));
            } else {
                Status::warning(&format!("{id} was not saved"));
            }
        }
        Action::Toggle { id, name, category } => {
            if store.toggle(id, name, category.as_str())? {
                Status::success(&format!("Saved {name}"));
            } else {
                Status::success(&format!("Removed {name}"));
            }
        }
        Action::Clear => {
            let count = store.len();
            store.clear()?;
            Status::success(&format!("Cleared {count} favorites"));
        }
    }
    Ok(())
}
