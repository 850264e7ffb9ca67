//! Favorites persisted as a JSON file
//!
//! The file holds an array of favorites in the order they were added, unique
//! by id. It is read once when the store opens and rewritten in full after
//! every change.

use crate::error::{Error, ErrorCode, Result, ResultExt};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A saved service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub name: String,
    /// Wire name of the service category
    pub category: String,
    /// Epoch milliseconds
    pub added_at: i64,
}

/// File-backed favorites list
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    favorites: Vec<Favorite>,
}

impl FavoritesStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let favorites = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(Error::from)
                .context(format!("Failed to read favorites from {}", path.display()))?;
            parse_favorites(&content, &path)?
        } else {
            Vec::new()
        };

        Ok(Self { path, favorites })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Favorites in the order they were added
    pub fn list(&self) -> &[Favorite] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Favorite> {
        self.favorites.iter().find(|f| f.id == id)
    }

    /// Add a favorite. Returns `false` without touching the file if `id` is
    /// already saved.
    pub fn add(&mut self, id: &str, name: &str, category: &str) -> Result<bool> {
        if self.contains(id) {
            return Ok(false);
        }
        self.favorites.push(Favorite {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            added_at: Utc::now().timestamp_millis(),
        });
        self.save()?;
        Ok(true)
    }

    /// Remove a favorite. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != id);
        if self.favorites.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Add if absent, remove if present. Returns whether `id` is now saved.
    pub fn toggle(&mut self, id: &str, name: &str, category: &str) -> Result<bool> {
        if self.contains(id) {
            self.remove(id)?;
            Ok(false)
        } else {
            self.add(id, name, category)?;
            Ok(true)
        }
    }

    /// Remove everything
    pub fn clear(&mut self) -> Result<()> {
        self.favorites.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(Error::from)
                .context(format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.favorites)?;
        fs::write(&self.path, json)
            .map_err(Error::from)
            .context(format!("Failed to write favorites to {}", self.path.display()))
    }
}

fn parse_favorites(content: &str, path: &Path) -> Result<Vec<Favorite>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut favorites: Vec<Favorite> = serde_json::from_str(content).map_err(|e| {
        Error::new(
            ErrorCode::FavoritesCorrupt,
            format!("Favorites file {} is not valid: {}", path.display(), e),
        )
        .with_suggestion("Delete the file to start with an empty favorites list")
        .with_source(e)
    })?;

    let mut seen = std::collections::HashSet::new();
    favorites.retain(|f| seen.insert(f.id.clone()));
    Ok(favorites)
}
