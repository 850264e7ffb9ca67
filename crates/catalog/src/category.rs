//! The closed set of service categories.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Service category.
///
/// Declaration order is the canonical order used for tallies and tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Cultural event (문화행사)
    #[serde(rename = "cultural_events")]
    CulturalEvent,
    /// Public library (도서관)
    #[serde(rename = "libraries")]
    Library,
    /// Cultural space (문화공간)
    #[serde(rename = "cultural_spaces")]
    CulturalSpace,
    /// Public reservation (공공예약)
    #[serde(rename = "public_reservations")]
    PublicReservation,
    /// Future heritage site (미래유산)
    #[serde(rename = "future_heritage")]
    FutureHeritage,
}

impl Category {
    /// Every category in canonical order.
    pub const ALL: [Category; 5] = [
        Category::CulturalEvent,
        Category::Library,
        Category::CulturalSpace,
        Category::PublicReservation,
        Category::FutureHeritage,
    ];

    /// Position in [`Category::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire name used by the backend and in URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::CulturalEvent => "cultural_events",
            Category::Library => "libraries",
            Category::CulturalSpace => "cultural_spaces",
            Category::PublicReservation => "public_reservations",
            Category::FutureHeritage => "future_heritage",
        }
    }

    /// Korean display label.
    pub fn label(self) -> &'static str {
        match self {
            Category::CulturalEvent => "문화행사",
            Category::Library => "도서관",
            Category::CulturalSpace => "문화공간",
            Category::PublicReservation => "공공예약",
            Category::FutureHeritage => "미래유산",
        }
    }

    /// Marker color as a CSS hex string.
    pub fn color(self) -> &'static str {
        match self {
            Category::CulturalEvent => "#E03131",
            Category::Library => "#1971C2",
            Category::CulturalSpace => "#2F9E44",
            Category::PublicReservation => "#F76707",
            Category::FutureHeritage => "#7048E8",
        }
    }

    /// Maps a backend table or data-source name to a category.
    ///
    /// Unrecognised names fall back to [`Category::CulturalEvent`], which is
    /// what the backend's untagged event feed uses.
    pub fn from_source(source: &str) -> Category {
        match source {
            "libraries" | "library" => Category::Library,
            "cultural_spaces" => Category::CulturalSpace,
            "public_reservations" => Category::PublicReservation,
            "future_heritage" => Category::FutureHeritage,
            _ => Category::CulturalEvent,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    /// Strict parse of a wire name; use [`Category::from_source`] for backend
    /// table names.
    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

/// A set of categories, stored as a bitmask over [`Category::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CategorySet(u8);

impl CategorySet {
    /// All categories selected.
    pub fn all() -> Self {
        Category::ALL.into_iter().collect()
    }

    /// No categories selected.
    pub fn none() -> Self {
        Self(0)
    }

    /// Returns true if `category` is in the set.
    #[inline]
    pub fn contains(&self, category: Category) -> bool {
        self.0 & (1 << category.index()) != 0
    }

    /// Adds a category.
    pub fn insert(&mut self, category: Category) {
        self.0 |= 1 << category.index();
    }

    /// Removes a category.
    pub fn remove(&mut self, category: Category) {
        self.0 &= !(1 << category.index());
    }

    /// Flips membership of one category.
    pub fn toggle(&mut self, category: Category) {
        self.0 ^= 1 << category.index();
    }

    /// Everything selected becomes nothing; anything else becomes everything.
    pub fn toggle_all(&mut self) {
        *self = if self.is_all() { Self::none() } else { Self::all() };
    }

    /// Returns true when no category is selected.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns true when every category is selected.
    pub fn is_all(&self) -> bool {
        *self == Self::all()
    }

    /// Number of selected categories.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Selected categories in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = Self::none();
        for category in iter {
            set.insert(category);
        }
        set
    }
}
