//! Incremental pagination and the list view state.

use crate::error::{Result, SearchError};
use crate::sort::{filter_and_sort, SortBy};
use seoul_services_catalog::{with_distances, Category, CategorySet, LocatedEntity};
use seoul_services_geo::Coordinate;
use tracing::debug;

/// Default number of entries per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Tracks how many pages of an already sorted list are showing.
///
/// Pages always cover a prefix of the list, so loading more only appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    pages: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pages: 1,
        }
    }
}

impl Paginator {
    /// Creates a paginator showing one page of `page_size` entries.
    pub fn new(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(SearchError::InvalidPageSize(page_size));
        }
        Ok(Self { page_size, pages: 1 })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages showing, starting at 1.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Number of entries showing out of `total`.
    pub fn visible_len(&self, total: usize) -> usize {
        total.min(self.pages.saturating_mul(self.page_size))
    }

    /// The showing prefix of `items`.
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible_len(items.len())]
    }

    /// True when `total` has entries past the showing prefix.
    pub fn has_more(&self, total: usize) -> bool {
        self.visible_len(total) < total
    }

    /// Shows one more page if there is anything left. Returns whether it did.
    pub fn load_more(&mut self, total: usize) -> bool {
        if !self.has_more(total) {
            return false;
        }
        self.pages += 1;
        true
    }

    /// Back to the first page.
    pub fn reset(&mut self) {
        self.pages = 1;
    }
}

/// The service list: entity snapshot, reference point, category filter,
/// ordering and pagination.
///
/// The filtered and sorted result is recomputed whenever an input changes.
/// Changing the filter or the ordering goes back to the first page; new data
/// or a new reference point keeps the current page count.
#[derive(Debug, Clone)]
pub struct ListView {
    entities: Vec<LocatedEntity>,
    reference: Option<Coordinate>,
    active: CategorySet,
    sort: SortBy,
    paginator: Paginator,
    results: Vec<LocatedEntity>,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new(Paginator::default())
    }
}

impl ListView {
    /// Empty list with every category selected, sorted by distance.
    pub fn new(paginator: Paginator) -> Self {
        Self {
            entities: Vec::new(),
            reference: None,
            active: CategorySet::all(),
            sort: SortBy::default(),
            paginator,
            results: Vec::new(),
        }
    }

    /// Replaces the entity snapshot.
    pub fn set_entities(&mut self, entities: Vec<LocatedEntity>) {
        self.entities = entities;
        self.recompute();
    }

    /// Sets or clears the reference point; distances are recomputed.
    pub fn set_reference(&mut self, reference: Option<Coordinate>) {
        self.reference = reference;
        self.recompute();
    }

    /// Replaces the category filter.
    pub fn set_categories(&mut self, active: CategorySet) {
        self.active = active;
        self.paginator.reset();
        self.recompute();
    }

    /// Flips one category.
    pub fn toggle_category(&mut self, category: Category) {
        let mut active = self.active;
        active.toggle(category);
        self.set_categories(active);
    }

    /// All selected becomes none; otherwise all.
    pub fn toggle_all(&mut self) {
        let mut active = self.active;
        active.toggle_all();
        self.set_categories(active);
    }

    /// Changes the ordering.
    pub fn set_sort(&mut self, sort: SortBy) {
        self.sort = sort;
        self.paginator.reset();
        self.recompute();
    }

    /// Shows one more page if available.
    pub fn load_more(&mut self) -> bool {
        self.paginator.load_more(self.results.len())
    }

    /// Entries currently showing.
    pub fn visible(&self) -> &[LocatedEntity] {
        self.paginator.visible(&self.results)
    }

    /// Whether more entries can be loaded.
    pub fn has_more(&self) -> bool {
        self.paginator.has_more(self.results.len())
    }

    /// Every filtered and sorted entry.
    pub fn results(&self) -> &[LocatedEntity] {
        &self.results
    }

    pub fn categories(&self) -> CategorySet {
        self.active
    }

    pub fn sort(&self) -> SortBy {
        self.sort
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    fn recompute(&mut self) {
        let annotated = with_distances(&self.entities, self.reference.as_ref());
        self.results = filter_and_sort(&annotated, &self.active, self.sort);
        debug!(
            total = self.entities.len(),
            matched = self.results.len(),
            sort = %self.sort,
            "Recomputed service list"
        );
    }
}
