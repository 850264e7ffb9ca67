//! Category filtering and list ordering.

use crate::collation::korean_cmp;
use crate::error::SearchError;
use seoul_services_catalog::{CategorySet, LocatedEntity};
use seoul_services_geo::batch::compare_known_first;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// List ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Closest first; unknown distances last
    #[default]
    Distance,
    /// Korean collation on the display name
    Name,
    /// Newest start date first, falling back to name
    Date,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Distance => "distance",
            SortBy::Name => "name",
            SortBy::Date => "date",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(SortBy::Distance),
            "name" => Ok(SortBy::Name),
            "date" => Ok(SortBy::Date),
            other => Err(SearchError::InvalidSortKey(other.to_string())),
        }
    }
}

/// Keeps the entities whose category is in `active` and orders them.
///
/// An empty `active` set yields an empty list. Entities that compare equal
/// keep their input order.
pub fn filter_and_sort(
    entities: &[LocatedEntity],
    active: &CategorySet,
    sort: SortBy,
) -> Vec<LocatedEntity> {
    let filtered: Vec<LocatedEntity> = entities
        .iter()
        .filter(|e| active.contains(e.category()))
        .cloned()
        .collect();

    match sort {
        SortBy::Distance => {
            let mut sorted = filtered;
            sorted.sort_by(|a, b| compare_known_first(a.distance, b.distance));
            sorted
        }
        SortBy::Name => {
            let mut sorted = filtered;
            sorted.sort_by(|a, b| korean_cmp(&a.name, &b.name));
            sorted
        }
        // The date rule is decided pair by pair and is not a total order on
        // mixed lists, so it goes through a merge sort that accepts that.
        SortBy::Date => merge_sort_by(filtered, &compare_date),
    }
}

/// Newest start date first when both entities have one, otherwise by name.
pub fn compare_date(a: &LocatedEntity, b: &LocatedEntity) -> Ordering {
    match (a.start_date(), b.start_date()) {
        (Some(da), Some(db)) => db.cmp(da),
        _ => korean_cmp(&a.name, &b.name),
    }
}

/// Stable top-down merge sort. Never panics on an inconsistent comparator.
fn merge_sort_by<T, F>(mut items: Vec<T>, cmp: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, cmp);
    let right = merge_sort_by(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use seoul_services_catalog::{Category, Details, EventDetails, ReservationDetails};
    use seoul_services_geo::Coordinate;

    fn entity(id: &str, category: Category, name: &str, distance: Option<f64>) -> LocatedEntity {
        LocatedEntity::bare(id, category, name, Coordinate::new(37.5665, 126.978)).with_distance(distance)
    }

    fn event(id: &str, name: &str, start: Option<&str>) -> LocatedEntity {
        let details = Details::CulturalEvent(EventDetails {
            start_date: start.map(String::from),
            ..Default::default()
        });
        LocatedEntity::new(id, name, Coordinate::new(37.5665, 126.978), details)
    }

    fn ids(entities: &[LocatedEntity]) -> Vec<&str> {
        entities.iter().map(|e| e.id.as_str()).collect()
    }

    fn sample() -> Vec<LocatedEntity> {
        vec![
            entity("a", Category::Library, "하늘도서관", Some(1200.0)),
            entity("b", Category::CulturalEvent, "가을음악회", None),
            entity("c", Category::Library, "나래도서관", Some(300.0)),
            entity("d", Category::FutureHeritage, "다리", Some(800.0)),
            entity("e", Category::CulturalSpace, "마당", None),
        ]
    }

    #[test]
    fn test_empty_category_set_yields_nothing() {
        assert!(filter_and_sort(&sample(), &CategorySet::none(), SortBy::Distance).is_empty());
    }

    #[test]
    fn test_filter_by_category() {
        let active: CategorySet = [Category::Library].into_iter().collect();
        let result = filter_and_sort(&sample(), &active, SortBy::Distance);
        assert_eq!(ids(&result), vec!["c", "a"]);
    }

    #[test]
    fn test_distance_unknown_last_and_stable() {
        let result = filter_and_sort(&sample(), &CategorySet::all(), SortBy::Distance);
        assert_eq!(ids(&result), vec!["c", "d", "a", "b", "e"]);
    }

    #[test]
    fn test_name_uses_korean_order() {
        let result = filter_and_sort(&sample(), &CategorySet::all(), SortBy::Name);
        assert_eq!(ids(&result), vec!["b", "c", "d", "e", "a"]);
    }

    #[test]
    fn test_date_newest_first() {
        let reservation = LocatedEntity::new(
            "r",
            "예약",
            Coordinate::new(37.5665, 126.978),
            Details::PublicReservation(ReservationDetails {
                service_open_begin: Some("2025-04-01".into()),
                ..Default::default()
            }),
        );
        let entities = vec![
            event("old", "봄 축제", Some("2025-03-01")),
            reservation,
            event("new", "여름 축제", Some("2025-06-15")),
        ];

        let result = filter_and_sort(&entities, &CategorySet::all(), SortBy::Date);
        assert_eq!(ids(&result), vec!["new", "r", "old"]);
    }

    #[test]
    fn test_date_falls_back_to_name() {
        let entities = vec![
            event("n2", "나", None),
            event("n1", "가", None),
            entity("lib", Category::Library, "다", None),
        ];
        let result = filter_and_sort(&entities, &CategorySet::all(), SortBy::Date);
        assert_eq!(ids(&result), vec!["n1", "n2", "lib"]);
    }

    #[test]
    fn test_date_tolerates_inconsistent_pairs() {
        // Dated entries compare by date, mixed pairs by name: a cycle.
        let entities = vec![
            event("z", "하", Some("2025-01-01")),
            entity("m", Category::Library, "마", None),
            event("a", "가", Some("2024-01-01")),
        ];
        let result = filter_and_sort(&entities, &CategorySet::all(), SortBy::Date);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_sort_by_parse() {
        assert_eq!("Name".parse::<SortBy>().unwrap(), SortBy::Name);
        assert!("rating".parse::<SortBy>().is_err());
        assert_eq!(SortBy::default(), SortBy::Distance);
    }

    #[test]
    fn test_merge_sort_is_stable() {
        let items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        let sorted = merge_sort_by(items, &|x: &(i32, char), y: &(i32, char)| x.0.cmp(&y.0));
        assert_eq!(sorted, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c')]);
    }
}
