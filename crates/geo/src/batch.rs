//! Batch distance calculations with optional parallelism.
//!
//! Distances are derived values: every call recomputes them from the current
//! reference point and returns fresh results instead of mutating the input.

use crate::{haversine_meters, Coordinate, Positioned};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Result of a distance calculation for a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// The item ID
    pub id: String,
    /// Distance in meters, `None` when it cannot be known
    pub distance: Option<f64>,
}

/// Input item for batch distance calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationItem {
    /// Item ID
    pub id: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Positioned for LocationItem {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Computes the distance from `reference` to each item, in input order.
///
/// Without a reference point every distance is `None`. Items whose coordinate
/// is not valid also get `None` rather than a NaN-laden value.
pub fn annotate_distances<T>(reference: Option<&Coordinate>, items: &[T]) -> Vec<Option<f64>>
where
    T: Positioned + Sync,
{
    let Some(reference) = reference.filter(|r| r.is_valid()) else {
        return vec![None; items.len()];
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items
            .par_iter()
            .map(|item| single_distance(reference, &item.coordinate()))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items
            .iter()
            .map(|item| single_distance(reference, &item.coordinate()))
            .collect()
    }
}

/// Calculate distances from a reference point to plain location items.
///
/// # Example
/// ```
/// use seoul_services_geo::{calculate_distances, Coordinate, LocationItem};
///
/// let items = vec![
///     LocationItem { id: "lib-1".into(), latitude: 37.5665, longitude: 126.978 },
///     LocationItem { id: "lib-3".into(), latitude: 37.5172, longitude: 127.0473 },
/// ];
///
/// let results = calculate_distances(Some(&Coordinate::new(37.5665, 126.978)), &items);
/// assert_eq!(results[0].distance, Some(0.0));
/// ```
pub fn calculate_distances(reference: Option<&Coordinate>, items: &[LocationItem]) -> Vec<DistanceResult> {
    annotate_distances(reference, items)
        .into_iter()
        .zip(items)
        .map(|(distance, item)| DistanceResult {
            id: item.id.clone(),
            distance,
        })
        .collect()
}

/// Calculate distances and return items sorted closest first.
///
/// Unknown distances go after every known one; the sort is stable.
pub fn calculate_distances_sorted(
    reference: Option<&Coordinate>,
    items: &[LocationItem],
    max_results: Option<usize>,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances(reference, items);
    results.sort_by(|a, b| compare_known_first(a.distance, b.distance));

    if let Some(max) = max_results {
        results.truncate(max);
    }

    results
}

/// Orders known distances ascending and puts unknown ones last.
pub fn compare_known_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[inline]
fn single_distance(reference: &Coordinate, coord: &Coordinate) -> Option<f64> {
    coord.is_valid().then(|| haversine_meters(reference, coord))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, latitude: f64, longitude: f64) -> LocationItem {
        LocationItem {
            id: id.to_string(),
            latitude,
            longitude,
        }
    }

    fn create_test_items() -> Vec<LocationItem> {
        vec![
            item("gangnam-lib", 37.5172, 127.0473),
            item("namsan-lib", 37.5672, 126.9788),
            item("coex-event", 37.5130, 127.0590),
            item("broken", f64::NAN, 126.978),
        ]
    }

    #[test]
    fn test_batch_distances() {
        let items = create_test_items();
        let reference = Coordinate::new(37.5665, 126.978);
        let results = calculate_distances(Some(&reference), &items);

        assert_eq!(results.len(), 4);

        let namsan = results.iter().find(|r| r.id == "namsan-lib").unwrap();
        assert!(namsan.distance.unwrap() < 200.0);

        let broken = results.iter().find(|r| r.id == "broken").unwrap();
        assert!(broken.distance.is_none());
    }

    #[test]
    fn test_no_reference_means_unknown() {
        let items = create_test_items();
        let results = calculate_distances(None, &items);
        assert!(results.iter().all(|r| r.distance.is_none()));
    }

    #[test]
    fn test_sorted_distances_unknown_last() {
        let items = create_test_items();
        let reference = Coordinate::new(37.5665, 126.978);
        let results = calculate_distances_sorted(Some(&reference), &items, None);

        assert_eq!(results[0].id, "namsan-lib");
        assert_eq!(results.last().unwrap().id, "broken");
        for window in results[..3].windows(2) {
            assert!(window[0].distance.unwrap() <= window[1].distance.unwrap());
        }
    }

    #[test]
    fn test_max_results() {
        let items = create_test_items();
        let reference = Coordinate::new(37.5665, 126.978);
        let results = calculate_distances_sorted(Some(&reference), &items, Some(2));

        assert_eq!(results.len(), 2);
    }
}
