//! Greedy single-seed clustering.
//!
//! Entities are visited in input order. Each unvisited entity seeds a cluster
//! made of itself and every still-unvisited entity within the threshold of
//! the seed. Membership is not transitive: two entities can both be close to
//! a third and still land in different clusters, depending on which one is
//! visited first.

use crate::error::{ClusterError, Result};
use seoul_services_catalog::{Category, LocatedEntity};
use seoul_services_geo::{haversine_meters, Coordinate};
use serde::Serialize;
use tracing::debug;

/// A group of nearby entities drawn as one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Member ids joined with `-`, in encounter order. [`crate::ClusterSet`]
    /// suffixes it if it collides with another marker id.
    pub id: String,
    /// Members, never empty
    pub members: Vec<LocatedEntity>,
    /// Arithmetic mean of member latitudes and longitudes
    pub position: Coordinate,
}

impl Cluster {
    fn from_members(members: Vec<LocatedEntity>) -> Self {
        let id = members
            .iter()
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
            .join("-");
        let position = mean_position(&members);
        Self { id, members, position }
    }

    /// True when the cluster has more than one member.
    #[inline]
    pub fn is_cluster(&self) -> bool {
        self.members.len() > 1
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; clusters are never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Most common member category.
    pub fn dominant_category(&self) -> Category {
        dominant_category(&self.members).unwrap_or(Category::CulturalEvent)
    }

    /// Returns true if `entity_id` is a member.
    pub fn contains(&self, entity_id: &str) -> bool {
        self.members.iter().any(|m| m.id == entity_id)
    }
}

/// Groups `entities` into clusters.
///
/// A threshold of exactly 0 disables clustering: every entity becomes its own
/// singleton at its own position. Coordinates must already be valid; records
/// with bad positions are filtered out before they reach this point.
///
/// # Errors
/// Returns [`ClusterError::InvalidThreshold`] for a negative or non-finite
/// threshold.
///
/// # Example
/// ```
/// use seoul_services_catalog::{Category, LocatedEntity};
/// use seoul_services_cluster::cluster;
/// use seoul_services_geo::Coordinate;
///
/// let entities = vec![
///     LocatedEntity::bare("lib-1", Category::Library, "A", Coordinate::new(37.5665, 126.978)),
///     LocatedEntity::bare("lib-2", Category::Library, "B", Coordinate::new(37.5672, 126.9788)),
/// ];
/// let clusters = cluster(&entities, 1000.0).unwrap();
/// assert_eq!(clusters.len(), 1);
/// assert!(clusters[0].is_cluster());
/// ```
pub fn cluster(entities: &[LocatedEntity], threshold_m: f64) -> Result<Vec<Cluster>> {
    if !threshold_m.is_finite() || threshold_m < 0.0 {
        return Err(ClusterError::InvalidThreshold(threshold_m));
    }

    if threshold_m == 0.0 {
        return Ok(entities
            .iter()
            .map(|e| Cluster::from_members(vec![e.clone()]))
            .collect());
    }

    let mut visited = vec![false; entities.len()];
    let mut clusters = Vec::new();

    for (i, seed) in entities.iter().enumerate() {
        if visited[i] {
            continue;
        }

        let mut members = Vec::new();
        for (j, candidate) in entities.iter().enumerate() {
            if visited[j] {
                continue;
            }
            if haversine_meters(&seed.coordinate, &candidate.coordinate) <= threshold_m {
                visited[j] = true;
                members.push(candidate.clone());
            }
        }

        clusters.push(Cluster::from_members(members));
    }

    debug!(
        entities = entities.len(),
        clusters = clusters.len(),
        threshold_m,
        "Clustered entities"
    );
    Ok(clusters)
}

/// Category with the strictly highest count among `members`.
///
/// Categories are tallied in canonical order, so on a tie the one declared
/// first wins. Returns `None` for an empty slice.
pub fn dominant_category(members: &[LocatedEntity]) -> Option<Category> {
    if members.is_empty() {
        return None;
    }

    let mut counts = [0usize; Category::ALL.len()];
    for member in members {
        counts[member.category().index()] += 1;
    }

    let mut best: Option<(Category, usize)> = None;
    for category in Category::ALL {
        let count = counts[category.index()];
        if best.is_none_or(|(_, max)| count > max) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category)
}

fn mean_position(members: &[LocatedEntity]) -> Coordinate {
    let n = members.len() as f64;
    let (lat, lon) = members.iter().fold((0.0, 0.0), |(lat, lon), m| {
        (lat + m.coordinate.latitude, lon + m.coordinate.longitude)
    });
    Coordinate::new(lat / n, lon / n)
}
