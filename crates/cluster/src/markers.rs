//! Marker descriptors and lookups over one clustering result.

use crate::engine::{cluster, Cluster};
use crate::error::Result;
use seoul_services_catalog::{Category, LocatedEntity};
use seoul_services_geo::Coordinate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Closest zoom level the map supports. Lower levels are closer.
pub const MIN_ZOOM_LEVEL: u8 = 1;

/// How many levels a cluster click zooms in.
pub const CLUSTER_ZOOM_STEP: u8 = 2;

/// What the map renderer needs to place one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    /// Cluster id; for a singleton this equals the entity id
    pub id: String,
    pub position: Coordinate,
    pub is_cluster: bool,
    /// Member category for a singleton, dominant category for a cluster
    pub category: Category,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl MarkerDescriptor {
    /// Describes one cluster.
    pub fn for_cluster(cluster: &Cluster) -> Self {
        let category = cluster.dominant_category();
        let (label, member_count, entity_id) = if cluster.is_cluster() {
            (Some(category.label()), Some(cluster.len()), None)
        } else {
            (None, None, cluster.members.first().map(|m| m.id.clone()))
        };

        Self {
            id: cluster.id.clone(),
            position: cluster.position,
            is_cluster: cluster.is_cluster(),
            category,
            color: category.color(),
            label,
            member_count,
            entity_id,
        }
    }
}

/// Where the map should move after a cluster click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomTarget {
    pub center: Coordinate,
    pub level: u8,
}

/// Centers on `cluster` and zooms in by [`CLUSTER_ZOOM_STEP`] levels, never
/// past [`MIN_ZOOM_LEVEL`].
pub fn zoom_in_target(cluster: &Cluster, current_level: u8) -> ZoomTarget {
    ZoomTarget {
        center: cluster.position,
        level: current_level
            .saturating_sub(CLUSTER_ZOOM_STEP)
            .max(MIN_ZOOM_LEVEL),
    }
}

/// A complete clustering result with lookups by entity and cluster id.
///
/// Built in one go from an entity snapshot and never updated in place.
#[derive(Debug, Clone, Default)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
    threshold_m: f64,
    by_entity: HashMap<String, usize>,
    by_cluster: HashMap<String, usize>,
}

impl ClusterSet {
    /// Clusters `entities` and indexes the result.
    pub fn build(entities: &[LocatedEntity], threshold_m: f64) -> Result<Self> {
        Ok(Self::from_clusters(cluster(entities, threshold_m)?, threshold_m))
    }

    /// Indexes an existing clustering result.
    ///
    /// Joined member ids can collide with each other or with an entity id
    /// (`a` + `b` and a singleton `a-b`). Singletons keep their entity id;
    /// a colliding multi-member cluster gets `#2`, `#3`, ... appended, so
    /// every marker id resolves to exactly one cluster.
    pub fn from_clusters(mut clusters: Vec<Cluster>, threshold_m: f64) -> Self {
        let mut by_entity = HashMap::new();
        let mut by_cluster = HashMap::with_capacity(clusters.len());

        let singletons_first = (0..clusters.len()).filter(|&i| !clusters[i].is_cluster());
        let groups = (0..clusters.len()).filter(|&i| clusters[i].is_cluster());
        let order: Vec<usize> = singletons_first.chain(groups).collect();

        for i in order {
            let cluster = &mut clusters[i];
            if by_cluster.contains_key(&cluster.id) {
                let mut n = 2;
                let unique = loop {
                    let candidate = format!("{}#{n}", cluster.id);
                    if !by_cluster.contains_key(&candidate) {
                        break candidate;
                    }
                    n += 1;
                };
                debug!(id = %cluster.id, renamed = %unique, "Cluster id collides, renaming");
                cluster.id = unique;
            }
            by_cluster.insert(cluster.id.clone(), i);
            for member in &cluster.members {
                by_entity.insert(member.id.clone(), i);
            }
        }

        Self {
            clusters,
            threshold_m,
            by_entity,
            by_cluster,
        }
    }

    /// Every cluster, in emission order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Threshold the set was built with.
    pub fn threshold_m(&self) -> f64 {
        self.threshold_m
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Marker descriptors for the renderer, one per cluster.
    pub fn markers(&self) -> Vec<MarkerDescriptor> {
        self.clusters.iter().map(MarkerDescriptor::for_cluster).collect()
    }

    /// Cluster by its id.
    pub fn get(&self, cluster_id: &str) -> Option<&Cluster> {
        self.by_cluster.get(cluster_id).map(|&i| &self.clusters[i])
    }

    /// The cluster that holds `entity_id`, singleton or not.
    pub fn cluster_of(&self, entity_id: &str) -> Option<&Cluster> {
        self.by_entity.get(entity_id).map(|&i| &self.clusters[i])
    }

    /// The singleton marker for `entity_id`, or `None` if the entity is
    /// absent or absorbed into a multi-member cluster.
    pub fn standalone(&self, entity_id: &str) -> Option<&Cluster> {
        self.cluster_of(entity_id).filter(|c| !c.is_cluster())
    }

    /// The entity with `entity_id`.
    pub fn entity(&self, entity_id: &str) -> Option<&LocatedEntity> {
        self.cluster_of(entity_id)?
            .members
            .iter()
            .find(|m| m.id == entity_id)
    }
}
