//! Marker clustering for the Seoul services map.
//!
//! This crate provides:
//! - Greedy distance-threshold clustering of located entities
//! - Dominant-category selection with a deterministic tie-break
//! - Marker descriptors and id lookups for the map renderer
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use seoul_services_catalog::{Category, LocatedEntity};
//! use seoul_services_cluster::ClusterSet;
//! use seoul_services_geo::Coordinate;
//!
//! let entities = vec![
//!     LocatedEntity::bare("lib-1", Category::Library, "A", Coordinate::new(37.5665, 126.978)),
//!     LocatedEntity::bare("evt-1", Category::CulturalEvent, "B", Coordinate::new(37.60, 127.05)),
//! ];
//! let set = ClusterSet::build(&entities, 500.0).unwrap();
//! assert!(set.standalone("lib-1").is_some());
//! ```

mod engine;
mod error;
mod markers;

#[cfg(feature = "wasm")]
mod wasm;

pub use engine::{cluster, dominant_category, Cluster};
pub use error::{ClusterError, ClusterErrorCode, Result};
pub use markers::{
    zoom_in_target, ClusterSet, MarkerDescriptor, ZoomTarget, CLUSTER_ZOOM_STEP, MIN_ZOOM_LEVEL,
};

/// Threshold used by the map view unless configured otherwise.
pub const DEFAULT_THRESHOLD_M: f64 = 500.0;
