//! Typed model of Seoul public services.
//!
//! This crate provides:
//! - The closed [`Category`] set with labels and marker colors
//! - [`LocatedEntity`] with a per-category [`Details`] payload
//! - Tolerant parsing of loosely typed backend records
//! - Detail overlay rows for display
//!
//! # Example
//!
//! ```
//! use seoul_services_catalog::{parse_record, Category};
//! use serde_json::json;
//!
//! let record = json!({"id": "lib-1", "_table": "libraries", "lbrry_name": "Seoul Library",
//!                     "lat": "37.5665", "lon": 126.978});
//! let entity = parse_record(&record).unwrap();
//! assert_eq!(entity.category(), Category::Library);
//! ```

mod category;
mod details;
mod display;
mod entity;
mod error;
mod record;

pub use category::{Category, CategorySet};
pub use details::{
    Details, EventDetails, HeritageDetails, LibraryDetails, ReservationDetails, SpaceDetails,
};
pub use display::{detail_rows, DetailRow, OverlayContent, RowValue};
pub use entity::{with_distances, LocatedEntity};
pub use error::{CatalogError, CatalogErrorCode, Result};
pub use record::{parse_record, parse_records, DroppedRecord, ParsedRecords};
