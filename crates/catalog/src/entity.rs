//! Located entities: one discoverable point of interest each.

use crate::category::Category;
use crate::details::Details;
use crate::error::{CatalogError, Result};
use seoul_services_geo::{annotate_distances, Coordinate, Positioned};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point of interest with a category, a position and display metadata.
///
/// The category is always the category of `details`; the two cannot
/// disagree because the category is derived when the entity is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntityRepr")]
pub struct LocatedEntity {
    /// Identifier, unique within one result set
    pub id: String,
    category: Category,
    /// Display name
    pub name: String,
    /// WGS84 position
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Free-text address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Meters from the current reference point, when one is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    details: Details,
}

impl LocatedEntity {
    /// Builds an entity; its category comes from `details`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        coordinate: Coordinate,
        details: Details,
    ) -> Self {
        Self {
            id: id.into(),
            category: details.category(),
            name: name.into(),
            coordinate,
            address: None,
            distance: None,
            details,
        }
    }

    /// Builds an entity with an empty payload for `category`.
    pub fn bare(
        id: impl Into<String>,
        category: Category,
        name: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        Self::new(id, name, coordinate, Details::empty(category))
    }

    /// Sets the address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the distance.
    pub fn with_distance(mut self, distance: Option<f64>) -> Self {
        self.distance = distance;
        self
    }

    /// Category tag.
    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Category-specific payload.
    #[inline]
    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Start date used for date ordering, if the category has one.
    pub fn start_date(&self) -> Option<&str> {
        self.details.start_date()
    }
}

impl Positioned for LocatedEntity {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// Returns copies of `entities` with distances measured from `reference`.
///
/// Without a reference point every distance is cleared, so stale values from
/// an earlier reference never survive.
pub fn with_distances(entities: &[LocatedEntity], reference: Option<&Coordinate>) -> Vec<LocatedEntity> {
    annotate_distances(reference, entities)
        .into_iter()
        .zip(entities)
        .map(|(distance, entity)| entity.clone().with_distance(distance))
        .collect()
}

/// Serialized shape: flat fields plus an untagged `details` object.
#[derive(Deserialize)]
struct EntityRepr {
    id: String,
    category: Category,
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    details: Option<Value>,
}

impl TryFrom<EntityRepr> for LocatedEntity {
    type Error = CatalogError;

    fn try_from(repr: EntityRepr) -> Result<Self> {
        if repr.id.trim().is_empty() {
            return Err(CatalogError::MissingField("id"));
        }
        let coordinate = Coordinate::new(repr.latitude, repr.longitude);
        if !coordinate.is_valid() {
            return Err(CatalogError::InvalidCoordinate(format!(
                "{}: ({}, {})",
                repr.id, repr.latitude, repr.longitude
            )));
        }

        let details = Details::from_value(repr.category, repr.details)?;
        let mut entity = LocatedEntity::new(repr.id, repr.name, coordinate, details);
        entity.address = repr.address;
        entity.distance = repr.distance;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::EventDetails;
    use serde_json::json;

    #[test]
    fn test_category_follows_details() {
        let entity = LocatedEntity::new(
            "evt-1",
            "Jazz Night",
            Coordinate::new(37.5665, 126.978),
            Details::CulturalEvent(EventDetails::default()),
        );
        assert_eq!(entity.category(), Category::CulturalEvent);
    }

    #[test]
    fn test_json_shape() {
        let entity = LocatedEntity::bare("lib-1", Category::Library, "Seoul Library", Coordinate::new(37.5665, 126.978))
            .with_address("110 Sejong-daero");
        let value = serde_json::to_value(&entity).unwrap();

        assert_eq!(value["category"], json!("libraries"));
        assert_eq!(value["latitude"], json!(37.5665));
        assert_eq!(value["address"], json!("110 Sejong-daero"));
        assert!(value.get("distance").is_none());

        let back: LocatedEntity = serde_json::from_value(value).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_deserialize_rejects_bad_coordinate() {
        let value = json!({"id": "x", "category": "libraries", "name": "x", "latitude": 137.0, "longitude": 126.9});
        assert!(serde_json::from_value::<LocatedEntity>(value).is_err());
    }

    #[test]
    fn test_with_distances() {
        let entities = vec![
            LocatedEntity::bare("a", Category::Library, "A", Coordinate::new(37.5665, 126.978)),
            LocatedEntity::bare("b", Category::Library, "B", Coordinate::new(37.498, 127.0276)),
        ];
        let reference = Coordinate::new(37.5665, 126.978);

        let annotated = with_distances(&entities, Some(&reference));
        assert_eq!(annotated[0].distance, Some(0.0));
        assert!(annotated[1].distance.unwrap() > 8000.0);
        assert!(entities[1].distance.is_none());

        let cleared = with_distances(&annotated, None);
        assert!(cleared.iter().all(|e| e.distance.is_none()));
    }
}
