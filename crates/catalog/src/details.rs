//! Category-specific payloads.
//!
//! Every category has a fixed set of known display fields. Anything else the
//! backend sends is kept verbatim in `extra` so it can still be shown.

use crate::category::Category;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cultural event fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    /// Start date, ISO-like string (`2025-03-01` or `2025-03-01 00:00:00.0`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_free: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Public library fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_days: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_type: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Cultural space fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_free: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_days: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Public reservation fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Service opening date, used for date ordering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_open_begin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_open_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_begin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Future heritage fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeritageDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preservation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `Y`/`N` flag as delivered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_capacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Payload of a located entity, one variant per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Details {
    CulturalEvent(EventDetails),
    Library(LibraryDetails),
    CulturalSpace(SpaceDetails),
    PublicReservation(ReservationDetails),
    FutureHeritage(HeritageDetails),
}

impl Details {
    /// A payload with no known fields set.
    pub fn empty(category: Category) -> Self {
        match category {
            Category::CulturalEvent => Details::CulturalEvent(EventDetails::default()),
            Category::Library => Details::Library(LibraryDetails::default()),
            Category::CulturalSpace => Details::CulturalSpace(SpaceDetails::default()),
            Category::PublicReservation => {
                Details::PublicReservation(ReservationDetails::default())
            }
            Category::FutureHeritage => Details::FutureHeritage(HeritageDetails::default()),
        }
    }

    /// Deserializes the payload for `category` from an untagged JSON object.
    ///
    /// `None` or `null` yields [`Details::empty`].
    pub fn from_value(category: Category, value: Option<Value>) -> Result<Self> {
        let value = match value {
            None | Some(Value::Null) => return Ok(Self::empty(category)),
            Some(value) => value,
        };

        Ok(match category {
            Category::CulturalEvent => Details::CulturalEvent(serde_json::from_value(value)?),
            Category::Library => Details::Library(serde_json::from_value(value)?),
            Category::CulturalSpace => Details::CulturalSpace(serde_json::from_value(value)?),
            Category::PublicReservation => {
                Details::PublicReservation(serde_json::from_value(value)?)
            }
            Category::FutureHeritage => Details::FutureHeritage(serde_json::from_value(value)?),
        })
    }

    /// The category this payload belongs to.
    pub fn category(&self) -> Category {
        match self {
            Details::CulturalEvent(_) => Category::CulturalEvent,
            Details::Library(_) => Category::Library,
            Details::CulturalSpace(_) => Category::CulturalSpace,
            Details::PublicReservation(_) => Category::PublicReservation,
            Details::FutureHeritage(_) => Category::FutureHeritage,
        }
    }

    /// Start date used for date ordering: an event's start date or a
    /// reservation's service opening date. Empty strings count as absent.
    pub fn start_date(&self) -> Option<&str> {
        let date = match self {
            Details::CulturalEvent(d) => d.start_date.as_deref(),
            Details::PublicReservation(d) => d.service_open_begin.as_deref(),
            _ => None,
        };
        date.filter(|d| !d.is_empty())
    }

    /// Pass-through attributes the typed schema does not cover.
    pub fn extra(&self) -> &Map<String, Value> {
        match self {
            Details::CulturalEvent(d) => &d.extra,
            Details::Library(d) => &d.extra,
            Details::CulturalSpace(d) => &d.extra,
            Details::PublicReservation(d) => &d.extra,
            Details::FutureHeritage(d) => &d.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_matches_category() {
        for category in Category::ALL {
            assert_eq!(Details::empty(category).category(), category);
        }
    }

    #[test]
    fn test_from_value_keeps_unknown_fields() {
        let value = json!({"phone": "02-120", "hours": "09:00-18:00", "extra": {"book_co": 12000}});
        let details = Details::from_value(Category::Library, Some(value)).unwrap();

        let Details::Library(library) = &details else {
            panic!("expected library details");
        };
        assert_eq!(library.phone.as_deref(), Some("02-120"));
        assert_eq!(details.extra()["book_co"], json!(12000));
    }

    #[test]
    fn test_start_date() {
        let event = Details::CulturalEvent(EventDetails {
            start_date: Some("2025-05-01".into()),
            ..Default::default()
        });
        assert_eq!(event.start_date(), Some("2025-05-01"));

        let reservation = Details::PublicReservation(ReservationDetails {
            service_open_begin: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(reservation.start_date(), None);

        assert_eq!(Details::empty(Category::Library).start_date(), None);
    }

    #[test]
    fn test_untagged_serialization() {
        let details = Details::Library(LibraryDetails {
            phone: Some("02-120".into()),
            ..Default::default()
        });
        assert_eq!(serde_json::to_value(&details).unwrap(), json!({"phone": "02-120"}));
    }
}
