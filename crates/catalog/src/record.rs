//! Tolerant parsing of backend service records.
//!
//! The backend returns rows from several source tables with inconsistent
//! column names, numbers sometimes encoded as strings and some fields nested
//! under `raw_data`. A record that cannot be placed on the map is dropped and
//! logged; it never fails the whole response.

use crate::category::Category;
use crate::details::{
    Details, EventDetails, HeritageDetails, LibraryDetails, ReservationDetails, SpaceDetails,
};
use crate::entity::LocatedEntity;
use crate::error::{CatalogError, Result};
use seoul_services_geo::Coordinate;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

const ID_KEYS: &[&str] = &["id", "api_id"];
const CATEGORY_KEYS: &[&str] = &["_table", "data_source", "category"];
const NAME_KEYS: &[&str] = &["title", "name", "lbrry_name", "fac_name", "svcnm"];
const LATITUDE_KEYS: &[&str] = &["lat", "latitude", "y"];
const LONGITUDE_KEYS: &[&str] = &["lon", "longitude", "lot", "x"];
const ADDRESS_KEYS: &[&str] = &["address", "adres", "addr"];
const NESTED_KEY: &str = "raw_data";

/// A record that was left out of the working set.
#[derive(Debug)]
pub struct DroppedRecord {
    /// Position in the response array
    pub index: usize,
    /// Why it was dropped
    pub error: CatalogError,
}

/// Outcome of parsing a batch of records.
#[derive(Debug, Default)]
pub struct ParsedRecords {
    /// Records that became entities, in response order
    pub entities: Vec<LocatedEntity>,
    /// Records that were filtered out
    pub dropped: Vec<DroppedRecord>,
}

/// Parses every record, keeping the good ones and logging the rest.
pub fn parse_records(records: &[Value]) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();

    for (index, record) in records.iter().enumerate() {
        match parse_record(record) {
            Ok(entity) => parsed.entities.push(entity),
            Err(error) => {
                warn!(index, error = %error, "Dropping service record");
                parsed.dropped.push(DroppedRecord { index, error });
            }
        }
    }

    debug!(
        kept = parsed.entities.len(),
        dropped = parsed.dropped.len(),
        "Parsed service records"
    );
    parsed
}

/// Parses one backend record into an entity.
pub fn parse_record(record: &Value) -> Result<LocatedEntity> {
    let object = record
        .as_object()
        .ok_or_else(|| CatalogError::InvalidRecord(format!("expected object, got {}", kind(record))))?;
    let mut fields = Fields::new(object);

    let id = fields.text(ID_KEYS).ok_or(CatalogError::MissingField("id"))?;
    let category = fields
        .text(CATEGORY_KEYS)
        .map(|source| Category::from_source(&source))
        .unwrap_or(Category::CulturalEvent);
    let name = fields.text(NAME_KEYS).ok_or(CatalogError::MissingField("name"))?;

    let latitude = fields.number(LATITUDE_KEYS);
    let longitude = fields.number(LONGITUDE_KEYS);
    let coordinate = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        _ => {
            return Err(CatalogError::InvalidCoordinate(format!(
                "{id}: missing latitude or longitude"
            )));
        }
    };
    if !coordinate.is_valid() {
        return Err(CatalogError::InvalidCoordinate(format!(
            "{id}: ({}, {})",
            coordinate.latitude, coordinate.longitude
        )));
    }

    let address = fields.text(ADDRESS_KEYS);
    let details = parse_details(category, &mut fields);

    let mut entity = LocatedEntity::new(id, name, coordinate, details);
    entity.address = address;
    Ok(entity)
}

fn parse_details(category: Category, f: &mut Fields<'_>) -> Details {
    match category {
        Category::CulturalEvent => {
            let mut d = EventDetails {
                district: f.text(&["guname"]),
                place: f.text(&["place"]),
                organizer: f.text(&["org_name"]),
                start_date: f.text(&["strtdate", "start_date"]),
                end_date: f.text(&["end_date"]),
                target: f.text(&["use_trgt"]),
                fee: f.text(&["use_fee"]),
                is_free: f.text(&["is_free"]),
                program: f.text(&["program"]),
                homepage: f.text(&["hmpg_addr", "org_link"]),
                image: f.text(&["main_img"]),
                ..Default::default()
            };
            d.extra = f.leftovers();
            Details::CulturalEvent(d)
        }
        Category::Library => {
            let mut d = LibraryDetails {
                district: f.text(&["guname", "region"]),
                phone: f.text(&["tel_no", "tel"]),
                homepage: f.text(&["homepage", "hmpg_addr"]),
                hours: f.text(&["opertime", "operTime", "weekday_optime"]),
                closed_days: f.text(&["closing_day", "close_day", "closeDay"]),
                library_type: f.text(&["libraty_type", "code_value", "lbrry_se_name"]),
                ..Default::default()
            };
            d.extra = f.leftovers();
            Details::Library(d)
        }
        Category::CulturalSpace => {
            let mut d = SpaceDetails {
                subject: f.text(&["subjcode", "codename"]),
                district: f.text(&["region", "guname"]),
                phone: f.text(&["tel_no", "tel"]),
                homepage: f.text(&["homepage", "hmpg_addr"]),
                hours: f.text(&["openTime", "open_time"]),
                fee: f.text(&["fee", "adm_fee"]),
                is_free: f.text(&["is_free", "fee_use_yn"]),
                closed_days: f.text(&["close_day", "closeDay"]),
                description: f.text(&["intro", "description"]),
                ..Default::default()
            };
            d.extra = f.leftovers();
            Details::CulturalSpace(d)
        }
        Category::PublicReservation => {
            let mut d = ReservationDetails {
                major_class: f.text(&["maxclassname", "category1"]),
                minor_class: f.text(&["minclassname", "category2"]),
                status: f.text(&["svcstatnm", "status"]),
                payment: f.text(&["payatnm"]),
                fee: f.text(&["rcptcost"]),
                place: f.text(&["placenm", "place"]),
                target: f.text(&["usetgtinfo", "target"]),
                url: f.text(&["svcurl", "homepage"]),
                service_open_begin: f.text(&["svcopnbgndt"]),
                service_open_end: f.text(&["svcopnenddt"]),
                receipt_begin: f.text(&["rcptbgndt", "start_date"]),
                receipt_end: f.text(&["rcptenddt", "end_date"]),
                district: f.text(&["areanm", "guname"]),
                description: f.text(&["dtlcont", "description"]),
                phone: f.text(&["telno", "tel"]),
                image: f.text(&["imgurl"]),
                ..Default::default()
            };
            d.extra = f.leftovers();
            Details::PublicReservation(d)
        }
        Category::FutureHeritage => {
            let mut d = HeritageDetails {
                district: f.text(&["location", "guname"]),
                classification: f.text(&["classification", "category_nm", "category_name"]),
                main_category: f.text(&["large_category", "main_category"]),
                sub_category: f.text(&["medium_category", "sub_category"]),
                history: f.text(&["history", "background"]),
                preservation: f.text(&["preservation_necessity", "reason"]),
                description: f.text(&["description", "content"]),
                parking: f.text(&["parking_available", "parking_yn"]),
                parking_capacity: f.text(&["parking_capacity", "parking_cnt"]),
                parking_fee: f.text(&["parking_fee", "parking_cost"]),
                parking_hours: f.text(&["parking_hours", "parking_time"]),
                image: f.text(&["main_img", "image_path", "img_url"]),
                ..Default::default()
            };
            d.extra = f.leftovers();
            Details::FutureHeritage(d)
        }
    }
}

/// Key lookup over a record and its optional nested `raw_data` object,
/// remembering which keys have been consumed.
struct Fields<'a> {
    top: &'a Map<String, Value>,
    nested: Option<&'a Map<String, Value>>,
    used: HashSet<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(top: &'a Map<String, Value>) -> Self {
        let nested = top.get(NESTED_KEY).and_then(Value::as_object);
        let mut used = HashSet::new();
        used.insert(NESTED_KEY);
        Self { top, nested, used }
    }

    /// First key, in priority order, holding a usable value. Top-level keys
    /// win over the nested object for the same key.
    fn lookup(&mut self, keys: &[&str]) -> Option<(&'a str, &'a Value)> {
        let (top, nested) = (self.top, self.nested);
        let found = keys.iter().find_map(|key| {
            let value = top
                .get_key_value(*key)
                .filter(|(_, v)| is_present(v))
                .or_else(|| nested?.get_key_value(*key).filter(|(_, v)| is_present(v)));
            value.map(|(k, v)| (k.as_str(), v))
        });
        if let Some((key, _)) = found {
            self.used.insert(key);
        }
        found
    }

    fn text(&mut self, keys: &[&str]) -> Option<String> {
        let (_, value) = self.lookup(keys)?;
        match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn number(&mut self, keys: &[&str]) -> Option<f64> {
        let (_, value) = self.lookup(keys)?;
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Everything not consumed so far, top-level keys first.
    fn leftovers(&self) -> Map<String, Value> {
        let mut extra = Map::new();
        let nested = self.nested.into_iter().flatten();
        for (key, value) in self.top.iter().chain(nested) {
            if self.used.contains(key.as_str()) || extra.contains_key(key) {
                continue;
            }
            extra.insert(key.clone(), value.clone());
        }
        extra
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
