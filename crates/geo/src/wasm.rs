//! WASM bindings for the geo crate.
//!
//! These bindings let the map front end compute and format distances in the
//! browser without a round trip to the backend.

use crate::{batch::LocationItem, calculate_distances, Coordinate};
use wasm_bindgen::prelude::*;

fn reference(lat: f64, lng: f64) -> Option<Coordinate> {
    let coord = Coordinate::new(lat, lng);
    coord.is_valid().then_some(coord)
}

/// Distance in meters between two coordinates.
#[wasm_bindgen]
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> Result<f64, JsValue> {
    let from = Coordinate::new(lat1, lng1);
    let to = Coordinate::new(lat2, lng2);
    crate::distance(&from, &to).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format a distance in meters as `"123m"` or `"1.2km"`.
#[wasm_bindgen(js_name = formatDistance)]
pub fn format_distance(meters: f64) -> Result<String, JsValue> {
    crate::format_distance(meters).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Calculate distances from a reference point to many items.
///
/// # Arguments
/// * `ref_lat` / `ref_lng` - Reference point; pass NaN when unknown
/// * `items_json` - JSON array of `{id, latitude, longitude}`
///
/// # Returns
/// JSON array of `{id, distance}` with `distance: null` when unknown
#[wasm_bindgen(js_name = calculateDistances)]
pub fn calculate_distances_json(ref_lat: f64, ref_lng: f64, items_json: &str) -> Result<String, JsValue> {
    let items: Vec<LocationItem> = serde_json::from_str(items_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;

    let reference = reference(ref_lat, ref_lng);
    let results = calculate_distances(reference.as_ref(), &items);

    serde_json::to_string(&results)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}

/// Batch distance calculation, closest first with unknown distances last.
///
/// `max_results` of 0 returns every item.
#[wasm_bindgen(js_name = calculateDistancesSorted)]
pub fn calculate_distances_sorted(
    ref_lat: f64,
    ref_lng: f64,
    items_json: &str,
    max_results: u32,
) -> Result<String, JsValue> {
    let items: Vec<LocationItem> = serde_json::from_str(items_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;

    let reference = reference(ref_lat, ref_lng);
    let max = if max_results == 0 { None } else { Some(max_results as usize) };
    let results = crate::batch::calculate_distances_sorted(reference.as_ref(), &items, max);

    serde_json::to_string(&results)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}
