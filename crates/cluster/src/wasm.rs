//! WASM bindings for the clustering engine.

use crate::ClusterSet;
use seoul_services_catalog::LocatedEntity;
use wasm_bindgen::prelude::*;

/// Cluster a JSON array of entities and return JSON marker descriptors.
///
/// # Arguments
/// * `entities_json` - JSON array of located entities
/// * `threshold_m` - Cluster threshold in meters; 0 disables clustering
#[wasm_bindgen(js_name = clusterMarkers)]
pub fn cluster_markers(entities_json: &str, threshold_m: f64) -> Result<String, JsValue> {
    let entities: Vec<LocatedEntity> = serde_json::from_str(entities_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;

    let set = ClusterSet::build(&entities, threshold_m).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&set.markers())
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}

/// Wire name of the dominant category of a JSON entity array, or an empty
/// string for an empty array.
#[wasm_bindgen(js_name = dominantCategory)]
pub fn dominant_category(entities_json: &str) -> Result<String, JsValue> {
    let entities: Vec<LocatedEntity> = serde_json::from_str(entities_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;

    Ok(crate::dominant_category(&entities)
        .map(|c| c.as_str().to_string())
        .unwrap_or_default())
}
