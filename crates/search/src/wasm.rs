//! WASM bindings for list filtering and sorting.

use seoul_services_catalog::{Category, CategorySet, LocatedEntity};
use wasm_bindgen::prelude::*;

/// Filter and sort a JSON entity array.
///
/// # Arguments
/// * `entities_json` - JSON array of located entities (with distances)
/// * `categories_json` - JSON array of category wire names to keep
/// * `sort_by` - `distance`, `name` or `date`
///
/// # Returns
/// JSON array of the kept entities in display order
#[wasm_bindgen(js_name = filterAndSort)]
pub fn filter_and_sort(entities_json: &str, categories_json: &str, sort_by: &str) -> Result<String, JsValue> {
    let entities: Vec<LocatedEntity> = serde_json::from_str(entities_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;
    let categories: Vec<Category> = serde_json::from_str(categories_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?;
    let sort = sort_by.parse().map_err(|e: crate::SearchError| JsValue::from_str(&e.to_string()))?;

    let active: CategorySet = categories.into_iter().collect();
    let result = crate::filter_and_sort(&entities, &active, sort);

    serde_json::to_string(&result)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}

/// Compare two names in Korean collation order: -1, 0 or 1.
#[wasm_bindgen(js_name = compareNames)]
pub fn compare_names(a: &str, b: &str) -> i32 {
    crate::korean_cmp(a, b) as i32
}
