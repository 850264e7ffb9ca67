//! `nearby`: fetch, filter, sort and page services around a reference point.

use crate::output::{entity_row, Status};
use anyhow::{Context, Result};
use seoul_services_api_client::location::{acquire_position, NoPositionSource};
use seoul_services_api_client::NearbyQuery;
use seoul_services_catalog::{Category, CategorySet};
use seoul_services_core::config::Config;
use seoul_services_core::favorites::FavoritesStore;
use seoul_services_geo::Coordinate;
use seoul_services_search::{ListView, Paginator, SortBy};
use std::time::Duration;
use tracing::{debug, warn};

pub struct NearbyArgs {
    pub point: Option<(f64, f64)>,
    pub address: Option<String>,
    pub radius_m: Option<u32>,
    pub categories: Vec<Category>,
    pub sort: SortBy,
    pub pages: usize,
    pub json: bool,
}

pub async fn run(config: &Config, args: NearbyArgs) -> Result<()> {
    let client = super::client(config)?;
    let search = &config.schema.search;

    let reference = match (args.point, &args.address) {
        (Some((latitude, longitude)), _) => {
            let coordinate = Coordinate::new(latitude, longitude);
            coordinate.validate()?;
            coordinate
        }
        (None, Some(address)) => {
            let place = client
                .geocoding()
                .geocode(address)
                .await
                .with_context(|| format!("Could not locate '{address}'"))?;
            debug!(address = %place.address, "Geocoded search origin");
            place.coordinate
        }
        (None, None) => {
            let location = &config.schema.location;
            let fallback = Coordinate::new(location.default_latitude, location.default_longitude);
            let outcome = acquire_position(
                &NoPositionSource,
                Duration::from_secs(location.timeout_secs),
                fallback,
            )
            .await;
            if let Some(error) = &outcome.error {
                warn!(error = %error, "Using the default location");
                if !args.json {
                    Status::info(error.user_message());
                }
            }
            outcome.coordinate
        }
    };

    let categories = category_set(&args.categories);
    let query = NearbyQuery::new(reference)
        .with_radius(args.radius_m.unwrap_or(search.radius_m))
        .with_categories(categories)
        .with_limit(search.limit);
    let parsed = client.services().nearby(&query).await?;
    if !parsed.dropped.is_empty() {
        debug!(dropped = parsed.dropped.len(), "Some records were skipped");
    }

    let mut view = ListView::new(Paginator::new(search.page_size)?);
    view.set_reference(Some(reference));
    view.set_categories(categories);
    view.set_sort(args.sort);
    view.set_entities(parsed.entities);
    for _ in 1..args.pages {
        if !view.load_more() {
            break;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(view.visible())?);
        return Ok(());
    }

    let favorites = match FavoritesStore::open(config.schema.favorites.resolved_path()) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "Favorites unavailable");
            None
        }
    };

    Status::header(&format!(
        "{} services within {}m of ({:.4}, {:.4})",
        view.results().len(),
        query.radius_m,
        reference.latitude,
        reference.longitude
    ));
    for (i, entity) in view.visible().iter().enumerate() {
        let favorite = favorites.as_ref().is_some_and(|f| f.contains(&entity.id));
        println!("{}", entity_row(i + 1, entity, favorite));
    }
    if view.has_more() {
        Status::info(&format!(
            "{} more; use --pages {}",
            view.results().len() - view.visible().len(),
            args.pages + 1
        ));
    }
    Ok(())
}

/// No flags means every category.
fn category_set(categories: &[Category]) -> CategorySet {
    if categories.is_empty() {
        CategorySet::all()
    } else {
        categories.iter().copied().collect()
    }
}
