//! `distance`, `geocode` and `reverse`.

use crate::output::Status;
use anyhow::Result;
use seoul_services_core::config::Config;
use seoul_services_geo::{distance as haversine, format_distance, Coordinate};

pub fn distance(from: (f64, f64), to: (f64, f64)) -> Result<()> {
    let from = Coordinate::from(from);
    let to = Coordinate::from(to);
    let meters = haversine(&from, &to)?;
    println!("{} ({:.1} m)", format_distance(meters)?, meters);
    Ok(())
}

pub async fn geocode(config: &Config, address: &str, json: bool) -> Result<()> {
    let place = super::client(config)?.geocoding().geocode(address).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&place)?);
        return Ok(());
    }

    Status::success(&place.address);
    println!("  {:.6}, {:.6}", place.coordinate.latitude, place.coordinate.longitude);
    let region: Vec<&str> = [&place.sido, &place.sigungu, &place.dong]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();
    if !region.is_empty() {
        println!("  {}", region.join(" "));
    }
    Ok(())
}

pub async fn reverse(config: &Config, point: (f64, f64), json: bool) -> Result<()> {
    let coordinate = Coordinate::from(point);
    coordinate.validate()?;
    let found = super::client(config)?.geocoding().reverse(coordinate).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    Status::success(&found.address);
    if let Some(road) = found.road_address.as_deref().filter(|r| *r != found.address) {
        println!("  도로명: {road}");
    }
    if let Some(jibun) = found.jibun_address.as_deref().filter(|j| *j != found.address) {
        println!("  지번: {jibun}");
    }
    Ok(())
}
