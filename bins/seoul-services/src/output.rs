//! Terminal output
//!
//! Status lines go to stderr so that stdout stays parseable.

use owo_colors::OwoColorize;
use seoul_services_catalog::{LocatedEntity, OverlayContent, RowValue};
use seoul_services_cluster::MarkerDescriptor;
use seoul_services_geo::format_distance;

/// Status message helpers
pub struct Status;

impl Status {
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        eprintln!("{} {}", "ℹ".blue(), message);
    }

    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// `"1.2km"`, or `"-"` without a distance.
pub fn distance_label(distance: Option<f64>) -> String {
    distance
        .and_then(|d| format_distance(d).ok())
        .unwrap_or_else(|| "-".to_string())
}

/// One list row: position, favorite star, category, name, distance.
pub fn entity_row(position: usize, entity: &LocatedEntity, favorite: bool) -> String {
    let star = if favorite { "★" } else { " " };
    format!(
        "{:>3}. {} [{}] {} {}",
        position,
        star.yellow(),
        entity.category().label().cyan(),
        entity.name,
        distance_label(entity.distance).dimmed()
    )
}

pub fn marker_row(marker: &MarkerDescriptor) -> String {
    let kind = match (marker.label, marker.member_count) {
        (Some(label), Some(count)) => format!("{label} x{count}"),
        _ => marker.category.label().to_string(),
    };
    format!(
        "{} ({:.5}, {:.5}) {}",
        marker.id.bold(),
        marker.position.latitude,
        marker.position.longitude,
        kind.dimmed()
    )
}

pub fn print_overlay(content: &OverlayContent) {
    Status::header(&format!("{} · {}", content.title, content.category_label));
    if let Some(distance) = &content.distance {
        println!("  거리: {distance}");
    }
    for row in &content.rows {
        let value = match &row.value {
            RowValue::Text(text) => text.clone(),
            RowValue::Link(url) | RowValue::Image(url) => url.underline().to_string(),
        };
        println!("  {}: {}", row.label, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seoul_services_catalog::Category;
    use seoul_services_geo::Coordinate;

    #[test]
    fn test_distance_label() {
        assert_eq!(distance_label(Some(1250.0)), "1.3km");
        assert_eq!(distance_label(Some(-1.0)), "-");
        assert_eq!(distance_label(None), "-");
    }

    #[test]
    fn test_entity_row_contains_name_and_distance() {
        let entity = LocatedEntity::bare("lib-1", Category::Library, "서울도서관", Coordinate::new(37.5663, 126.9779))
            .with_distance(Some(87.0));
        let row = entity_row(1, &entity, true);
        assert!(row.contains("서울도서관"));
        assert!(row.contains("87m"));
        assert!(row.contains("도서관"));
    }
}
