//! `clusters`: group records from a file into markers and replay a click.

use crate::output::{marker_row, print_overlay, Status};
use anyhow::{Context, Result};
use seoul_services_catalog::{parse_records, OverlayContent};
use seoul_services_core::config::Config;
use seoul_services_selection::{Anchor, ClickOutcome, ClickTarget, MapSession, OverlayHost};
use serde_json::Value;
use std::path::Path;

/// Prints overlays as they open; quiet in JSON mode.
struct TerminalOverlay {
    quiet: bool,
    opened: Option<String>,
}

impl OverlayHost for TerminalOverlay {
    fn open(&mut self, content: &OverlayContent, anchor: &Anchor) {
        self.opened = Some(content.entity_id.clone());
        if self.quiet {
            return;
        }
        print_overlay(content);
        if let Anchor::Position(position) = anchor {
            println!("  (in a cluster, shown at {:.5}, {:.5})", position.latitude, position.longitude);
        }
    }

    fn close(&mut self) {
        self.opened = None;
    }
}

pub fn run(
    config: &Config,
    file: &Path,
    threshold: Option<f64>,
    click: Option<&str>,
    zoom: Option<u8>,
    json: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let body: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let records = records_of(&body).with_context(|| {
        format!("{} holds neither an array nor a `locations` array", file.display())
    })?;

    let parsed = parse_records(records);
    if !parsed.dropped.is_empty() && !json {
        Status::warning(&format!("Skipped {} invalid records", parsed.dropped.len()));
    }

    let host = TerminalOverlay { quiet: json, opened: None };
    let threshold = threshold.unwrap_or(config.schema.map.cluster_threshold_m);
    let mut session = MapSession::with_threshold(host, threshold)?;
    session.set_zoom_level(zoom.unwrap_or(config.schema.map.default_zoom));
    session.replace_entities(parsed.entities)?;

    let outcome = click.map(|id| {
        let target = if session.clusters().get(id).is_some() {
            ClickTarget::Cluster(id.to_string())
        } else {
            ClickTarget::Entity(id.to_string())
        };
        session.click(target)
    });

    if json {
        let mut report = serde_json::json!({
            "threshold_m": session.threshold_m(),
            "markers": session.markers(),
        });
        if let Some(outcome) = &outcome {
            report["click"] = outcome_json(outcome, session.host().opened.as_deref());
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    Status::header(&format!(
        "{} markers from {} services ({}m)",
        session.markers().len(),
        session.entities().len(),
        session.threshold_m()
    ));
    for marker in session.markers() {
        println!("{}", marker_row(&marker));
    }

    match outcome {
        Some(ClickOutcome::ZoomTo(target)) => Status::info(&format!(
            "Zoom to level {} at ({:.5}, {:.5})",
            target.level, target.center.latitude, target.center.longitude
        )),
        Some(ClickOutcome::Ignored) => Status::warning("Nothing with that id on the map"),
        Some(ClickOutcome::Selected { .. }) | Some(ClickOutcome::Cleared) | None => {}
    }
    Ok(())
}

fn records_of(body: &Value) -> Option<&[Value]> {
    match body {
        Value::Array(records) => Some(records),
        Value::Object(map) => ["locations", "services"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice),
        _ => None,
    }
}

fn outcome_json(outcome: &ClickOutcome, opened: Option<&str>) -> Value {
    match outcome {
        ClickOutcome::Selected { entity_id, changed } => serde_json::json!({
            "action": "select",
            "entity_id": entity_id,
            "changed": changed,
            "overlay": opened,
        }),
        ClickOutcome::ZoomTo(target) => serde_json::json!({
            "action": "zoom",
            "center": target.center,
            "level": target.level,
        }),
        ClickOutcome::Cleared => serde_json::json!({ "action": "clear" }),
        ClickOutcome::Ignored => serde_json::json!({ "action": "ignored" }),
    }
}
