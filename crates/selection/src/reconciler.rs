//! Keeps the selected entity and the single detail overlay in agreement
//! across clicks, map motion and data refreshes.
//!
//! | State | Selection | Overlay |
//! |---|---|---|
//! | `Idle` | none | none |
//! | `Stationary` | some | open, or hidden after the entity merged into a cluster |
//! | `Pending` | some | open, recorded for restoration once the map settles |
//!
//! The overlay shown is always the selected entity's.

use crate::overlay::{Anchor, OpenOverlay, OverlayHost};
use seoul_services_catalog::{LocatedEntity, OverlayContent};
use seoul_services_cluster::ClusterSet;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Wait between the map going idle and the overlay being redrawn.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Idle,
    Stationary,
    Pending,
}

/// Permission to restore the overlay after motion settled.
///
/// Any later motion start, selection or background click makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTicket {
    generation: u64,
}

impl SettleTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Waits out [`SETTLE_DELAY`] and hands the ticket back for
/// [`Reconciler::settle`].
pub async fn settle_after(ticket: SettleTicket) -> SettleTicket {
    tokio::time::sleep(SETTLE_DELAY).await;
    ticket
}

/// Selection state machine for one map session.
#[derive(Debug, Default)]
pub struct Reconciler {
    selected: Option<String>,
    overlay: Option<OpenOverlay>,
    pending: Option<OpenOverlay>,
    generation: u64,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        match (&self.selected, &self.pending) {
            (None, _) => SelectionState::Idle,
            (Some(_), Some(_)) => SelectionState::Pending,
            (Some(_), None) => SelectionState::Stationary,
        }
    }

    /// Id of the selected entity.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The overlay currently showing.
    pub fn overlay(&self) -> Option<&OpenOverlay> {
        self.overlay.as_ref()
    }

    pub fn is_overlay_open(&self) -> bool {
        self.overlay.is_some()
    }

    /// Selects `entity` and shows its overlay, anchored to its own marker in
    /// `clusters` or to its position if it sits inside a cluster.
    ///
    /// Selecting the entity that is already selected, with its overlay open
    /// and the map at rest, does nothing. Returns whether the host was touched.
    pub fn select<H: OverlayHost>(&mut self, entity: &LocatedEntity, clusters: &ClusterSet, host: &mut H) -> bool {
        let unchanged = self.selected.as_deref() == Some(entity.id.as_str())
            && self.overlay.is_some()
            && self.pending.is_none();
        if unchanged {
            debug!(entity_id = %entity.id, "Entity already selected");
            return false;
        }

        if self.overlay.take().is_some() {
            host.close();
        }

        let anchor = match clusters.standalone(&entity.id) {
            Some(marker) => Anchor::Marker(marker.id.clone()),
            None => Anchor::Position(entity.coordinate),
        };
        let overlay = OpenOverlay {
            content: OverlayContent::for_entity(entity),
            anchor,
        };
        host.open(&overlay.content, &overlay.anchor);
        debug!(entity_id = %entity.id, anchor = ?overlay.anchor, "Selected entity");

        self.selected = Some(entity.id.clone());
        self.overlay = Some(overlay);
        self.pending = None;
        self.generation += 1;
        true
    }

    /// Click on empty map: closes the overlay and clears the selection.
    pub fn background_click<H: OverlayHost>(&mut self, host: &mut H) {
        if self.overlay.take().is_some() {
            host.close();
        }
        self.selected = None;
        self.pending = None;
        self.generation += 1;
    }

    /// Drag or zoom began. The overlay stays open and is recorded for
    /// restoration. Returns the new generation; earlier tickets are stale.
    pub fn motion_start(&mut self) -> u64 {
        self.generation += 1;
        if self.pending.is_none() {
            if let Some(overlay) = &self.overlay {
                self.pending = Some(overlay.clone());
                debug!(generation = self.generation, "Overlay pending until map settles");
            }
        }
        self.generation
    }

    /// The map stopped moving. Returns a ticket to pass to [`Self::settle`]
    /// after [`SETTLE_DELAY`] if an overlay is waiting to be restored.
    pub fn idle(&mut self) -> Option<SettleTicket> {
        self.pending.as_ref().map(|_| SettleTicket {
            generation: self.generation,
        })
    }

    /// Reopens the recorded overlay. Stale tickets are ignored. Returns
    /// whether the overlay was restored.
    pub fn settle<H: OverlayHost>(&mut self, ticket: SettleTicket, host: &mut H) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Ignoring stale settle"
            );
            return false;
        }
        let Some(overlay) = self.pending.take() else {
            return false;
        };

        if self.overlay.take().is_some() {
            host.close();
        }
        host.open(&overlay.content, &overlay.anchor);
        self.overlay = Some(overlay);
        true
    }

    /// The cluster set was recomputed. If the selected entity lost its own
    /// marker the overlay closes; the selection is kept either way. If it
    /// kept one, the overlay is redrawn only when its content or marker
    /// changed, and a pending restoration picks up the new version.
    pub fn clusters_changed<H: OverlayHost>(&mut self, clusters: &ClusterSet, host: &mut H) {
        let Some(selected) = self.selected.as_deref() else {
            return;
        };
        let refreshed = clusters.standalone(selected).and_then(|marker| {
            let entity = marker.members.iter().find(|m| m.id == selected)?;
            Some(OpenOverlay {
                content: OverlayContent::for_entity(entity),
                anchor: Anchor::Marker(marker.id.clone()),
            })
        });

        let Some(refreshed) = refreshed else {
            if self.overlay.take().is_some() {
                host.close();
                debug!(entity_id = %selected, "Selected entity no longer has its own marker");
            }
            if self.pending.take().is_some() {
                self.generation += 1;
            }
            return;
        };

        if let Some(pending) = self.pending.as_mut() {
            *pending = refreshed.clone();
        }
        if self.overlay.as_ref().is_some_and(|open| *open != refreshed) {
            host.close();
            host.open(&refreshed.content, &refreshed.anchor);
            debug!(entity_id = %selected, "Redrew overlay for refreshed entity");
            self.overlay = Some(refreshed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::testing::RecordingHost;
    use seoul_services_catalog::Category;
    use seoul_services_geo::Coordinate;

    fn library(id: &str, lon: f64) -> LocatedEntity {
        LocatedEntity::bare(id, Category::Library, format!("도서관 {id}"), Coordinate::new(37.5665, lon))
    }

    fn apart() -> (Vec<LocatedEntity>, ClusterSet) {
        let entities = vec![library("a", 126.978), library("b", 127.05)];
        let clusters = ClusterSet::build(&entities, 500.0).unwrap();
        (entities, clusters)
    }

    #[test]
    fn test_select_anchors_to_marker() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();

        assert_eq!(reconciler.state(), SelectionState::Idle);
        assert!(reconciler.select(&entities[0], &clusters, &mut host));

        assert_eq!(reconciler.state(), SelectionState::Stationary);
        assert_eq!(host.showing, Some(("a".to_string(), Anchor::Marker("a".to_string()))));
    }

    #[test]
    fn test_reselect_is_noop() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();

        reconciler.select(&entities[0], &clusters, &mut host);
        assert!(!reconciler.select(&entities[0], &clusters, &mut host));
        assert_eq!((host.opens, host.closes), (1, 0));

        reconciler.select(&entities[1], &clusters, &mut host);
        assert_eq!((host.opens, host.closes), (2, 1));
        assert_eq!(reconciler.selected(), Some("b"));
    }

    #[test]
    fn test_clustered_entity_anchors_to_position() {
        let entities = vec![library("a", 126.978), library("b", 126.979)];
        let clusters = ClusterSet::build(&entities, 500.0).unwrap();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();

        reconciler.select(&entities[1], &clusters, &mut host);
        let anchor = reconciler.overlay().map(|o| o.anchor.clone());
        assert_eq!(anchor, Some(Anchor::Position(entities[1].coordinate)));
    }

    #[test]
    fn test_background_click_clears() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();

        reconciler.select(&entities[0], &clusters, &mut host);
        reconciler.background_click(&mut host);

        assert_eq!(reconciler.state(), SelectionState::Idle);
        assert!(host.showing.is_none());
        assert_eq!(host.closes, 1);
    }

    #[test]
    fn test_motion_keeps_overlay_open_then_restores() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();

        reconciler.select(&entities[0], &clusters, &mut host);
        reconciler.motion_start();
        assert_eq!(reconciler.state(), SelectionState::Pending);
        assert!(host.showing.is_some());

        let ticket = reconciler.idle().unwrap();
        assert!(reconciler.settle(ticket, &mut host));
        assert_eq!(reconciler.state(), SelectionState::Stationary);
        assert_eq!((host.opens, host.closes), (2, 1));
        assert_eq!(host.showing, Some(("a".to_string(), Anchor::Marker("a".to_string()))));

        assert!(!reconciler.settle(ticket, &mut host));
    }

    #[test]
    fn test_new_motion_makes_ticket_stale() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();

        reconciler.select(&entities[0], &clusters, &mut host);
        reconciler.motion_start();
        let stale = reconciler.idle().unwrap();
        reconciler.motion_start();

        assert!(!reconciler.settle(stale, &mut host));
        assert_eq!(reconciler.state(), SelectionState::Pending);

        let fresh = reconciler.idle().unwrap();
        assert!(reconciler.settle(fresh, &mut host));
    }

    #[test]
    fn test_select_while_pending_reanchors() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();

        reconciler.select(&entities[0], &clusters, &mut host);
        reconciler.motion_start();
        let ticket = reconciler.idle().unwrap();

        assert!(reconciler.select(&entities[0], &clusters, &mut host));
        assert_eq!(reconciler.state(), SelectionState::Stationary);
        assert!(!reconciler.settle(ticket, &mut host));
    }

    #[test]
    fn test_motion_without_selection_has_nothing_to_settle() {
        let mut reconciler = Reconciler::new();
        reconciler.motion_start();
        assert!(reconciler.idle().is_none());
    }

    #[test]
    fn test_clusters_changed_closes_merged_overlay() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();
        reconciler.select(&entities[0], &clusters, &mut host);

        // Still standalone: untouched
        reconciler.clusters_changed(&clusters, &mut host);
        assert_eq!((host.opens, host.closes), (1, 0));

        let merged = ClusterSet::build(&[library("a", 126.978), library("c", 126.979)], 500.0).unwrap();
        reconciler.clusters_changed(&merged, &mut host);

        assert!(!reconciler.is_overlay_open());
        assert_eq!(reconciler.selected(), Some("a"));
        assert_eq!(host.closes, 1);
    }

    #[test]
    fn test_clusters_changed_redraws_renamed_entity() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();
        reconciler.select(&entities[0], &clusters, &mut host);

        let renamed = vec![
            LocatedEntity::bare("a", Category::Library, "새 이름", entities[0].coordinate),
            entities[1].clone(),
        ];
        let refreshed = ClusterSet::build(&renamed, 500.0).unwrap();
        reconciler.clusters_changed(&refreshed, &mut host);

        assert_eq!((host.opens, host.closes), (2, 1));
        assert_eq!(host.title.as_deref(), Some("새 이름"));
        assert_eq!(reconciler.overlay().map(|o| o.content.title.as_str()), Some("새 이름"));
        assert_eq!(reconciler.state(), SelectionState::Stationary);
    }

    #[test]
    fn test_pending_restore_uses_refreshed_content() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();
        reconciler.select(&entities[0], &clusters, &mut host);
        reconciler.motion_start();

        let renamed = vec![LocatedEntity::bare("a", Category::Library, "새 이름", entities[0].coordinate)];
        reconciler.clusters_changed(&ClusterSet::build(&renamed, 500.0).unwrap(), &mut host);
        assert_eq!(reconciler.state(), SelectionState::Pending);

        let ticket = reconciler.idle().unwrap();
        assert!(reconciler.settle(ticket, &mut host));
        assert_eq!(host.title.as_deref(), Some("새 이름"));
    }

    #[test]
    fn test_clusters_changed_drops_pending_restore() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();
        reconciler.select(&entities[0], &clusters, &mut host);
        reconciler.motion_start();
        let ticket = reconciler.idle().unwrap();

        reconciler.clusters_changed(&ClusterSet::default(), &mut host);
        assert!(!reconciler.settle(ticket, &mut host));
        assert!(host.showing.is_none());
    }

    #[tokio::test]
    async fn test_settle_after_delay() {
        let (entities, clusters) = apart();
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::new();

        reconciler.select(&entities[0], &clusters, &mut host);
        reconciler.motion_start();
        let ticket = reconciler.idle().unwrap();

        let started = std::time::Instant::now();
        let ticket = settle_after(ticket).await;
        assert!(started.elapsed() >= SETTLE_DELAY);

        assert!(reconciler.settle(ticket, &mut host));
        assert_eq!(host.showing.map(|(id, _)| id), Some("a".to_string()));
    }
}
