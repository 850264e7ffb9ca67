//! One map view: the entity snapshot, its clustering, and the selection.
//!
//! Every change to the snapshot or the threshold reclusters first and only
//! then lets the reconciler look at the new cluster set.

use crate::overlay::OverlayHost;
use crate::reconciler::{Reconciler, SelectionState, SettleTicket};
use seoul_services_catalog::LocatedEntity;
use seoul_services_cluster::{zoom_in_target, ClusterSet, MarkerDescriptor, Result, ZoomTarget, DEFAULT_THRESHOLD_M};
use seoul_services_telemetry::{metrics, names, Timer};
use tracing::{debug, info};

/// Default starting zoom level of the map.
pub const DEFAULT_ZOOM_LEVEL: u8 = 5;

/// What the user clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// A standalone marker or a list row
    Entity(String),
    /// A marker by its cluster id
    Cluster(String),
    /// Empty map
    Background,
}

/// What a click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The entity is selected; `changed` is false when it already was
    Selected { entity_id: String, changed: bool },
    /// A multi-member cluster was clicked; the map should move here
    ZoomTo(ZoomTarget),
    /// Selection cleared
    Cleared,
    /// The id matched nothing in the current snapshot
    Ignored,
}

/// Map session owning the overlay host.
#[derive(Debug)]
pub struct MapSession<H: OverlayHost> {
    entities: Vec<LocatedEntity>,
    threshold_m: f64,
    clusters: ClusterSet,
    zoom_level: u8,
    reconciler: Reconciler,
    host: H,
}

impl<H: OverlayHost> MapSession<H> {
    /// Empty session with the default threshold.
    pub fn new(host: H) -> Self {
        Self {
            entities: Vec::new(),
            threshold_m: DEFAULT_THRESHOLD_M,
            clusters: ClusterSet::default(),
            zoom_level: DEFAULT_ZOOM_LEVEL,
            reconciler: Reconciler::new(),
            host,
        }
    }

    /// Empty session with a custom threshold; fails on a negative or
    /// non-finite threshold.
    pub fn with_threshold(host: H, threshold_m: f64) -> Result<Self> {
        let mut session = Self::new(host);
        session.set_threshold(threshold_m)?;
        Ok(session)
    }

    /// Replaces the entity snapshot.
    pub fn replace_entities(&mut self, entities: Vec<LocatedEntity>) -> Result<()> {
        let clusters = build_clusters(&entities, self.threshold_m)?;
        self.entities = entities;
        self.apply(clusters);
        Ok(())
    }

    /// Changes the clustering distance. On error nothing changes.
    pub fn set_threshold(&mut self, threshold_m: f64) -> Result<()> {
        let clusters = build_clusters(&self.entities, threshold_m)?;
        self.threshold_m = threshold_m;
        self.apply(clusters);
        Ok(())
    }

    fn apply(&mut self, clusters: ClusterSet) {
        self.clusters = clusters;
        self.reconciler.clusters_changed(&self.clusters, &mut self.host);
    }

    /// Routes a marker, list or background click.
    pub fn click(&mut self, target: ClickTarget) -> ClickOutcome {
        match target {
            ClickTarget::Entity(id) => self.select(&id),
            ClickTarget::Cluster(id) => match self.clusters.get(&id) {
                Some(cluster) if cluster.is_cluster() => {
                    let target = zoom_in_target(cluster, self.zoom_level);
                    debug!(cluster_id = %id, level = target.level, "Zooming into cluster");
                    ClickOutcome::ZoomTo(target)
                }
                Some(cluster) => match cluster.members.first() {
                    Some(member) => {
                        let member_id = member.id.clone();
                        self.select(&member_id)
                    }
                    None => ClickOutcome::Ignored,
                },
                None => ClickOutcome::Ignored,
            },
            ClickTarget::Background => {
                self.reconciler.background_click(&mut self.host);
                ClickOutcome::Cleared
            }
        }
    }

    /// Selects an entity of the current snapshot by id.
    pub fn select(&mut self, entity_id: &str) -> ClickOutcome {
        let Some(entity) = self.clusters.entity(entity_id) else {
            debug!(entity_id, "Click on unknown entity");
            return ClickOutcome::Ignored;
        };
        let changed = self.reconciler.select(entity, &self.clusters, &mut self.host);
        ClickOutcome::Selected {
            entity_id: entity_id.to_string(),
            changed,
        }
    }

    pub fn motion_start(&mut self) -> u64 {
        self.reconciler.motion_start()
    }

    pub fn idle(&mut self) -> Option<SettleTicket> {
        self.reconciler.idle()
    }

    pub fn settle(&mut self, ticket: SettleTicket) -> bool {
        self.reconciler.settle(ticket, &mut self.host)
    }

    /// Records the zoom level the map ended up at.
    pub fn set_zoom_level(&mut self, level: u8) {
        self.zoom_level = level;
    }

    pub fn zoom_level(&self) -> u8 {
        self.zoom_level
    }

    pub fn threshold_m(&self) -> f64 {
        self.threshold_m
    }

    pub fn entities(&self) -> &[LocatedEntity] {
        &self.entities
    }

    pub fn clusters(&self) -> &ClusterSet {
        &self.clusters
    }

    pub fn markers(&self) -> Vec<MarkerDescriptor> {
        self.clusters.markers()
    }

    pub fn state(&self) -> SelectionState {
        self.reconciler.state()
    }

    pub fn selected(&self) -> Option<&str> {
        self.reconciler.selected()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

fn build_clusters(entities: &[LocatedEntity], threshold_m: f64) -> Result<ClusterSet> {
    let timer = Timer::start(names::CLUSTER_MS);
    let clusters = ClusterSet::build(entities, threshold_m)?;
    timer.stop();

    metrics().increment(names::CLUSTERS_COMPUTED);
    metrics().gauge(names::MARKERS_VISIBLE, clusters.len() as u64);
    info!(
        entities = entities.len(),
        markers = clusters.len(),
        threshold_m,
        "Clusters recomputed"
    );
    Ok(clusters)
}
