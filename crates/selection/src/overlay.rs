//! The seam to the map SDK's detail overlay.

use seoul_services_catalog::OverlayContent;
use seoul_services_geo::Coordinate;
use serde::Serialize;

/// Where an overlay is attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Anchor {
    /// The entity's own marker, by marker id
    Marker(String),
    /// A bare position, for an entity absorbed into a cluster
    Position(Coordinate),
}

/// The map's single detail overlay.
///
/// Only the reconciler calls these methods.
pub trait OverlayHost {
    /// Show `content` attached to `anchor`.
    fn open(&mut self, content: &OverlayContent, anchor: &Anchor);

    /// Hide the overlay.
    fn close(&mut self);
}

impl<H: OverlayHost + ?Sized> OverlayHost for &mut H {
    fn open(&mut self, content: &OverlayContent, anchor: &Anchor) {
        (**self).open(content, anchor);
    }

    fn close(&mut self) {
        (**self).close();
    }
}

/// An overlay that is showing, or waiting to be shown again.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOverlay {
    pub content: OverlayContent,
    pub anchor: Anchor,
}
