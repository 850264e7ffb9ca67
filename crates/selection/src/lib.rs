//! Selection and detail-overlay reconciliation for the services map.
//!
//! This crate provides:
//! - [`OverlayHost`], the seam to the map SDK's single detail overlay
//! - [`Reconciler`], the selection state machine that survives map motion
//!   and data refreshes
//! - [`MapSession`], which reclusters before every reconciliation and routes
//!   marker, list and background clicks
//!
//! # Example
//!
//! ```
//! use seoul_services_catalog::{Category, LocatedEntity, OverlayContent};
//! use seoul_services_geo::Coordinate;
//! use seoul_services_selection::{Anchor, ClickTarget, MapSession, OverlayHost};
//!
//! #[derive(Default)]
//! struct Console(Option<String>);
//!
//! impl OverlayHost for Console {
//!     fn open(&mut self, content: &OverlayContent, _anchor: &Anchor) {
//!         self.0 = Some(content.title.clone());
//!     }
//!     fn close(&mut self) {
//!         self.0 = None;
//!     }
//! }
//!
//! let mut session = MapSession::new(Console::default());
//! session
//!     .replace_entities(vec![LocatedEntity::bare(
//!         "lib-1",
//!         Category::Library,
//!         "서울도서관",
//!         Coordinate::new(37.5663, 126.9779),
//!     )])
//!     .unwrap();
//!
//! session.click(ClickTarget::Entity("lib-1".into()));
//! assert_eq!(session.host().0.as_deref(), Some("서울도서관"));
//! ```

mod overlay;
mod reconciler;
mod session;

pub use overlay::{Anchor, OpenOverlay, OverlayHost};
pub use reconciler::{settle_after, Reconciler, SelectionState, SettleTicket, SETTLE_DELAY};
pub use session::{ClickOutcome, ClickTarget, MapSession, DEFAULT_ZOOM_LEVEL};
