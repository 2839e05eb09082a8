#![forbid(unsafe_code)]

//! Core: page geometry and popup placement for guided tours.
//!
//! # Role in Waypoint
//! `waypoint-core` is the geometry layer. It turns the host's viewport
//! rectangles into page-space [`TargetSize`] boxes and computes where a step
//! popup should be anchored for each [`Placement`].
//!
//! # Primary responsibilities
//! - **Geometry**: page-relative target boxes, page height, padding.
//! - **Placement**: the fixed placement table plus window-relative fallback.
//! - **Scroll requests**: where the page should scroll after placement.
//!
//! # How it fits in the system
//! The tour coordinator (`waypoint`) measures a registered target through the
//! host, feeds the result through [`TargetSize::resolve`] and
//! [`TargetSize::padded`], then calls [`placement::place`] once the popup has
//! been measured. Nothing here holds state or talks to the host directly.

pub mod geometry;
pub mod placement;

pub use geometry::{ClientRect, PageExtents, Padding, TargetSize, round_half_up};
pub use placement::{
    Placement, PlacementParseError, PopupPosition, PopupSize, ScrollBehavior, ScrollRequest,
    Viewport, place, scroll_request,
};
