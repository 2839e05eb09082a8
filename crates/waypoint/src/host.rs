//! Seams to the host application.
//!
//! The tour never touches a real page. Navigation goes through a [`Router`],
//! measurement and input requests go through a [`PageHost`], and target
//! elements are opaque [`TargetElement`] handles registered by the view
//! layer.

use std::fmt;
use std::rc::Rc;
use waypoint_core::{ClientRect, PageExtents, PopupSize, ScrollRequest, Viewport};

/// Navigation capability. Fire-and-forget.
pub trait Router {
    fn navigate(&mut self, route: &str);
}

impl<F: FnMut(&str)> Router for F {
    fn navigate(&mut self, route: &str) {
        self(route);
    }
}

/// Router for hosts without client-side routing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRouter;

impl Router for NoRouter {
    fn navigate(&mut self, route: &str) {
        tracing::debug!(route, "navigation requested without a router");
    }
}

/// An element a step can highlight.
pub trait TargetElement {
    /// Bounding rectangle relative to the viewport.
    fn client_rect(&self) -> ClientRect;
}

/// Shared handle to a registered target element.
pub type ElementRef = Rc<dyn TargetElement>;

/// Controls inside the popup that can take focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupControl {
    Next,
    Done,
}

/// Page measurements and side effects the tour needs from its host.
pub trait PageHost {
    /// Inner window size.
    fn viewport(&self) -> Viewport;

    /// Viewport rectangle of the document body. Its origin moves with
    /// scrolling.
    fn body_rect(&self) -> ClientRect;

    /// Heights used to size the backdrop.
    fn page_extents(&self) -> PageExtents;

    /// Rendered popup size, or `None` while the popup is not in the page.
    fn popup_size(&self) -> Option<PopupSize>;

    fn scroll_to(&mut self, request: ScrollRequest);

    /// Focus a popup control. Returns `false` if the popup has no such
    /// control.
    fn focus(&mut self, control: PopupControl) -> bool;
}

/// The step whose target element is confirmed present.
#[derive(Clone)]
pub struct TargetReady {
    pub step_name: String,
    pub target: ElementRef,
}

impl PartialEq for TargetReady {
    fn eq(&self, other: &Self) -> bool {
        self.step_name == other.step_name && Rc::ptr_eq(&self.target, &other.target)
    }
}

impl fmt::Debug for TargetReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetReady")
            .field("step_name", &self.step_name)
            .field("target", &self.target.client_rect())
            .finish()
    }
}
