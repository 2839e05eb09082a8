//! Deterministic host doubles for tests.
//!
//! Enabled with the `test-support` feature.

use crate::host::{PageHost, PopupControl, Router, TargetElement};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use waypoint_core::{ClientRect, PageExtents, PopupSize, ScrollRequest, Viewport};

/// A page with a fixed layout that records scroll and focus requests.
#[derive(Debug, Clone)]
pub struct FakePage {
    viewport: Viewport,
    body: ClientRect,
    extents: PageExtents,
    popup: Option<PopupSize>,
    controls: Vec<PopupControl>,
    scrolls: Vec<ScrollRequest>,
    focused: Vec<PopupControl>,
}

impl FakePage {
    /// An unscrolled page exactly as tall as a `width` x `height` window.
    /// The popup is not rendered until [`with_popup`](Self::with_popup).
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            body: ClientRect::new(0.0, 0.0, width, height),
            extents: PageExtents::viewport_only(height),
            popup: None,
            controls: vec![PopupControl::Next, PopupControl::Done],
            scrolls: Vec::new(),
            focused: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_popup(mut self, size: PopupSize) -> Self {
        self.popup = Some(size);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: ClientRect) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_extents(mut self, extents: PageExtents) -> Self {
        self.extents = extents;
        self
    }

    /// Controls present in the popup, for focus requests.
    #[must_use]
    pub fn with_controls(mut self, controls: Vec<PopupControl>) -> Self {
        self.controls = controls;
        self
    }

    /// Render (or remove) the popup.
    pub fn set_popup(&mut self, size: Option<PopupSize>) {
        self.popup = size;
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
    }

    #[must_use]
    pub fn scrolls(&self) -> &[ScrollRequest] {
        &self.scrolls
    }

    #[must_use]
    pub fn focused(&self) -> &[PopupControl] {
        &self.focused
    }
}

impl PageHost for FakePage {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn body_rect(&self) -> ClientRect {
        self.body
    }

    fn page_extents(&self) -> PageExtents {
        self.extents
    }

    fn popup_size(&self) -> Option<PopupSize> {
        self.popup
    }

    fn scroll_to(&mut self, request: ScrollRequest) {
        self.scrolls.push(request);
    }

    fn focus(&mut self, control: PopupControl) -> bool {
        if self.controls.contains(&control) {
            self.focused.push(control);
            true
        } else {
            false
        }
    }
}

/// A target element whose rectangle tests can move.
#[derive(Debug)]
pub struct FakeElement {
    rect: Cell<ClientRect>,
}

impl FakeElement {
    #[must_use]
    pub fn at(rect: ClientRect) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(rect),
        })
    }

    pub fn move_to(&self, rect: ClientRect) {
        self.rect.set(rect);
    }
}

impl TargetElement for FakeElement {
    fn client_rect(&self) -> ClientRect {
        self.rect.get()
    }
}

/// A router that remembers every navigation. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRouter {
    routes: Rc<RefCell<Vec<String>>>,
}

impl RecordingRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes navigated to so far, oldest first.
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.routes.borrow().clone()
    }
}

impl Router for RecordingRouter {
    fn navigate(&mut self, route: &str) {
        self.routes.borrow_mut().push(route.to_string());
    }
}
