//! Tour definitions as authored by the host application.
//!
//! A definition is plain data plus optional lifecycle hooks. It can be built
//! in code or read from the JSON tour format:
//!
//! ```json
//! {
//!   "steps": [
//!     { "stepName": "intro", "title": { "en-EN": "Hi", "fr-FR": "Salut" } },
//!     { "stepName": "search", "route": "/search", "options": { "placement": "top" } }
//!   ],
//!   "tourOptions": { "backdrop": false },
//!   "ctrlBtns": { "next": "Onward" },
//!   "withoutLogs": true
//! }
//! ```

use crate::error::TourError;
use crate::options::StepOptionsPatch;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use waypoint_i18n::{ControlButtons, TextSource};

/// One step as written in a tour definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    pub step_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TextSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<TextSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<StepOptionsPatch>,
    /// Per-step button labels; the tour's labels apply when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctrl_btns: Option<ControlButtons>,
    /// Unrecognized fields, passed through to custom templates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StepDefinition {
    #[must_use]
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<TextSource>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<TextSource>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn options(mut self, options: StepOptionsPatch) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn ctrl_btns(mut self, buttons: ControlButtons) -> Self {
        self.ctrl_btns = Some(buttons);
        self
    }

    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A whole tour: ordered steps, tour-wide options, labels, and hooks.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDefinition {
    /// Traversal order.
    pub steps: Vec<StepDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour_options: Option<StepOptionsPatch>,
    /// Suppress the catalog dump logged at tour start.
    #[serde(default)]
    pub without_logs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctrl_btns: Option<ControlButtons>,
    #[serde(skip)]
    pub events: TourHooks,
}

impl TourDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON tour format. Hooks are attached separately.
    pub fn from_json(json: &str) -> Result<Self, TourError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn add_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn tour_options(mut self, options: StepOptionsPatch) -> Self {
        self.tour_options = Some(options);
        self
    }

    #[must_use]
    pub fn ctrl_btns(mut self, buttons: ControlButtons) -> Self {
        self.ctrl_btns = Some(buttons);
        self
    }

    #[must_use]
    pub fn without_logs(mut self, quiet: bool) -> Self {
        self.without_logs = quiet;
        self
    }

    #[must_use]
    pub fn events(mut self, events: TourHooks) -> Self {
        self.events = events;
        self
    }
}

/// Which lifecycle point a hook is reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TourEventKind {
    TourStart,
    TourEnd,
    TourBreak,
    Next,
    Prev,
}

impl TourEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TourStart => "tourStart",
            Self::TourEnd => "tourEnd",
            Self::TourBreak => "tourBreak",
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }
}

/// Payload passed to lifecycle hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TourEventArgs {
    pub kind: TourEventKind,
    /// For `next`/`prev` the step about to activate; for end/break the step
    /// the tour stopped on. `None` for `tourStart`.
    pub step: Option<usize>,
    /// Visited step indices, before this event takes effect.
    pub history: Vec<usize>,
    /// Names of the tour's steps in traversal order.
    pub steps: Vec<String>,
}

type Hook = Box<dyn FnMut(&TourEventArgs)>;

/// Optional lifecycle callbacks. Missing hooks are no-ops.
#[derive(Default)]
pub struct TourHooks {
    tour_start: Option<Hook>,
    tour_end: Option<Hook>,
    tour_break: Option<Hook>,
    next: Option<Hook>,
    prev: Option<Hook>,
}

impl TourHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_tour_start(mut self, hook: impl FnMut(&TourEventArgs) + 'static) -> Self {
        self.tour_start = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_tour_end(mut self, hook: impl FnMut(&TourEventArgs) + 'static) -> Self {
        self.tour_end = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_tour_break(mut self, hook: impl FnMut(&TourEventArgs) + 'static) -> Self {
        self.tour_break = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_next(mut self, hook: impl FnMut(&TourEventArgs) + 'static) -> Self {
        self.next = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_prev(mut self, hook: impl FnMut(&TourEventArgs) + 'static) -> Self {
        self.prev = Some(Box::new(hook));
        self
    }

    /// Invoke the hook registered for `args.kind`, if any.
    pub fn fire(&mut self, args: &TourEventArgs) {
        let slot = match args.kind {
            TourEventKind::TourStart => &mut self.tour_start,
            TourEventKind::TourEnd => &mut self.tour_end,
            TourEventKind::TourBreak => &mut self.tour_break,
            TourEventKind::Next => &mut self.next,
            TourEventKind::Prev => &mut self.prev,
        };
        if let Some(hook) = slot {
            hook(args);
        }
    }
}

impl fmt::Debug for TourHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourHooks")
            .field("tour_start", &self.tour_start.is_some())
            .field("tour_end", &self.tour_end.is_some())
            .field("tour_break", &self.tour_break.is_some())
            .field("next", &self.next.is_some())
            .field("prev", &self.prev.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use waypoint_i18n::LocaleMap;

    #[test]
    fn reads_the_json_tour_format() {
        let tour = TourDefinition::from_json(
            r#"{
                "steps": [
                    {"stepName": "intro", "title": {"en-EN": "Hi", "fr-FR": "Salut"}},
                    {"stepName": "search", "route": "/search", "options": {"placement": "top"},
                     "icon": "magnifier"}
                ],
                "tourOptions": {"backdrop": false},
                "ctrlBtns": {"next": "Onward"},
                "withoutLogs": true
            }"#,
        )
        .unwrap();

        assert_eq!(tour.steps.len(), 2);
        assert_eq!(
            tour.steps[0].title,
            Some(TextSource::Localized(
                LocaleMap::new().with("en-EN", "Hi").with("fr-FR", "Salut")
            ))
        );
        assert_eq!(tour.steps[1].route.as_deref(), Some("/search"));
        assert_eq!(
            tour.steps[1].options.as_ref().and_then(|o| o.placement.as_deref()),
            Some("top")
        );
        assert_eq!(tour.steps[1].extra.get("icon"), Some(&Value::from("magnifier")));
        assert_eq!(tour.tour_options.as_ref().and_then(|o| o.backdrop), Some(false));
        assert!(tour.without_logs);
    }

    #[test]
    fn malformed_json_is_an_invalid_definition() {
        let err = TourDefinition::from_json(r#"{"steps": [{"route": "/x"}]}"#).unwrap_err();
        assert!(matches!(err, TourError::InvalidDefinition(_)));
    }

    #[test]
    fn hooks_dispatch_by_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let next_seen = Rc::clone(&seen);
        let end_seen = Rc::clone(&seen);
        let mut hooks = TourHooks::new()
            .on_next(move |args| next_seen.borrow_mut().push((args.kind, args.step)))
            .on_tour_end(move |args| end_seen.borrow_mut().push((args.kind, args.step)));

        hooks.fire(&TourEventArgs {
            kind: TourEventKind::Next,
            step: Some(1),
            history: vec![0],
            steps: Vec::new(),
        });
        hooks.fire(&TourEventArgs {
            kind: TourEventKind::Prev,
            step: Some(0),
            history: vec![0, 1],
            steps: Vec::new(),
        });
        hooks.fire(&TourEventArgs {
            kind: TourEventKind::TourEnd,
            step: Some(1),
            history: vec![0, 1],
            steps: Vec::new(),
        });

        assert_eq!(
            *seen.borrow(),
            vec![
                (TourEventKind::Next, Some(1)),
                (TourEventKind::TourEnd, Some(1))
            ]
        );
    }

    #[test]
    fn hooks_debug_shows_presence() {
        let hooks = TourHooks::new().on_prev(|_| {});
        let dbg = format!("{hooks:?}");
        assert!(dbg.contains("prev: true"));
        assert!(dbg.contains("next: false"));
    }
}
