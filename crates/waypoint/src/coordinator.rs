//! Target acquisition: from "step N is active" to "popup is placed".
//!
//! # Design
//!
//! The coordinator reacts to step changes by scheduling work on the
//! controller's [`Scheduler`]: a target check, a target-ready notification
//! for elements already registered under the step's name, and later the
//! popup placement. Each activation gets its own [`CancelToken`]; the token
//! is cancelled when the step changes or the tour stops, so no timer from an
//! earlier activation can fire.
//!
//! ```text
//! step change ─▶ CheckTarget (settle, or delay + settle after a route change)
//!             └▶ NotifyTarget (0, or delay after a route change) if registered
//! NotifyTarget ─▶ measure + pad ─▶ publish target ─▶ Place (next tick)
//! Place ─▶ popup measured? ─ no ─▶ Place (measure retry)
//!                          └ yes ─▶ position, focus, scroll ─▶ publish view
//! ```
//!
//! # Invariants
//!
//! 1. Every deferred message re-checks that the tour is running and that its
//!    step is still the active one before acting.
//! 2. At most one activation is live; its timers share one cancel token.
//!    It has at most one pending placement; a newer request replaces it.
//! 3. The view signal never shows a position computed for another step.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Target absent, route changed, retries left | Re-check after the step's `delay` |
//! | Target absent otherwise | Warn; skip ahead or stop if `continueIfTargetAbsent`, else stall |
//! | Popup not rendered yet | Re-measure after the measure retry interval |

use crate::catalog::Step;
use crate::config::TourConfig;
use crate::host::{ElementRef, PageHost, PopupControl, TargetReady};
use crate::options::StepOptions;
use crate::orchestrator::TourOrchestrator;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::rc::Rc;
use std::time::Duration;
use waypoint_core::{PopupPosition, TargetSize, place, scroll_request};
use waypoint_runtime::{CancelToken, Scheduler, Signal, TimerId};

/// Deferred coordinator work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CoordinatorMsg {
    CheckTarget { step: String, retries: u32 },
    NotifyTarget { step: String },
    Place { step: String },
}

/// What the controller must do after a target check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoordinatorAction {
    Advance,
    Stop,
}

/// Whether the classes describe the popup arriving or leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Entering,
    Leaving,
}

/// Build the popup class string:
/// `<arrow> <custom> pos-<placement> <animation> <step name>`, with empty
/// parts dropped.
#[must_use]
pub fn step_classes(options: &StepOptions, phase: AnimationPhase, step_name: Option<&str>) -> String {
    let arrow = if options.arrow_to_target { "with-arrow" } else { "" };
    let position = format!("pos-{}", options.placement);
    let animation = match (options.animated_step, phase) {
        (true, AnimationPhase::Entering) => "animation-on",
        (true, AnimationPhase::Leaving) => "fade-on",
        (false, _) => "",
    };
    [
        arrow,
        options.class_name.as_str(),
        position.as_str(),
        animation,
        step_name.unwrap_or_default(),
    ]
    .into_iter()
    .flat_map(str::split_whitespace)
    .collect::<Vec<_>>()
    .join(" ")
}

/// Backdrop settings for the active step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Backdrop {
    pub enabled: bool,
    pub theme_color: String,
    pub opacity: f64,
    /// Fill of the target hole: the previous step's theme color until the
    /// target is confirmed, then `"transparent"`.
    pub target_background: String,
}

impl Backdrop {
    /// Backdrop for `options` whose target hole is still filled with
    /// `fill`.
    fn pending(options: &StepOptions, fill: &str) -> Self {
        Self {
            enabled: options.backdrop,
            theme_color: options.theme_color.clone(),
            opacity: options.opacity,
            target_background: fill.to_string(),
        }
    }
}

/// Everything a renderer needs to paint the active step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub step_name: String,
    pub classes: String,
    /// Padded target box, once the target is confirmed.
    pub target: Option<TargetSize>,
    /// Popup position, once the popup has been measured.
    pub position: Option<PopupPosition>,
    pub backdrop: Backdrop,
}

struct Activation {
    name: String,
    token: CancelToken,
    options: StepOptions,
    element: Option<ElementRef>,
    view: StepView,
    place_timer: Option<TimerId>,
}

impl Activation {
    /// Schedule placement after `delay`, replacing any pending one.
    fn schedule_place(&mut self, delay: Duration, scheduler: &mut Scheduler<CoordinatorMsg>) {
        if let Some(pending) = self.place_timer.take() {
            scheduler.cancel(pending);
        }
        let id = scheduler.schedule_scoped(
            delay,
            self.token,
            CoordinatorMsg::Place {
                step: self.name.clone(),
            },
        );
        self.place_timer = Some(id);
    }
}

/// Waits for each step's target and positions its popup.
pub struct TargetCoordinator {
    settle_delay: Duration,
    target_retries: u32,
    measure_retry: Duration,
    registry: FxHashMap<String, ElementRef>,
    targets: Signal<Option<TargetReady>>,
    views: Signal<Option<StepView>>,
    active: Option<Activation>,
}

impl std::fmt::Debug for TargetCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut registered: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        registered.sort_unstable();
        f.debug_struct("TargetCoordinator")
            .field("registered", &registered)
            .field("active", &self.active.as_ref().map(|a| a.name.as_str()))
            .finish_non_exhaustive()
    }
}

impl TargetCoordinator {
    /// `targets` is the orchestrator's target signal; both sides write it.
    #[must_use]
    pub fn new(config: &TourConfig, targets: Signal<Option<TargetReady>>) -> Self {
        Self {
            settle_delay: config.settle_delay(),
            target_retries: config.target_retries,
            measure_retry: config.measure_retry(),
            registry: FxHashMap::default(),
            targets,
            views: Signal::new(None),
            active: None,
        }
    }

    /// Stream of step views for the renderer.
    #[must_use]
    pub fn view_signal(&self) -> Signal<Option<StepView>> {
        self.views.clone()
    }

    /// Name of the step this coordinator is currently serving.
    #[must_use]
    pub fn active_step(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    #[must_use]
    pub fn is_registered(&self, step_name: &str) -> bool {
        self.registry.contains_key(step_name)
    }

    #[must_use]
    pub fn registered_target(&self, step_name: &str) -> Option<ElementRef> {
        self.registry.get(step_name).cloned()
    }

    /// Register `element` as the target of `step_name`, replacing any
    /// earlier registration. Returns `true` when the step is active now.
    pub(crate) fn register_target(&mut self, step_name: &str, element: ElementRef) -> bool {
        self.registry.insert(step_name.to_string(), element);
        self.active_step() == Some(step_name)
    }

    pub(crate) fn unregister_target(&mut self, step_name: &str) -> Option<ElementRef> {
        self.registry.remove(step_name)
    }

    /// Start serving the orchestrator's newly active step.
    pub(crate) fn on_step_change(
        &mut self,
        tour: &TourOrchestrator,
        scheduler: &mut Scheduler<CoordinatorMsg>,
    ) {
        let outgoing = self.retire(scheduler);
        let Some(step) = tour.last_step() else {
            self.views.set(None);
            return;
        };

        let token = scheduler.token();
        let name = step.step_name.clone();
        let leaving = outgoing
            .as_ref()
            .or_else(|| tour.first_step().ok().map(|first| &first.options))
            .unwrap_or(&step.options);
        let view = StepView {
            step_name: name.clone(),
            classes: step_classes(leaving, AnimationPhase::Leaving, None),
            target: None,
            position: None,
            backdrop: Backdrop::pending(&step.options, &leaving.theme_color),
        };
        self.targets.set(None);
        self.views.publish(Some(view.clone()));

        let route_changed = tour.is_route_changed();
        let check_delay = if route_changed {
            step.options.delay + self.settle_delay
        } else {
            self.settle_delay
        };
        scheduler.schedule_scoped(
            check_delay,
            token,
            CoordinatorMsg::CheckTarget {
                step: name.clone(),
                retries: self.target_retries,
            },
        );
        if self.registry.contains_key(&name) {
            let notify_delay = if route_changed {
                step.options.delay
            } else {
                Duration::ZERO
            };
            scheduler.schedule_scoped(
                notify_delay,
                token,
                CoordinatorMsg::NotifyTarget { step: name.clone() },
            );
        }
        tracing::debug!(step = %name, route_changed, ?check_delay, "awaiting target");

        self.active = Some(Activation {
            name,
            token,
            options: step.options.clone(),
            element: None,
            view,
            place_timer: None,
        });
    }

    /// Drop the active step after the tour stopped.
    pub(crate) fn on_tour_stopped(&mut self, scheduler: &mut Scheduler<CoordinatorMsg>) {
        self.retire(scheduler);
        self.views.set(None);
    }

    /// Cancel the active step's timers; returns its options.
    fn retire(&mut self, scheduler: &mut Scheduler<CoordinatorMsg>) -> Option<StepOptions> {
        let active = self.active.take()?;
        scheduler.cancel_scope(active.token);
        Some(active.options)
    }

    /// Look for the step's target; decide what to do if it is missing.
    pub(crate) fn check_target(
        &mut self,
        step_name: &str,
        retries: u32,
        tour: &TourOrchestrator,
        scheduler: &mut Scheduler<CoordinatorMsg>,
    ) -> Option<CoordinatorAction> {
        let (step, token) = self.live_step(step_name, tour)?;
        if self.registry.contains_key(step_name) {
            return None;
        }
        if retries > 0 && tour.is_route_changed() {
            tracing::trace!(step = step_name, retries, "target not rendered yet, retrying");
            scheduler.schedule_scoped(
                step.options.delay,
                token,
                CoordinatorMsg::CheckTarget {
                    step: step_name.to_string(),
                    retries: retries - 1,
                },
            );
            return None;
        }

        tracing::warn!(step = step_name, "target is missing for step");
        if !step.options.continue_if_target_absent {
            return None;
        }
        if step.index + 1 < step.total {
            Some(CoordinatorAction::Advance)
        } else {
            tracing::warn!(
                step = step_name,
                "tour stopped: no target found for step or any later step"
            );
            Some(CoordinatorAction::Stop)
        }
    }

    /// Accept `element` as the active step's target, then place on the next
    /// tick.
    pub(crate) fn notify_target_ready(
        &mut self,
        step_name: &str,
        element: ElementRef,
        tour: &TourOrchestrator,
        host: &dyn PageHost,
        scheduler: &mut Scheduler<CoordinatorMsg>,
    ) {
        let Some((step, _)) = self.live_step(step_name, tour) else {
            tracing::debug!(step = step_name, "ignoring target for inactive step");
            return;
        };
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let target = measure(&element, host, &step.options);
        active.options = step.options.clone();
        active.element = Some(Rc::clone(&element));
        active.view.classes =
            step_classes(&step.options, AnimationPhase::Entering, Some(step_name));
        active.view.target = Some(target);
        active.view.backdrop.target_background = "transparent".to_string();
        tracing::debug!(step = step_name, ?target, "target ready");

        self.targets.publish(Some(TargetReady {
            step_name: step_name.to_string(),
            target: element,
        }));
        self.views.publish(Some(active.view.clone()));
        active.schedule_place(Duration::ZERO, scheduler);
    }

    /// Position the popup, retrying until it has been rendered.
    pub(crate) fn place(
        &mut self,
        step_name: &str,
        tour: &TourOrchestrator,
        host: &mut dyn PageHost,
        scheduler: &mut Scheduler<CoordinatorMsg>,
    ) {
        if self.live_step(step_name, tour).is_none() {
            return;
        }
        if let Some(active) = self.active.as_mut() {
            active.place_timer = None;
        }
        if !self.position_popup(host) {
            tracing::trace!(step = step_name, "popup not rendered yet");
            let retry = self.measure_retry;
            if let Some(active) = self.active.as_mut() {
                active.schedule_place(retry, scheduler);
            }
        }
    }

    /// Re-measure the confirmed target and re-place the popup.
    pub(crate) fn handle_resize(
        &mut self,
        tour: &TourOrchestrator,
        host: &mut dyn PageHost,
        scheduler: &mut Scheduler<CoordinatorMsg>,
    ) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(element) = active.element.clone() else {
            return;
        };
        if !tour.is_started() {
            return;
        }
        active.view.target = Some(measure(&element, host, &active.options));
        if let Some(pending) = active.place_timer.take() {
            scheduler.cancel(pending);
        }
        if !self.position_popup(host) {
            let retry = self.measure_retry;
            if let Some(active) = self.active.as_mut() {
                active.schedule_place(retry, scheduler);
            }
        }
    }

    /// The active step named `step_name`, if the tour is still on it.
    fn live_step<'t>(
        &self,
        step_name: &str,
        tour: &'t TourOrchestrator,
    ) -> Option<(&'t Step, CancelToken)> {
        let active = self.active.as_ref().filter(|a| a.name == step_name)?;
        if !tour.is_started() {
            return None;
        }
        let step = tour.last_step().filter(|s| s.step_name == step_name)?;
        Some((step, active.token))
    }

    /// Compute and publish the popup position. `false` if the popup has no
    /// size yet.
    fn position_popup(&mut self, host: &mut dyn PageHost) -> bool {
        let Some(active) = self.active.as_mut() else {
            return true;
        };
        let Some(target) = active.view.target else {
            return true;
        };
        let Some(popup) = host.popup_size() else {
            return false;
        };
        let options = &active.options;
        let position = place(options.placement, Some(&target), popup, host.viewport());
        active.view.position = Some(position);
        self.views.publish(Some(active.view.clone()));
        tracing::debug!(step = %active.name, ?position, "popup placed");

        if options.autofocus && !host.focus(PopupControl::Next) {
            host.focus(PopupControl::Done);
        }
        if options.scroll_to {
            host.scroll_to(scroll_request(
                options.placement,
                &target,
                popup.height,
                options.fixed,
                options.scroll_behavior(),
            ));
        }
        true
    }
}

fn measure(element: &ElementRef, host: &dyn PageHost, options: &StepOptions) -> TargetSize {
    TargetSize::resolve(
        &element.client_rect(),
        &host.body_rect(),
        &host.page_extents(),
    )
    .padded(options.step_target_resize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::Placement;

    #[test]
    fn classes_for_entering_step() {
        let options = StepOptions {
            class_name: "hint".into(),
            placement: Placement::Top,
            ..StepOptions::default()
        };
        assert_eq!(
            step_classes(&options, AnimationPhase::Entering, Some("intro")),
            "with-arrow hint pos-top animation-on intro"
        );
    }

    #[test]
    fn classes_for_leaving_step_have_no_name() {
        assert_eq!(
            step_classes(&StepOptions::default(), AnimationPhase::Leaving, None),
            "with-arrow pos-down fade-on"
        );
    }

    #[test]
    fn empty_parts_are_dropped() {
        let options = StepOptions {
            arrow_to_target: false,
            animated_step: false,
            placement: Placement::LeftCenter,
            ..StepOptions::default()
        };
        assert_eq!(
            step_classes(&options, AnimationPhase::Entering, Some("s")),
            "pos-left-center s"
        );
        assert_eq!(
            step_classes(&options, AnimationPhase::Leaving, None),
            "pos-left-center"
        );
    }

    #[test]
    fn pending_backdrop_fills_target_with_given_color() {
        let backdrop = Backdrop::pending(&StepOptions::default(), "black");
        assert_eq!(backdrop.theme_color, "rgb(20, 60, 60)");
        assert_eq!(backdrop.target_background, "black");
        assert!(backdrop.enabled);
        assert!((backdrop.opacity - 0.7).abs() < f64::EPSILON);
    }
}
