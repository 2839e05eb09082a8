//! Tour lifecycle state machine.
//!
//! ```text
//!            start_tour                 stop_tour
//!   Idle ─────────────────▶ Running ─────────────────▶ Idle
//!                           │    ▲
//!                           └────┘ next_step / prev_step
//! ```
//!
//! The current step is always `steps[history.last()]`. Every transition
//! appends to the history and publishes the step name on the step signal,
//! in the order the transitions happen.
//!
//! # Invariants
//!
//! 1. `is_started()` implies a non-empty history.
//! 2. After `stop_tour`, history and catalog are empty and both the step and
//!    target signals hold `None`.
//! 3. A failed call leaves every field and signal untouched.
//! 4. Hooks fire before the transition they announce.
//!
//! # Failure Modes
//!
//! | Call | Condition | Result |
//! |------|-----------|--------|
//! | `start_tour` | already running | [`TourError::AlreadyStarted`] |
//! | `start_tour` | no steps | [`TourError::EmptyTour`] |
//! | `start_tour` | bad placement | [`TourError::InvalidPlacement`] |
//! | `next_step` / `prev_step` | idle | [`TourError::NotStarted`] |
//! | `next_step` | on last step | [`TourError::AtLastStep`] |
//! | `prev_step` | on first step | [`TourError::AtFirstStep`] |

use crate::catalog::{Step, StepCatalog, StepRef};
use crate::config::TourConfig;
use crate::definition::{TourDefinition, TourEventArgs, TourEventKind, TourHooks};
use crate::error::TourError;
use crate::host::{Router, TargetReady};
use crate::options::StepOptionsPatch;
use waypoint_runtime::Signal;

/// Owns the step sequence, history, and lifecycle of one tour at a time.
pub struct TourOrchestrator {
    config: TourConfig,
    catalog: StepCatalog,
    presets: StepOptionsPatch,
    history: Vec<usize>,
    started: bool,
    route_changed: bool,
    hooks: TourHooks,
    router: Box<dyn Router>,
    steps: Signal<Option<String>>,
    targets: Signal<Option<TargetReady>>,
}

impl std::fmt::Debug for TourOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourOrchestrator")
            .field("started", &self.started)
            .field("history", &self.history)
            .field("route_changed", &self.route_changed)
            .field("steps", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl TourOrchestrator {
    #[must_use]
    pub fn new(config: TourConfig, router: impl Router + 'static) -> Self {
        Self {
            config,
            catalog: StepCatalog::default(),
            presets: StepOptionsPatch::default(),
            history: Vec::new(),
            started: false,
            route_changed: false,
            hooks: TourHooks::default(),
            router: Box::new(router),
            steps: Signal::new(None),
            targets: Signal::new(None),
        }
    }

    /// Validate, build, and activate the first step.
    pub fn start_tour(&mut self, tour: TourDefinition) -> Result<(), TourError> {
        if self.started {
            return Err(TourError::AlreadyStarted);
        }
        if tour.steps.is_empty() {
            return Err(TourError::EmptyTour);
        }
        StepCatalog::validate(&tour, &self.presets)?;

        let TourDefinition {
            steps,
            tour_options,
            without_logs,
            ctrl_btns,
            mut events,
        } = tour;
        let catalog = StepCatalog::build(
            steps,
            &self.presets,
            tour_options.as_ref(),
            ctrl_btns.as_ref(),
            &self.config.localizer(),
        )?;

        events.fire(&TourEventArgs {
            kind: TourEventKind::TourStart,
            step: None,
            history: Vec::new(),
            steps: catalog.names(),
        });

        self.hooks = events;
        self.catalog = catalog;
        self.history.clear();
        tracing::info!(steps = self.catalog.len(), locale = %self.config.locale, "tour started");
        if !without_logs {
            for step in self.catalog.iter() {
                tracing::info!(
                    index = step.index,
                    step = %step.step_name,
                    route = step.route.as_deref().unwrap_or(""),
                    placement = %step.options.placement,
                    "tour step"
                );
            }
        }
        self.advance_to(0);
        self.started = true;
        Ok(())
    }

    /// Advance to the step after the current one.
    pub fn next_step(&mut self) -> Result<(), TourError> {
        let current = self.current_index()?;
        let target = current + 1;
        if target >= self.catalog.len() {
            return Err(TourError::AtLastStep);
        }
        self.fire(TourEventKind::Next, Some(target));
        self.advance_to(target);
        Ok(())
    }

    /// Go back to the step before the current one.
    pub fn prev_step(&mut self) -> Result<(), TourError> {
        let current = self.current_index()?;
        let Some(target) = current.checked_sub(1) else {
            return Err(TourError::AtFirstStep);
        };
        self.fire(TourEventKind::Prev, Some(target));
        self.advance_to(target);
        Ok(())
    }

    /// End the tour. `tourEnd` fires if the last step was reached, otherwise
    /// `tourBreak`. Stopping an idle orchestrator only re-asserts the
    /// cleared state.
    pub fn stop_tour(&mut self) {
        if let Some(index) = self.last_step().map(|step| step.index) {
            let kind = if index + 1 == self.catalog.len() {
                TourEventKind::TourEnd
            } else {
                TourEventKind::TourBreak
            };
            self.fire(kind, Some(index));
            tracing::info!(step = index, event = kind.as_str(), "tour stopped");
            self.started = false;
            self.catalog.clear();
            self.history.clear();
            self.route_changed = false;
            self.steps.publish(None);
            self.targets.publish(None);
            return;
        }
        self.started = false;
        self.catalog.clear();
        self.route_changed = false;
        self.steps.set(None);
        self.targets.set(None);
    }

    fn current_index(&self) -> Result<usize, TourError> {
        if !self.started {
            return Err(TourError::NotStarted);
        }
        self.last_step()
            .map(|step| step.index)
            .ok_or(TourError::NotStarted)
    }

    fn fire(&mut self, kind: TourEventKind, step: Option<usize>) {
        self.hooks.fire(&TourEventArgs {
            kind,
            step,
            history: self.history.clone(),
            steps: self.catalog.names(),
        });
    }

    /// Activate `index`. Callers guarantee it is in range.
    fn advance_to(&mut self, index: usize) {
        let previous_route = self.last_step().and_then(|step| step.route.clone());
        let Some(step) = self.catalog.by_index(index) else {
            return;
        };
        let name = step.step_name.clone();
        let route = step.route.clone();

        self.route_changed = previous_route != route;
        self.history.push(index);
        if let Some(route) = route.as_deref()
            && self.route_changed
        {
            tracing::debug!(route, step = %name, "navigating for step");
            self.router.navigate(route);
        }
        tracing::debug!(index, step = %name, route_changed = self.route_changed, "step activated");
        self.steps.publish(Some(name));
    }

    /// Visited indices, oldest first.
    #[must_use]
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// The active step, or `None` when idle.
    #[must_use]
    pub fn last_step(&self) -> Option<&Step> {
        self.history
            .last()
            .and_then(|&index| self.catalog.by_index(index))
    }

    /// Whether the last transition crossed a route boundary.
    #[must_use]
    pub fn is_route_changed(&self) -> bool {
        self.route_changed
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn step_by_name(&self, name: &str) -> Result<&Step, TourError> {
        self.catalog
            .by_name(name)
            .ok_or_else(|| TourError::UnknownStep(name.to_string()))
    }

    pub fn step_by_index(&self, index: usize) -> Result<&Step, TourError> {
        self.catalog
            .by_index(index)
            .ok_or(TourError::StepIndexOutOfRange {
                index,
                len: self.catalog.len(),
            })
    }

    /// The first step, the default lookup.
    pub fn first_step(&self) -> Result<&Step, TourError> {
        self.step_by_index(0)
    }

    /// Replace a step of the running tour.
    pub fn reset_step<'a>(&mut self, at: impl Into<StepRef<'a>>, step: Step) -> Result<(), TourError> {
        self.catalog.reset(at.into(), step)
    }

    /// Options layered between the built-in defaults and `tourOptions` of
    /// tours started after this call.
    pub fn set_presets(&mut self, presets: StepOptionsPatch) {
        self.presets = presets;
    }

    #[must_use]
    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    /// Active step name stream. Replays the current value on subscribe.
    #[must_use]
    pub fn step_signal(&self) -> Signal<Option<String>> {
        self.steps.clone()
    }

    /// Ready-target stream, cleared when the tour stops.
    #[must_use]
    pub fn target_signal(&self) -> Signal<Option<TargetReady>> {
        self.targets.clone()
    }
}
