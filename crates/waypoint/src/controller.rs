//! The tour session a host application talks to.
//!
//! [`TourController`] wires the [`TourOrchestrator`] to the
//! [`TargetCoordinator`] and owns the timer queue both rely on. The host
//! drives time explicitly with [`TourController::advance_time`] (or
//! [`TourController::tick`] with a wall clock), forwards page events, and
//! registers target elements as its views mount and unmount.
//!
//! # Example
//!
//! ```ignore
//! let mut tour = TourController::new(TourConfig::default(), router, page);
//! tour.register_target("search", search_box);
//! tour.start_tour(TourDefinition::from_json(json)?)?;
//! // every frame:
//! tour.tick(&mut clock);
//! ```

use crate::catalog::{Step, StepRef};
use crate::config::TourConfig;
use crate::coordinator::{CoordinatorAction, CoordinatorMsg, StepView, TargetCoordinator};
use crate::definition::TourDefinition;
use crate::error::TourError;
use crate::host::{ElementRef, PageHost, Router, TargetReady};
use crate::options::StepOptionsPatch;
use crate::orchestrator::TourOrchestrator;
use std::time::Duration;
use waypoint_runtime::{MonotonicClock, Scheduler, Signal};

/// One tour session bound to one page.
pub struct TourController<H> {
    tour: TourOrchestrator,
    coordinator: TargetCoordinator,
    scheduler: Scheduler<CoordinatorMsg>,
    host: H,
}

impl<H> std::fmt::Debug for TourController<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourController")
            .field("tour", &self.tour)
            .field("coordinator", &self.coordinator)
            .field("now", &self.scheduler.now())
            .field("pending_timers", &self.scheduler.pending())
            .finish_non_exhaustive()
    }
}

impl<H: PageHost> TourController<H> {
    #[must_use]
    pub fn new(config: TourConfig, router: impl Router + 'static, host: H) -> Self {
        let tour = TourOrchestrator::new(config, router);
        let coordinator = TargetCoordinator::new(tour.config(), tour.target_signal());
        Self {
            tour,
            coordinator,
            scheduler: Scheduler::new(),
            host,
        }
    }

    // --- lifecycle ---

    /// Validate and start `definition` at its first step.
    pub fn start_tour(&mut self, definition: TourDefinition) -> Result<(), TourError> {
        self.tour.start_tour(definition)?;
        self.coordinator.on_step_change(&self.tour, &mut self.scheduler);
        Ok(())
    }

    pub fn next_step(&mut self) -> Result<(), TourError> {
        self.tour.next_step()?;
        self.coordinator.on_step_change(&self.tour, &mut self.scheduler);
        Ok(())
    }

    pub fn prev_step(&mut self) -> Result<(), TourError> {
        self.tour.prev_step()?;
        self.coordinator.on_step_change(&self.tour, &mut self.scheduler);
        Ok(())
    }

    /// Stop the tour and cancel every pending step timer.
    pub fn stop_tour(&mut self) {
        self.tour.stop_tour();
        self.coordinator.on_tour_stopped(&mut self.scheduler);
    }

    /// Close button or equivalent. Reports `tourEnd` on the last step and
    /// `tourBreak` elsewhere.
    pub fn close(&mut self) {
        self.stop_tour();
    }

    // --- page events ---

    /// A click landed outside the popup. Closes the tour when the current
    /// step opts in; returns whether it did.
    pub fn handle_click_outside(&mut self) -> bool {
        let close = self
            .tour
            .last_step()
            .is_some_and(|step| step.options.close_on_click_outside);
        if close {
            self.close();
        }
        close
    }

    /// The window was resized: re-measure the target and re-place.
    pub fn handle_resize(&mut self) {
        self.coordinator
            .handle_resize(&self.tour, &mut self.host, &mut self.scheduler);
    }

    // --- targets ---

    /// Register the element that highlights `step_name`. If that step is
    /// active it is notified immediately.
    pub fn register_target(&mut self, step_name: &str, element: ElementRef) {
        if self
            .coordinator
            .register_target(step_name, ElementRef::clone(&element))
        {
            self.notify_target_ready(step_name, element);
        }
    }

    pub fn unregister_target(&mut self, step_name: &str) -> Option<ElementRef> {
        self.coordinator.unregister_target(step_name)
    }

    /// Report that `element` for `step_name` now exists. Ignored unless that
    /// step is the active one.
    pub fn notify_target_ready(&mut self, step_name: &str, element: ElementRef) {
        self.coordinator.notify_target_ready(
            step_name,
            element,
            &self.tour,
            &self.host,
            &mut self.scheduler,
        );
    }

    // --- time ---

    /// Move virtual time forward by `dt`, running every timer that falls
    /// due in deadline order.
    pub fn advance_time(&mut self, dt: Duration) {
        let until = self.scheduler.now().saturating_add(dt);
        while let Some(message) = self.scheduler.pop_due(until) {
            self.dispatch(message);
        }
        self.scheduler.settle(until);
    }

    /// Advance by the wall time elapsed since the previous tick.
    pub fn tick(&mut self, clock: &mut MonotonicClock) {
        self.advance_time(clock.tick());
    }

    /// Time until the next pending timer, if any.
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.scheduler
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.scheduler.now()))
    }

    /// Virtual time elapsed since the controller was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    fn dispatch(&mut self, message: CoordinatorMsg) {
        match message {
            CoordinatorMsg::CheckTarget { step, retries } => {
                let action =
                    self.coordinator
                        .check_target(&step, retries, &self.tour, &mut self.scheduler);
                match action {
                    Some(CoordinatorAction::Advance) => {
                        if let Err(err) = self.next_step() {
                            tracing::warn!(step = %step, error = %err, "could not skip missing target");
                        }
                    }
                    Some(CoordinatorAction::Stop) => self.stop_tour(),
                    None => {}
                }
            }
            CoordinatorMsg::NotifyTarget { step } => {
                if let Some(element) = self.coordinator.registered_target(&step) {
                    self.notify_target_ready(&step, element);
                }
            }
            CoordinatorMsg::Place { step } => {
                self.coordinator
                    .place(&step, &self.tour, &mut self.host, &mut self.scheduler);
            }
        }
    }

    // --- queries ---

    #[must_use]
    pub fn orchestrator(&self) -> &TourOrchestrator {
        &self.tour
    }

    #[must_use]
    pub fn coordinator(&self) -> &TargetCoordinator {
        &self.coordinator
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.tour.is_started()
    }

    #[must_use]
    pub fn history(&self) -> &[usize] {
        self.tour.history()
    }

    #[must_use]
    pub fn last_step(&self) -> Option<&Step> {
        self.tour.last_step()
    }

    #[must_use]
    pub fn is_route_changed(&self) -> bool {
        self.tour.is_route_changed()
    }

    pub fn step_by_name(&self, name: &str) -> Result<&Step, TourError> {
        self.tour.step_by_name(name)
    }

    pub fn step_by_index(&self, index: usize) -> Result<&Step, TourError> {
        self.tour.step_by_index(index)
    }

    pub fn reset_step<'a>(&mut self, at: impl Into<StepRef<'a>>, step: Step) -> Result<(), TourError> {
        self.tour.reset_step(at, step)
    }

    pub fn set_presets(&mut self, presets: StepOptionsPatch) {
        self.tour.set_presets(presets);
    }

    #[must_use]
    pub fn step_signal(&self) -> Signal<Option<String>> {
        self.tour.step_signal()
    }

    #[must_use]
    pub fn target_signal(&self) -> Signal<Option<TargetReady>> {
        self.tour.target_signal()
    }

    #[must_use]
    pub fn view_signal(&self) -> Signal<Option<StepView>> {
        self.coordinator.view_signal()
    }
}
