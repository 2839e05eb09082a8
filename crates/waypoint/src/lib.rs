#![forbid(unsafe_code)]

//! Guided-tour orchestration.
//!
//! A tour walks the user through named steps. Each step highlights a target
//! element with a positioned popup over a dimmed backdrop. This crate owns
//! the parts that decide *what* is shown and *where*:
//!
//! - [`StepCatalog`]: validated steps with merged options and resolved text.
//! - [`TourOrchestrator`]: the step state machine, history, and lifecycle
//!   hooks.
//! - [`TargetCoordinator`]: waits for each step's target element, retries
//!   after route changes, skips or stops when a target never appears.
//! - [`TourController`]: the session object a host drives.
//!
//! Painting, routing, and measuring stay with the host behind the
//! [`Router`] and [`PageHost`] traits.
//!
//! # Example
//!
//! ```ignore
//! use waypoint::{TourConfig, TourController, TourDefinition};
//!
//! let mut tour = TourController::new(TourConfig::default(), router, page);
//! tour.register_target("search", search_box);
//! tour.start_tour(TourDefinition::from_json(TOUR_JSON)?)?;
//! tour.advance_time(Duration::from_millis(16));
//! ```

pub mod catalog;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod definition;
pub mod error;
pub mod host;
#[cfg(feature = "logging")]
pub mod logging;
pub mod options;
pub mod orchestrator;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use catalog::{Step, StepCatalog, StepRef};
pub use config::TourConfig;
pub use controller::TourController;
pub use coordinator::{AnimationPhase, Backdrop, StepView, TargetCoordinator, step_classes};
pub use definition::{StepDefinition, TourDefinition, TourEventArgs, TourEventKind, TourHooks};
pub use error::TourError;
pub use host::{ElementRef, NoRouter, PageHost, PopupControl, Router, TargetElement, TargetReady};
pub use options::{StepOptions, StepOptionsPatch};
pub use orchestrator::TourOrchestrator;

pub use waypoint_core::{
    ClientRect, PageExtents, Padding, Placement, PopupPosition, PopupSize, ScrollBehavior,
    ScrollRequest, TargetSize, Viewport,
};
pub use waypoint_i18n::{ControlButtons, ControlLabels, LocaleMap, LocalizationFailure, TextSource};
pub use waypoint_runtime::{MonotonicClock, Signal, Subscription};
