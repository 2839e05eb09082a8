//! Errors returned by the public tour control surface.
//!
//! Precondition failures never change tour state. Nothing here is ever sent
//! through the step or target signals; delayed work reports problems as
//! logged warnings instead.

use waypoint_i18n::I18nError;

/// Errors from starting, stepping, or editing a tour.
#[derive(Debug, thiserror::Error)]
pub enum TourError {
    /// A placement option names no known placement.
    ///
    /// `step` is `None` when the bad value came from `tourOptions` or the
    /// presets.
    #[error("invalid placement '{value}'{}", in_step(.step))]
    InvalidPlacement { step: Option<String>, value: String },
    /// The tour has no steps.
    #[error("tour has no steps")]
    EmptyTour,
    /// `start_tour` while another tour is running.
    #[error("a tour is already running")]
    AlreadyStarted,
    /// Stepping with no active step.
    #[error("no tour is running")]
    NotStarted,
    /// `prev_step` on the first step.
    #[error("already at the first step")]
    AtFirstStep,
    /// `next_step` on the last step.
    #[error("already at the last step")]
    AtLastStep,
    /// No step with this name.
    #[error("unknown step '{0}'")]
    UnknownStep(String),
    /// Step index past the end of the catalog.
    #[error("step index {index} out of range for {len} steps")]
    StepIndexOutOfRange { index: usize, len: usize },
    /// Text failed to resolve under the fail-fast policy.
    #[error("localization failed: {0}")]
    Localization(#[from] I18nError),
    /// The tour JSON did not match the definition format.
    #[error("invalid tour definition: {0}")]
    InvalidDefinition(#[from] serde_json::Error),
}

fn in_step(step: &Option<String>) -> String {
    step.as_deref()
        .map(|name| format!(" in step '{name}'"))
        .unwrap_or_default()
}
