//! Runtime configuration for a tour controller.
//!
//! Everything here has a default, so an empty JSON object is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use waypoint_i18n::{LocalizationFailure, Localizer};

/// Controller-wide settings that do not belong to any one tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Locale tag used to resolve step text and button labels.
    pub locale: String,
    /// What happens when localized text does not resolve to a string.
    pub localization_failure: LocalizationFailure,
    /// Wait before looking up a target when the route did not change.
    pub settle_delay_ms: u64,
    /// Extra target lookups after a route change.
    pub target_retries: u32,
    /// Wait between attempts to measure a popup that is not rendered yet.
    pub measure_retry_ms: u64,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            locale: "en-EN".to_string(),
            localization_failure: LocalizationFailure::Substitute,
            settle_delay_ms: 100,
            target_retries: 2,
            measure_retry_ms: 100,
        }
    }
}

impl TourConfig {
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    #[must_use]
    pub fn with_localization_failure(mut self, policy: LocalizationFailure) -> Self {
        self.localization_failure = policy;
        self
    }

    #[must_use]
    pub fn with_settle_delay_ms(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_target_retries(mut self, retries: u32) -> Self {
        self.target_retries = retries;
        self
    }

    #[must_use]
    pub fn with_measure_retry_ms(mut self, ms: u64) -> Self {
        self.measure_retry_ms = ms;
        self
    }

    pub(crate) fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub(crate) fn measure_retry(&self) -> Duration {
        Duration::from_millis(self.measure_retry_ms)
    }

    pub(crate) fn localizer(&self) -> Localizer {
        Localizer::new(self.locale.clone()).on_failure(self.localization_failure)
    }
}
