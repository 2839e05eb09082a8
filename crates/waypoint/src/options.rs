//! Step options and their layered merge.
//!
//! Options resolve in four layers, later layers winning field by field:
//!
//! ```text
//! built-in defaults < presets < tourOptions < step options
//! ```
//!
//! A [`StepOptionsPatch`] is one layer as written in a tour definition; every
//! field is optional. [`StepOptions`] is the fully merged result attached to
//! each catalog step.
//!
//! # Invariants
//!
//! 1. Applying an empty patch is the identity.
//! 2. A merged `placement` is always a valid [`Placement`]: patches carry the
//!    raw string and are validated before any layer is applied.

use crate::error::TourError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use waypoint_core::{Padding, Placement, ScrollBehavior};

/// Fully resolved options for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOptions {
    pub class_name: String,
    pub continue_if_target_absent: bool,
    pub without_counter: bool,
    pub without_prev: bool,
    pub custom_template: bool,
    pub smooth_scroll: bool,
    pub scroll_to: bool,
    pub theme_color: String,
    pub opacity: f64,
    pub placement: Placement,
    pub arrow_to_target: bool,
    pub step_target_resize: Padding,
    /// Wait for a routed step to render, and between target lookups.
    pub delay: Duration,
    pub animated_step: bool,
    pub fixed: bool,
    pub backdrop: bool,
    pub min_width: String,
    pub min_height: String,
    pub max_width: String,
    pub max_height: String,
    pub autofocus: bool,
    pub close_on_click_outside: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            class_name: String::new(),
            continue_if_target_absent: true,
            without_counter: false,
            without_prev: false,
            custom_template: false,
            smooth_scroll: false,
            scroll_to: true,
            theme_color: "rgb(20, 60, 60)".to_string(),
            opacity: 0.7,
            placement: Placement::Down,
            arrow_to_target: true,
            step_target_resize: Padding::uniform(0),
            delay: Duration::from_millis(1000),
            animated_step: true,
            fixed: false,
            backdrop: true,
            min_width: "250px".to_string(),
            min_height: "150px".to_string(),
            max_width: "400px".to_string(),
            max_height: "600px".to_string(),
            autofocus: true,
            close_on_click_outside: false,
        }
    }
}

impl StepOptions {
    /// Overlay `patch` onto these options.
    ///
    /// Fails only on an unparseable placement; callers validate first, so
    /// on that path the error carries no step name.
    pub fn apply(&mut self, patch: &StepOptionsPatch) -> Result<(), TourError> {
        if let Some(placement) = patch.parsed_placement()? {
            self.placement = placement;
        }
        let p = patch.clone();
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = p.$field {
                    self.$field = value;
                })*
            };
        }
        overlay!(
            class_name,
            continue_if_target_absent,
            without_counter,
            without_prev,
            custom_template,
            smooth_scroll,
            scroll_to,
            theme_color,
            opacity,
            arrow_to_target,
            step_target_resize,
            animated_step,
            fixed,
            backdrop,
            min_width,
            min_height,
            max_width,
            max_height,
            autofocus,
            close_on_click_outside,
        );
        if let Some(ms) = p.delay {
            self.delay = Duration::from_millis(ms);
        }
        Ok(())
    }

    /// Scroll animation requested by `smoothScroll`.
    #[must_use]
    pub fn scroll_behavior(&self) -> ScrollBehavior {
        if self.smooth_scroll {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        }
    }
}

/// One layer of options as written in a tour definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepOptionsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_if_target_absent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub without_counter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub without_prev: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_template: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth_scroll: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_to: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Raw placement name; checked by tour validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_to_target: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_target_resize: Option<Padding>,
    /// Milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animated_step: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autofocus: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_on_click_outside: Option<bool>,
}

impl StepOptionsPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn placement(mut self, placement: impl Into<String>) -> Self {
        self.placement = Some(placement.into());
        self
    }

    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Some(ms);
        self
    }

    #[must_use]
    pub fn continue_if_target_absent(mut self, enabled: bool) -> Self {
        self.continue_if_target_absent = Some(enabled);
        self
    }

    #[must_use]
    pub fn custom_template(mut self, enabled: bool) -> Self {
        self.custom_template = Some(enabled);
        self
    }

    #[must_use]
    pub fn step_target_resize(mut self, padding: Padding) -> Self {
        self.step_target_resize = Some(padding);
        self
    }

    #[must_use]
    pub fn animated_step(mut self, enabled: bool) -> Self {
        self.animated_step = Some(enabled);
        self
    }

    #[must_use]
    pub fn arrow_to_target(mut self, enabled: bool) -> Self {
        self.arrow_to_target = Some(enabled);
        self
    }

    #[must_use]
    pub fn theme_color(mut self, color: impl Into<String>) -> Self {
        self.theme_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn scroll_to(mut self, enabled: bool) -> Self {
        self.scroll_to = Some(enabled);
        self
    }

    #[must_use]
    pub fn smooth_scroll(mut self, enabled: bool) -> Self {
        self.smooth_scroll = Some(enabled);
        self
    }

    #[must_use]
    pub fn fixed(mut self, enabled: bool) -> Self {
        self.fixed = Some(enabled);
        self
    }

    #[must_use]
    pub fn autofocus(mut self, enabled: bool) -> Self {
        self.autofocus = Some(enabled);
        self
    }

    #[must_use]
    pub fn close_on_click_outside(mut self, enabled: bool) -> Self {
        self.close_on_click_outside = Some(enabled);
        self
    }

    /// The placement, parsed. `Ok(None)` when the layer does not set one.
    pub fn parsed_placement(&self) -> Result<Option<Placement>, TourError> {
        self.placement
            .as_deref()
            .map(|raw| {
                raw.parse().map_err(|_| TourError::InvalidPlacement {
                    step: None,
                    value: raw.to_string(),
                })
            })
            .transpose()
    }
}
