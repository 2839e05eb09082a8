//! Validated, ordered step catalog.
//!
//! # Invariants
//!
//! 1. `steps[i].index == i` and `steps[i].total == steps.len()` after
//!    [`StepCatalog::build`] and after every [`StepCatalog::reset`].
//! 2. Every placement in a built catalog came from a validated layer.
//! 3. Step order is traversal order.
//!
//! # Failure Modes
//!
//! | Failure | Where | Behavior |
//! |---------|-------|----------|
//! | Unknown placement | [`StepCatalog::validate`] | Whole tour rejected, nothing built |
//! | Text not a string, `Substitute` | [`StepCatalog::build`] | Logged, `"Error"` shown |
//! | Text not a string, `FailFast` | [`StepCatalog::build`] | [`TourError::Localization`] |

use crate::definition::{StepDefinition, TourDefinition};
use crate::error::TourError;
use crate::options::{StepOptions, StepOptionsPatch};
use serde_json::{Map, Value};
use waypoint_i18n::{ControlButtons, ControlLabels, Localizer};

/// A step ready to run: options merged, text resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub step_name: String,
    pub route: Option<String>,
    pub index: usize,
    pub title: Option<String>,
    pub description: Option<String>,
    pub options: StepOptions,
    pub ctrl_btns: ControlLabels,
    pub total: usize,
    pub extra: Map<String, Value>,
}

impl Step {
    /// A bare step with default options, for [`StepCatalog::reset`].
    #[must_use]
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            route: None,
            index: 0,
            title: None,
            description: None,
            options: StepOptions::default(),
            ctrl_btns: ControlLabels::default(),
            total: 0,
            extra: Map::new(),
        }
    }

    /// One-based position and step count, as shown by the counter.
    #[must_use]
    pub fn counter(&self) -> (usize, usize) {
        (self.index + 1, self.total)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

/// Addresses a step by name or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRef<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for StepRef<'a> {
    fn from(name: &'a str) -> Self {
        StepRef::Name(name)
    }
}

impl From<usize> for StepRef<'_> {
    fn from(index: usize) -> Self {
        StepRef::Index(index)
    }
}

/// Ordered steps of the running tour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepCatalog {
    steps: Vec<Step>,
}

impl StepCatalog {
    /// Check every placement in the tour and in `presets`.
    ///
    /// Every layer is checked; the first bad value is reported.
    pub fn validate(tour: &TourDefinition, presets: &StepOptionsPatch) -> Result<(), TourError> {
        let located = |step: Option<&str>, err: TourError| match err {
            TourError::InvalidPlacement { value, .. } => TourError::InvalidPlacement {
                step: step.map(str::to_string),
                value,
            },
            other => other,
        };
        for step in &tour.steps {
            if let Some(options) = &step.options {
                options
                    .parsed_placement()
                    .map_err(|err| located(Some(&step.step_name), err))?;
            }
        }
        if let Some(options) = &tour.tour_options {
            options.parsed_placement().map_err(|err| located(None, err))?;
        }
        presets.parsed_placement().map_err(|err| located(None, err))?;
        Ok(())
    }

    /// Build the catalog for a validated tour.
    pub fn build(
        steps: Vec<StepDefinition>,
        presets: &StepOptionsPatch,
        tour_options: Option<&StepOptionsPatch>,
        ctrl_btns: Option<&ControlButtons>,
        localizer: &Localizer,
    ) -> Result<Self, TourError> {
        let mut base = StepOptions::default();
        base.apply(presets)?;
        if let Some(tour_options) = tour_options {
            base.apply(tour_options)?;
        }

        let builtin;
        let tour_buttons = match ctrl_btns {
            Some(buttons) => buttons,
            None => {
                builtin = ControlButtons::builtin();
                &builtin
            }
        };
        let tour_labels = tour_buttons.resolve(localizer)?;

        let total = steps.len();
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(index, def)| -> Result<Step, TourError> {
                let mut options = base.clone();
                if let Some(patch) = &def.options {
                    options.apply(patch)?;
                }
                let ctrl_btns = match &def.ctrl_btns {
                    Some(buttons) => buttons.resolve(localizer)?,
                    None => tour_labels.clone(),
                };
                Ok(Step {
                    title: def.title.as_ref().map(|t| localizer.resolve(t)).transpose()?,
                    description: def
                        .description
                        .as_ref()
                        .map(|d| localizer.resolve(d))
                        .transpose()?,
                    step_name: def.step_name,
                    route: def.route,
                    index,
                    options,
                    ctrl_btns,
                    total,
                    extra: def.extra,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// First step with this name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.step_name == name)
    }

    #[must_use]
    pub fn by_index(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// Step names in traversal order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.step_name.clone()).collect()
    }

    /// Replace one step in place. Placement is not revalidated; `index`
    /// and `total` are rewritten to match the slot.
    pub fn reset(&mut self, at: StepRef<'_>, mut step: Step) -> Result<(), TourError> {
        let len = self.steps.len();
        let index = match at {
            StepRef::Index(index) if index < len => index,
            StepRef::Index(index) => return Err(TourError::StepIndexOutOfRange { index, len }),
            StepRef::Name(name) => self
                .steps
                .iter()
                .position(|s| s.step_name == name)
                .ok_or_else(|| TourError::UnknownStep(name.to_string()))?,
        };
        step.index = index;
        step.total = len;
        self.steps[index] = step;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}
