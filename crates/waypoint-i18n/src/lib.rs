#![forbid(unsafe_code)]

//! Internationalization (i18n) for Waypoint tours.
//!
//! Tour definitions carry display text either as a plain string or as a map
//! keyed by locale tag. This crate resolves those maps against the host's
//! locale with a fixed fallback policy, and ships the built-in control
//! button labels.

pub mod labels;
pub mod text;

pub use labels::{ControlButtons, ControlLabels};
pub use text::{
    I18nError, Locale, LocaleMap, LocalizationFailure, Localizer, SUBSTITUTE_TEXT, TextSource,
    language_prefix, resolve_localized,
};
