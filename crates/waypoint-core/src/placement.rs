#![forbid(unsafe_code)]

//! Popup placement relative to a target box or the viewport.
//!
//! # Placement table
//!
//! `w`/`h` are the popup's measured width and height (rounded first).
//!
//! | Placement | Position |
//! |-----------|----------|
//! | `down` | `top = target.bottom + 20`, `left = target.left - w/2` |
//! | `top` | `top = target.top - h - 20`, `left = target.left - w/2` |
//! | `left` | `left = target.left - w - 20`, `top = target.top` |
//! | `right` | `left = target.right + target.width + 20`, `top = target.top` |
//! | `left-top` | `left = target.left - w - 20`, `top = target.top - h + 50` |
//! | `right-top` | `left = target.right + target.width + 20`, `top = target.top - h + 50` |
//! | `center` | `left = vw/2 - w/2`, `top = vh/2 - h/2` |
//! | `left-center` | `left = 50`, `top = vh/2 - h/2` |
//! | `right-center` | `right = 50`, `top = vh/2 - h/2` |
//!
//! # Invariants
//!
//! 1. Every coordinate is rounded half-up to an integer.
//! 2. Target-relative placements without a target fall back to `center`.
//! 3. Window-relative placements ignore the target entirely.

use crate::geometry::{TargetSize, round_half_up};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Gap between a target edge and the popup.
pub const TARGET_GAP: i32 = 20;
/// How far corner placements overlap the target vertically.
pub const CORNER_OVERLAP: i32 = 50;
/// Inset from the viewport edge for side-centered placements.
pub const WINDOW_INSET: i32 = 50;
/// Space left above the target when scrolling it into view.
pub const SCROLL_MARGIN: i32 = 100;
/// Space left above a `top` popup when scrolling it into view.
pub const TOP_SCROLL_MARGIN: i32 = 50;

/// Named popup placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    Top,
    #[default]
    Down,
    Left,
    Right,
    Center,
    LeftCenter,
    RightCenter,
    LeftTop,
    RightTop,
}

impl Placement {
    /// Every placement, in table order.
    pub const ALL: [Placement; 9] = [
        Placement::Top,
        Placement::Down,
        Placement::Left,
        Placement::Right,
        Placement::Center,
        Placement::LeftCenter,
        Placement::RightCenter,
        Placement::LeftTop,
        Placement::RightTop,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::Down => "down",
            Placement::Left => "left",
            Placement::Right => "right",
            Placement::Center => "center",
            Placement::LeftCenter => "left-center",
            Placement::RightCenter => "right-center",
            Placement::LeftTop => "left-top",
            Placement::RightTop => "right-top",
        }
    }

    /// Whether the popup is anchored to the target rather than the window.
    #[must_use]
    pub const fn is_target_relative(self) -> bool {
        !matches!(
            self,
            Placement::Center | Placement::LeftCenter | Placement::RightCenter
        )
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placement name outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown placement '{0}'")]
pub struct PlacementParseError(pub String);

impl FromStr for Placement {
    type Err = PlacementParseError;

    /// Names match case-insensitively, without surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Placement::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PlacementParseError(s.to_string()))
    }
}

impl Serialize for Placement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Placement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Measured popup size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PopupSize {
    pub width: f64,
    pub height: f64,
}

impl PopupSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Inner size of the browser window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Anchored popup position. Only the edges a placement uses are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopupPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<i32>,
}

impl PopupPosition {
    /// Anchored by its top-left corner.
    #[must_use]
    pub const fn top_left(top: i32, left: i32) -> Self {
        Self {
            top: Some(top),
            left: Some(left),
            right: None,
            bottom: None,
        }
    }

    /// Anchored by its top-right corner (distance from the right edge).
    #[must_use]
    pub const fn top_right(top: i32, right: i32) -> Self {
        Self {
            top: Some(top),
            left: None,
            right: Some(right),
            bottom: None,
        }
    }

    /// Off-screen parking spot used before the first measurement.
    #[must_use]
    pub const fn offscreen() -> Self {
        Self::top_left(-500, -500)
    }
}

/// Compute the popup position for `placement`.
///
/// `target` is `None` when the step has no confirmed target; target-relative
/// placements then fall back to the viewport center.
#[must_use]
pub fn place(
    placement: Placement,
    target: Option<&TargetSize>,
    popup: PopupSize,
    viewport: Viewport,
) -> PopupPosition {
    let w = round_half_up(popup.width);
    let h = round_half_up(popup.height);

    let Some(target) = target.filter(|_| placement.is_target_relative()) else {
        return window_position(placement, w, h, viewport);
    };

    let centered_left = round_half_up(f64::from(target.left) - f64::from(w) / 2.0);
    let beside_left = target.left.saturating_sub(w).saturating_sub(TARGET_GAP);
    let beside_right = target
        .right
        .saturating_add(target.width)
        .saturating_add(TARGET_GAP);
    let corner_top = target.top.saturating_sub(h).saturating_add(CORNER_OVERLAP);

    match placement {
        Placement::Down => PopupPosition::top_left(target.bottom.saturating_add(TARGET_GAP), centered_left),
        Placement::Top => PopupPosition::top_left(
            target.top.saturating_sub(h).saturating_sub(TARGET_GAP),
            centered_left,
        ),
        Placement::Left => PopupPosition::top_left(target.top, beside_left),
        Placement::Right => PopupPosition::top_left(target.top, beside_right),
        Placement::LeftTop => PopupPosition::top_left(corner_top, beside_left),
        Placement::RightTop => PopupPosition::top_left(corner_top, beside_right),
        Placement::Center | Placement::LeftCenter | Placement::RightCenter => {
            window_position(placement, w, h, viewport)
        }
    }
}

fn window_position(placement: Placement, w: i32, h: i32, viewport: Viewport) -> PopupPosition {
    let centered_top = round_half_up(viewport.height / 2.0 - f64::from(h) / 2.0);
    match placement {
        Placement::LeftCenter => PopupPosition::top_left(centered_top, WINDOW_INSET),
        Placement::RightCenter => PopupPosition::top_right(centered_top, WINDOW_INSET),
        _ => PopupPosition::top_left(
            centered_top,
            round_half_up(viewport.width / 2.0 - f64::from(w) / 2.0),
        ),
    }
}

/// How the page scroll is animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
    #[default]
    Instant,
}

/// A request for the host to scroll the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub top: i32,
    pub left: i32,
    pub behavior: ScrollBehavior,
}

/// Where the page should scroll so the target and popup are visible.
///
/// With `fixed` set the popup lives in the viewport, so the page goes back
/// to its origin instead.
#[must_use]
pub fn scroll_request(
    placement: Placement,
    target: &TargetSize,
    popup_height: f64,
    fixed: bool,
    behavior: ScrollBehavior,
) -> ScrollRequest {
    if fixed {
        return ScrollRequest {
            top: 0,
            left: 0,
            behavior,
        };
    }
    let (left, top) = if placement == Placement::Top {
        (
            0,
            target
                .top
                .saturating_sub(round_half_up(popup_height))
                .saturating_sub(TOP_SCROLL_MARGIN),
        )
    } else {
        (target.left, target.top.saturating_sub(SCROLL_MARGIN))
    };
    ScrollRequest {
        top,
        left,
        behavior,
    }
}
