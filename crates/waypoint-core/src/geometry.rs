#![forbid(unsafe_code)]

//! Page-space geometry for tour targets.
//!
//! Hosts report element rectangles relative to the viewport. A tour needs
//! them relative to the page so that backdrops and popups stay glued to the
//! target while the document scrolls.
//!
//! # Invariants
//!
//! 1. **Scroll stable**: [`TargetSize::resolve`] subtracts the body origin, so
//!    the same element yields the same box at any scroll offset.
//! 2. **Padding conserves the center**: [`TargetSize::padded`] grows every
//!    edge by the same amount on an axis, so the box center never moves.
//! 3. **No clamping**: padding near the page edge may produce negative
//!    coordinates. Callers render them as-is.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Zero-size rect | Element not laid out yet | Height/width derived from edges (also zero) |
//! | Bad padding list | `stepTargetResize` with 0 or 3+ numbers | Deserialization error |

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Round to the nearest integer with halves going toward positive infinity.
///
/// This matches how browsers round layout values (`-2.5` becomes `-2`,
/// `2.5` becomes `3`), which `f64::round` does not.
#[inline]
#[must_use]
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// A viewport-relative rectangle as reported by the host layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientRect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    /// Create a rectangle from its origin and size.
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            bottom: top + height,
            right: left + width,
            width,
            height,
        }
    }

    /// Create a rectangle from its four edges.
    #[must_use]
    pub fn from_edges(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Whether the point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// The heights a document reports for itself.
///
/// The tallest of these is the scrollable page height, which backdrops need
/// to cover an overflowing page completely.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageExtents {
    pub body_scroll_height: f64,
    pub document_scroll_height: f64,
    pub body_offset_height: f64,
    pub document_offset_height: f64,
    pub body_client_height: f64,
    pub document_client_height: f64,
    pub viewport_height: f64,
}

impl PageExtents {
    /// Extents for a page that never overflows the viewport.
    #[must_use]
    pub fn viewport_only(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            ..Self::default()
        }
    }

    /// Maximum of every reported height, rounded.
    #[must_use]
    pub fn max_height(&self) -> i32 {
        let tallest = [
            self.body_scroll_height,
            self.document_scroll_height,
            self.body_offset_height,
            self.document_offset_height,
            self.body_client_height,
            self.document_client_height,
            self.viewport_height,
        ]
        .into_iter()
        .fold(0.0_f64, f64::max);
        round_half_up(tallest)
    }
}

/// Padding applied around a target box: `[x]` or `[x, y]`.
///
/// When `y` is omitted the horizontal amount is used on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub x: i32,
    pub y: Option<i32>,
}

impl Padding {
    /// Same padding on both axes.
    #[must_use]
    pub const fn uniform(amount: i32) -> Self {
        Self { x: amount, y: None }
    }

    /// Separate horizontal and vertical padding.
    #[must_use]
    pub const fn axes(x: i32, y: i32) -> Self {
        Self { x, y: Some(y) }
    }

    /// Effective vertical padding.
    #[must_use]
    pub fn vertical(&self) -> i32 {
        self.y.unwrap_or(self.x)
    }
}

impl Serialize for Padding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.y.is_some() { 2 } else { 1 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.x)?;
        if let Some(y) = self.y {
            seq.serialize_element(&y)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Padding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PaddingVisitor;

        impl<'de> Visitor<'de> for PaddingVisitor {
            type Value = Padding;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of one or two integers")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Padding, A::Error> {
                let x: i32 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let y: Option<i32> = seq.next_element()?;
                if seq.next_element::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(3, &self));
                }
                Ok(Padding { x, y })
            }
        }

        deserializer.deserialize_seq(PaddingVisitor)
    }
}

/// A target's box in page coordinates, plus the full page height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSize {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub width: i32,
    pub height: i32,
    pub page_height: i32,
}

impl TargetSize {
    /// Build a box directly from page coordinates.
    #[must_use]
    pub fn new(left: i32, top: i32, width: i32, height: i32, page_height: i32) -> Self {
        Self {
            top,
            left,
            bottom: top + height,
            right: left + width,
            width,
            height,
            page_height,
        }
    }

    /// Resolve a viewport rectangle into page space.
    ///
    /// `body` is the document body's viewport rectangle; its origin moves
    /// with scrolling, so subtracting it cancels the scroll offset.
    #[must_use]
    pub fn resolve(target: &ClientRect, body: &ClientRect, extents: &PageExtents) -> Self {
        let top = round_half_up(target.top - body.top);
        let left = round_half_up(target.left - body.left);
        let bottom = round_half_up(target.bottom - body.top);
        let right = round_half_up(target.right - body.left);
        let height = if target.height != 0.0 {
            round_half_up(target.height)
        } else {
            bottom - top
        };
        let width = if target.width != 0.0 {
            round_half_up(target.width)
        } else {
            right - left
        };
        Self {
            top,
            left,
            bottom,
            right,
            width,
            height,
            page_height: extents.max_height(),
        }
    }

    /// Grow the box by `padding` on every side.
    ///
    /// Coordinates saturate at the `i32` range instead of overflowing.
    #[must_use]
    pub fn padded(mut self, padding: Padding) -> Self {
        let x = padding.x;
        let y = padding.vertical();
        self.left = self.left.saturating_sub(x);
        self.right = self.right.saturating_add(x);
        self.top = self.top.saturating_sub(y);
        self.bottom = self.bottom.saturating_add(y);
        self.width = self.width.saturating_add(x.saturating_mul(2));
        self.height = self.height.saturating_add(y.saturating_mul(2));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_up_matches_browser_rounding() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(0.49), 0);
    }

    #[test]
    fn huge_padding_saturates() {
        let padded = TargetSize::new(10, 10, 40, 20, 800).padded(Padding::uniform(i32::MAX / 2 + 1));
        assert_eq!(padded.width, i32::MAX);
        assert_eq!(padded.height, i32::MAX);
        assert_eq!(padded.left, 10 - (i32::MAX / 2 + 1));

        let shrunk = TargetSize::new(0, 0, 40, 20, 800).padded(Padding::uniform(i32::MIN));
        assert_eq!(shrunk.left, i32::MAX);
        assert_eq!(shrunk.width, i32::MIN + 40);
    }

    #[test]
    fn resolve_subtracts_body_origin() {
        let target = ClientRect::new(120.0, 40.0, 100.0, 30.0);
        // Page scrolled down by 300px: body origin sits above the viewport.
        let body = ClientRect::new(0.0, -300.0, 1024.0, 2000.0);
        let size = TargetSize::resolve(&target, &body, &PageExtents::viewport_only(768.0));

        assert_eq!(size.top, 340);
        assert_eq!(size.left, 120);
        assert_eq!(size.bottom, 370);
        assert_eq!(size.right, 220);
        assert_eq!(size.width, 100);
        assert_eq!(size.height, 30);
        assert_eq!(size.page_height, 768);
    }

    #[test]
    fn resolve_is_scroll_stable() {
        let extents = PageExtents::viewport_only(600.0);
        let at_rest = TargetSize::resolve(
            &ClientRect::new(10.0, 500.0, 50.0, 20.0),
            &ClientRect::new(0.0, 0.0, 800.0, 1500.0),
            &extents,
        );
        let scrolled = TargetSize::resolve(
            &ClientRect::new(10.0, 200.0, 50.0, 20.0),
            &ClientRect::new(0.0, -300.0, 800.0, 1500.0),
            &extents,
        );
        assert_eq!(at_rest, scrolled);
    }

    #[test]
    fn resolve_derives_size_from_edges_when_zero() {
        let target = ClientRect {
            top: 10.0,
            left: 20.0,
            bottom: 40.0,
            right: 70.0,
            width: 0.0,
            height: 0.0,
        };
        let size = TargetSize::resolve(&target, &ClientRect::default(), &PageExtents::default());
        assert_eq!(size.width, 50);
        assert_eq!(size.height, 30);
    }

    #[test]
    fn page_height_takes_the_tallest_extent() {
        let extents = PageExtents {
            body_scroll_height: 1200.0,
            document_scroll_height: 2400.4,
            body_offset_height: 900.0,
            document_offset_height: 1000.0,
            body_client_height: 300.0,
            document_client_height: 768.0,
            viewport_height: 768.0,
        };
        assert_eq!(extents.max_height(), 2400);
    }

    #[test]
    fn uniform_padding_grows_all_sides() {
        let size = TargetSize {
            left: 50,
            right: 150,
            top: 20,
            bottom: 120,
            width: 100,
            height: 100,
            page_height: 0,
        };
        let padded = size.padded(Padding::uniform(10));
        assert_eq!(padded.left, 40);
        assert_eq!(padded.right, 160);
        assert_eq!(padded.top, 10);
        assert_eq!(padded.bottom, 130);
        assert_eq!(padded.width, 120);
        assert_eq!(padded.height, 120);
    }

    #[test]
    fn axis_padding_is_independent() {
        let padded = TargetSize::new(50, 20, 100, 100, 0).padded(Padding::axes(4, 8));
        assert_eq!((padded.left, padded.right), (46, 154));
        assert_eq!((padded.top, padded.bottom), (12, 128));
        assert_eq!((padded.width, padded.height), (108, 116));
    }

    #[test]
    fn padding_near_edge_goes_negative() {
        let padded = TargetSize::new(2, 3, 10, 10, 0).padded(Padding::uniform(5));
        assert_eq!(padded.left, -3);
        assert_eq!(padded.top, -2);
    }

    #[test]
    fn padding_deserializes_from_one_or_two_numbers() {
        let one: Padding = serde_json::from_str("[6]").unwrap();
        assert_eq!(one, Padding::uniform(6));
        assert_eq!(one.vertical(), 6);

        let two: Padding = serde_json::from_str("[6, 2]").unwrap();
        assert_eq!(two, Padding::axes(6, 2));

        assert!(serde_json::from_str::<Padding>("[]").is_err());
        assert!(serde_json::from_str::<Padding>("[1, 2, 3]").is_err());
    }

    #[test]
    fn padding_serializes_back_to_list() {
        assert_eq!(serde_json::to_string(&Padding::uniform(3)).unwrap(), "[3]");
        assert_eq!(serde_json::to_string(&Padding::axes(3, 4)).unwrap(), "[3,4]");
    }

    #[test]
    fn client_rect_contains_edges() {
        let rect = ClientRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(10.0, 10.0));
        assert!(!rect.contains(10.5, 3.0));
    }
}
