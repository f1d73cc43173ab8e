//! Points, sizes and rectangles in diagram space.
//!
//! [`Point`] doubles as the wire type for node positions and serializes as
//! a plain `{ "x": .., "y": .. }` object; a missing coordinate reads as 0.
//! Coordinates must be finite: JSON has no spelling for infinity, so a
//! point that overflowed `f32` could not be saved and read back.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A coordinate outside the finite `f32` range.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinate {0} is not a finite 32-bit number")]
pub struct NonFiniteError(f32);

fn check_finite(value: f32) -> Result<f32, NonFiniteError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NonFiniteError(value))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    x: f32,
    y: f32,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WirePoint {
    x: f32,
    y: f32,
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let WirePoint { x, y } = WirePoint::deserialize(deserializer)?;
        let x = check_finite(x).map_err(serde::de::Error::custom)?;
        let y = check_finite(y).map_err(serde::de::Error::custom)?;
        Ok(Self { x, y })
    }
}

/// Field deserializer for optional lengths such as a node's `width`.
pub(crate) fn finite_length<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f32>, D::Error> {
    Option::<f32>::deserialize(deserializer)?
        .map(check_finite)
        .transpose()
        .map_err(serde::de::Error::custom)
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn with_x(self, x: f32) -> Self {
        Self { x, ..self }
    }

    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }

    pub fn is_origin(self) -> bool {
        self == Self::default()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn midpoint(self, other: Point) -> Self {
        (self + other) * 0.5
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

/// Width and height of a node box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }
}

/// Axis-aligned rectangle, `y` growing downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// The box of a node placed at `top_left`.
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min: top_left,
            max: top_left + Point::new(size.width, size.height),
        }
    }

    pub fn min_x(self) -> f32 {
        self.min.x
    }

    pub fn min_y(self) -> f32 {
        self.min.y
    }

    pub fn max_x(self) -> f32 {
        self.max.x
    }

    pub fn max_y(self) -> f32 {
        self.max.y
    }

    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(self) -> Point {
        self.min.midpoint(self.max)
    }

    /// Smallest bounds covering both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grows the bounds by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        let margin = Point::new(margin, margin);
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_point_operators() {
        let a = Point::new(5.0, 8.0);
        let b = Point::new(2.0, 3.0);
        assert_eq!(a + b, Point::new(7.0, 11.0));
        assert_eq!(a - b, Point::new(3.0, 5.0));
        assert_eq!(b * 2.5, Point::new(5.0, 7.5));
        assert_eq!(Point::default().midpoint(Point::new(4.0, 6.0)), Point::new(2.0, 3.0));
        assert!(Point::default().is_origin());
        assert!(!a.is_origin());
    }

    #[test]
    fn test_point_missing_coordinates_default_to_zero() {
        let point: Point = serde_json::from_str(r#"{"x": 4}"#).unwrap();
        assert_eq!(point, Point::new(4.0, 0.0));

        let point: Point = serde_json::from_str("{}").unwrap();
        assert!(point.is_origin());
    }

    #[test]
    fn test_point_overflowing_f32_is_rejected() {
        let err = serde_json::from_str::<Point>(r#"{"x": 1e39, "y": 0}"#).unwrap_err();
        assert!(err.to_string().contains("not a finite"));

        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
    }

    #[test]
    fn test_node_box() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(30.0, 40.0));
        assert_eq!(bounds.max_x(), 40.0);
        assert_eq!(bounds.max_y(), 60.0);
        assert_eq!(bounds.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_merge_and_expand() {
        let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Bounds::new_from_top_left(Point::new(20.0, -5.0), Size::new(5.0, 5.0));
        let merged = a.merge(&b);
        assert_eq!((merged.min_x(), merged.min_y()), (0.0, -5.0));
        assert_eq!(merged.width(), 25.0);
        assert_eq!(merged.height(), 15.0);

        let expanded = merged.expand(2.0);
        assert_eq!((expanded.min_x(), expanded.min_y()), (-2.0, -7.0));
        assert_eq!(expanded.width(), 29.0);
    }

    proptest! {
        #[test]
        fn prop_merge_covers_both(
            ax in -1e4f32..1e4, ay in -1e4f32..1e4, aw in 0f32..1e3, ah in 0f32..1e3,
            bx in -1e4f32..1e4, by in -1e4f32..1e4, bw in 0f32..1e3, bh in 0f32..1e3,
        ) {
            let a = Bounds::new_from_top_left(Point::new(ax, ay), Size::new(aw, ah));
            let b = Bounds::new_from_top_left(Point::new(bx, by), Size::new(bw, bh));
            let merged = a.merge(&b);

            for inner in [a, b] {
                prop_assert!(merged.min_x() <= inner.min_x());
                prop_assert!(merged.min_y() <= inner.min_y());
                prop_assert!(merged.max_x() >= inner.max_x());
                prop_assert!(merged.max_y() >= inner.max_y());
            }
        }

        #[test]
        fn prop_sub_undoes_add(x in -1e4f32..1e4, y in -1e4f32..1e4, dx in -1e4f32..1e4, dy in -1e4f32..1e4) {
            let p = Point::new(x, y);
            let d = Point::new(dx, dy);
            let back = (p + d) - d;
            prop_assert!(approx_eq!(f32, back.x(), x, epsilon = 1e-2));
            prop_assert!(approx_eq!(f32, back.y(), y, epsilon = 1e-2));
        }
    }
}
