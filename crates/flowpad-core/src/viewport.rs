//! Pan/zoom transform applied to the diagram surface.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Pan offset plus zoom scalar.
///
/// A diagram-space point `p` appears on the surface at `p * zoom + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    x: f32,
    y: f32,
    zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(x: f32, y: f32, zoom: f32) -> Self {
        Self { x, y, zoom }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn zoom(self) -> f32 {
        self.zoom
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.zoom.is_finite()
    }

    pub fn pan(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Converts a surface-relative point into diagram space.
    ///
    /// A zero or non-finite zoom is treated as 1.
    pub fn project(self, surface_point: Point) -> Point {
        let zoom = if self.zoom.is_finite() && self.zoom != 0.0 {
            self.zoom
        } else {
            1.0
        };
        let offset = surface_point - self.pan();
        Point::new(offset.x() / zoom, offset.y() / zoom)
    }

    /// Converts a diagram-space point onto the surface.
    pub fn unproject(self, diagram_point: Point) -> Point {
        diagram_point * self.zoom + self.pan()
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_identity_projection() {
        let point = Viewport::default().project(Point::new(100.0, 42.0));
        assert_eq!(point, Point::new(100.0, 42.0));
    }

    #[test]
    fn test_project_pan_and_zoom() {
        let viewport = Viewport::new(20.0, -10.0, 2.0);
        let point = viewport.project(Point::new(120.0, 90.0));
        assert_approx_eq!(f32, point.x(), 50.0);
        assert_approx_eq!(f32, point.y(), 50.0);
    }

    #[test]
    fn test_zero_zoom_is_treated_as_identity_scale() {
        let point = Viewport::new(0.0, 0.0, 0.0).project(Point::new(3.0, 4.0));
        assert_eq!(point, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_missing_fields_default() {
        let viewport: Viewport = serde_json::from_str(r#"{"x": 5}"#).unwrap();
        assert_eq!(viewport, Viewport::new(5.0, 0.0, 1.0));
    }

    proptest! {
        #[test]
        fn project_inverts_unproject(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            pan_x in -500.0f32..500.0,
            pan_y in -500.0f32..500.0,
            zoom in 0.1f32..4.0,
        ) {
            let viewport = Viewport::new(pan_x, pan_y, zoom);
            let back = viewport.project(viewport.unproject(Point::new(x, y)));
            prop_assert!((back.x() - x).abs() < 0.05);
            prop_assert!((back.y() - y).abs() < 0.05);
        }
    }
}
