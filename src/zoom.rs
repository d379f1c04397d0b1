//! Pivot-preserving scale.
//!
//! Every zoom gesture funnels through [`scale_about`]: the requested scale is
//! clamped, then the position is adjusted so the image point under `pivot`
//! stays under `pivot`.

use kurbo::{Point, Size};

use crate::view::ViewState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min: 0.02,
            max: 10.0,
        }
    }
}

impl ScaleLimits {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

/// One axis of the pivot math. `extent` is the intrinsic image size on that axis.
fn reposition(position: f64, pivot: f64, extent: f64, old_scale: f64, new_scale: f64) -> f64 {
    let scaled = extent * old_scale;
    if scaled <= 0.0 || !scaled.is_finite() {
        return position;
    }
    let origin = pivot - position;
    let fraction = origin / scaled;
    position + origin - extent * new_scale * fraction
}

/// Returns the state after scaling to `requested` around `pivot`.
///
/// A non-finite `requested` (for instance a pinch whose reference distance
/// was zero) clamps when infinite and leaves the state unchanged when NaN.
pub fn scale_about(
    state: ViewState,
    image: Size,
    pivot: Point,
    requested: f64,
    limits: ScaleLimits,
) -> ViewState {
    if requested.is_nan() {
        return state;
    }
    let new_scale = limits.clamp(requested);
    ViewState {
        position_x: reposition(state.position_x, pivot.x, image.width, state.scale, new_scale),
        position_y: reposition(state.position_y, pivot.y, image.height, state.scale, new_scale),
        scale: new_scale,
        pivot_point_x: pivot.x,
        pivot_point_y: pivot.y,
    }
}

pub fn image_fraction(state: &ViewState, image: Size, pivot: Point) -> (f64, f64) {
    (
        (pivot.x - state.position_x) / (image.width * state.scale),
        (pivot.y - state.position_y) / (image.height * state.scale),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn origin_state() -> ViewState {
        ViewState::default()
    }

    #[test]
    fn wheel_scenario_from_origin() {
        let image = Size::new(1000.0, 1000.0);
        let out = scale_about(origin_state(), image, Point::new(500.0, 500.0), 1.2, ScaleLimits::default());
        assert!(approx(out.scale, 1.2));
        assert!(approx(out.position_x, -100.0));
        assert!(approx(out.position_y, -100.0));
        assert_eq!(out.pivot_point_x, 500.0);
        assert_eq!(out.pivot_point_y, 500.0);
    }

    #[test]
    fn pivot_keeps_its_image_point() {
        let image = Size::new(640.0, 480.0);
        let start = ViewState {
            position_x: -37.5,
            position_y: 12.25,
            scale: 1.7,
            ..ViewState::default()
        };
        let pivots = [
            Point::new(0.0, 0.0),
            Point::new(123.0, 456.0),
            Point::new(-50.0, 900.0),
        ];
        for pivot in pivots {
            for requested in [0.02, 0.3, 1.0, 2.5, 9.99] {
                let before = image_fraction(&start, image, pivot);
                let after_state = scale_about(start, image, pivot, requested, ScaleLimits::default());
                let after = image_fraction(&after_state, image, pivot);
                assert!(approx(before.0, after.0), "x fraction drifted at {requested}");
                assert!(approx(before.1, after.1), "y fraction drifted at {requested}");
            }
        }
    }

    #[test]
    fn requested_scale_is_clamped() {
        let image = Size::new(100.0, 100.0);
        let hi = scale_about(origin_state(), image, Point::ZERO, 50.0, ScaleLimits::default());
        assert_eq!(hi.scale, 10.0);
        let lo = scale_about(origin_state(), image, Point::ZERO, -3.0, ScaleLimits::default());
        assert_eq!(lo.scale, 0.02);
        let inf = scale_about(origin_state(), image, Point::ZERO, f64::INFINITY, ScaleLimits::default());
        assert_eq!(inf.scale, 10.0);
    }

    #[test]
    fn nan_scale_leaves_state_alone() {
        let s = origin_state();
        let out = scale_about(s, Size::new(10.0, 10.0), Point::new(3.0, 3.0), f64::NAN, ScaleLimits::default());
        assert_eq!(out, s);
    }

    #[test]
    fn empty_image_axis_keeps_position() {
        let s = ViewState {
            position_x: 5.0,
            position_y: 6.0,
            ..ViewState::default()
        };
        let out = scale_about(s, Size::new(0.0, 100.0), Point::new(50.0, 50.0), 2.0, ScaleLimits::default());
        assert_eq!(out.position_x, 5.0);
        assert!(approx(out.position_y, 6.0 + 44.0 - 200.0 * 0.44));
        assert_eq!(out.scale, 2.0);
    }

    #[test]
    fn same_scale_is_identity_on_position() {
        let s = ViewState {
            position_x: 20.0,
            position_y: -10.0,
            scale: 2.0,
            ..ViewState::default()
        };
        let out = scale_about(s, Size::new(300.0, 200.0), Point::new(77.0, 33.0), 2.0, ScaleLimits::default());
        assert!(approx(out.position_x, 20.0));
        assert!(approx(out.position_y, -10.0));
    }
}
