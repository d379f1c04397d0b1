use kurbo::Size;
use serde::{Deserialize, Serialize};

use crate::platform::Host;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub position_x: f64,
    pub position_y: f64,
    pub scale: f64,
    /// Last zoom pivot, for consumers that draw a focus indicator.
    #[serde(default)]
    pub pivot_point_x: f64,
    #[serde(default)]
    pub pivot_point_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            position_x: 0.0,
            position_y: 0.0,
            scale: 1.0,
            pivot_point_x: 0.0,
            pivot_point_y: 0.0,
        }
    }
}

impl ViewState {
    /// Merges a patch, leaving unspecified fields untouched.
    pub fn apply(&mut self, patch: &ViewStatePatch) {
        if let Some(v) = patch.position_x {
            self.position_x = v;
        }
        if let Some(v) = patch.position_y {
            self.position_y = v;
        }
        if let Some(v) = patch.scale {
            self.scale = v;
        }
        if let Some(v) = patch.pivot_point_x {
            self.pivot_point_x = v;
        }
        if let Some(v) = patch.pivot_point_y {
            self.pivot_point_y = v;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewStatePatch {
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub scale: Option<f64>,
    pub pivot_point_x: Option<f64>,
    pub pivot_point_y: Option<f64>,
}

impl ViewStatePatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            position_x: Some(x),
            position_y: Some(y),
            ..Self::default()
        }
    }

    pub fn full(state: ViewState) -> Self {
        Self {
            position_x: Some(state.position_x),
            position_y: Some(state.position_y),
            scale: Some(state.scale),
            pivot_point_x: Some(state.pivot_point_x),
            pivot_point_y: Some(state.pivot_point_y),
        }
    }
}

/// Owner of the rendered transform. The interpreter only reads and patches it.
pub trait View {
    type Element: Host;

    fn element(&self) -> Self::Element;
    fn state(&self) -> ViewState;
    /// Merge-applies `patch` atomically.
    fn set_state(&mut self, patch: ViewStatePatch);
    fn image_size(&self) -> Size;
}
