use dwellspace_common::Color;
use serde::{Deserialize, Serialize};

use crate::hover::HoverState;

/// Look of the dwell indicator ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorStyle {
    /// Color while nothing is locked.
    pub searching_color: Color,
    /// Color while a dwell is accumulating.
    pub locked_color: Color,
    /// Distance in front of the eye the ring is drawn at.
    pub distance: f32,
    /// Scale the ring shrinks to as progress reaches the threshold.
    pub min_scale: f32,
}

impl Default for IndicatorStyle {
    fn default() -> Self {
        Self {
            searching_color: Color::WHITE,
            locked_color: Color(0x33ff66),
            distance: 1.5,
            min_scale: 0.0,
        }
    }
}

/// Resolved indicator appearance for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorState {
    pub scale: f32,
    pub color: Color,
}

impl IndicatorStyle {
    /// Indicator for `hover`. Depends on nothing but the hover state, so the
    /// ring drawn at frame rate always agrees with the progress counter that
    /// advances at the dwell interval.
    pub fn resolve(&self, hover: &HoverState, threshold: f32) -> IndicatorState {
        if !hover.is_dwelling() {
            return IndicatorState {
                scale: 1.0,
                color: self.searching_color,
            };
        }
        let fraction = if threshold > 0.0 {
            (hover.dwell_progress() / threshold).clamp(0.0, 1.0)
        } else {
            1.0
        };
        IndicatorState {
            scale: 1.0 + (self.min_scale - 1.0) * fraction,
            color: self.locked_color,
        }
    }
}
