//! Sinusoidal undulator-like field model.

use crate::constant::PI;
use serde::{Deserialize, Serialize};

/// A field component that oscillates along the second axis and grows quadratically along the first.
///
/// `B = amplitude * (1 + curvature * x^2) * sin(2 pi z / period)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SinusoidalField {
    /// Peak field on the axis `x = 0`, in units of Tesla.
    pub amplitude: f64,
    /// Quadratic growth coefficient along the first axis, per cm^2.
    pub curvature: f64,
    /// Oscillation period along the second axis, in the same length unit as the positions.
    pub period: f64,
}

impl Default for SinusoidalField {
    fn default() -> Self {
        SinusoidalField {
            amplitude: 1.0,
            curvature: 0.025,
            period: 0.1,
        }
    }
}

impl SinusoidalField {
    #[inline]
    pub fn value(&self, x: f64, z: f64) -> f64 {
        self.amplitude * (1.0 + self.curvature * x * x) * (2.0 * PI * z / self.period).sin()
    }
}
