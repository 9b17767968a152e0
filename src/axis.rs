//! Sample positions along a single spatial axis.

use crate::error::{FieldMapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of a step by which `stop` may fall short of `start + k*step` and still be included.
pub const ENDPOINT_TOLERANCE: f64 = 1.0e-6;

/// Largest number of samples a range may generate along one axis.
pub const MAX_SAMPLES: usize = 10_000_000;

/// One of the three cartesian axes of the simulator's coordinate frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpatialAxis {
    X,
    Y,
    Z,
}

impl SpatialAxis {
    /// Lower-case label used in header keys, eg `xmin>`, `nz>`.
    pub fn key(&self) -> &'static str {
        match self {
            SpatialAxis::X => "x",
            SpatialAxis::Y => "y",
            SpatialAxis::Z => "z",
        }
    }

    /// Upper-case label used on the column line.
    pub fn label(&self) -> &'static str {
        match self {
            SpatialAxis::X => "X",
            SpatialAxis::Y => "Y",
            SpatialAxis::Z => "Z",
        }
    }

    pub fn from_key(key: &str) -> Option<SpatialAxis> {
        match key {
            "x" | "X" => Some(SpatialAxis::X),
            "y" | "Y" => Some(SpatialAxis::Y),
            "z" | "Z" => Some(SpatialAxis::Z),
            _ => None,
        }
    }
}

impl fmt::Display for SpatialAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A `start`, `stop`, `step` rule describing evenly spaced samples, `stop` inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl AxisRange {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        AxisRange { start, stop, step }
    }

    pub fn samples(&self) -> Result<AxisSamples> {
        AxisSamples::from_range(self.start, self.stop, self.step)
    }
}

/// Ordered, strictly increasing sample positions along one axis.
///
/// An `AxisSamples` is never empty; both constructors reject inputs that would
/// produce an empty or non-monotonic sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisSamples {
    values: Vec<f64>,
}

impl AxisSamples {
    /// Generates `start, start + step, ...` up to and including `stop`.
    ///
    /// `stop` is included when it lies within [ENDPOINT_TOLERANCE] steps of a sample.
    /// Each sample is computed as `start + k * step` so rounding errors do not accumulate.
    pub fn from_range(start: f64, stop: f64, step: f64) -> Result<Self> {
        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(FieldMapError::InvalidAxis(format!(
                "range ({}, {}, {}) must be finite",
                start, stop, step
            )));
        }
        if step <= 0.0 {
            return Err(FieldMapError::InvalidAxis(format!(
                "step must be positive, got {}",
                step
            )));
        }
        if stop < start {
            return Err(FieldMapError::InvalidAxis(format!(
                "stop {} is below start {}",
                stop, start
            )));
        }

        let intervals = ((stop - start) / step + ENDPOINT_TOLERANCE).floor();
        if !intervals.is_finite() || intervals >= MAX_SAMPLES as f64 {
            return Err(FieldMapError::InvalidAxis(format!(
                "range ({}, {}, {}) gives more than {} samples",
                start, stop, step, MAX_SAMPLES
            )));
        }
        let count = intervals as usize + 1;
        let values = (0..count).map(|k| start + k as f64 * step).collect();
        AxisSamples::from_values(values)
    }

    /// Wraps explicit sample positions, checking they are finite and strictly increasing.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        validate(&values)?;
        Ok(AxisSamples { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn first(&self) -> f64 {
        self.values[0]
    }

    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }
}

/// Checks that a sequence of positions is usable as an axis.
pub fn validate(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(FieldMapError::InvalidAxis("axis has no samples".to_string()));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(FieldMapError::InvalidAxis(format!(
            "sample {} is not finite",
            bad
        )));
    }
    if let Some(i) = values.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(FieldMapError::InvalidAxis(format!(
            "samples are not strictly increasing at index {} ({} then {})",
            i + 1,
            values[i],
            values[i + 1]
        )));
    }
    Ok(())
}
