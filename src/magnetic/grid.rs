//! Define magnetic field maps on rectangular grids.
use crate::axis::AxisSamples;
use crate::error::{FieldMapError, Result};
use crate::magnetic::{FieldComponent, FieldSample};
use nalgebra::Vector3;

/// A field map sampled on a rectangular grid spanning two spatial axes.
///
/// The grid is ordered as a linear array, with elements ordered in priority axis1, axis2;
/// items with d(axis2)=1 are adjacent in memory. This is also the row order of a field file.
///
/// # Fields
///
/// `n1`: Number of samples along the first axis.
///
/// `n2`: Number of samples along the second axis.
///
/// `samples`: `n1 * n2` samples, `samples[i * n2 + j]` being at `(axis1[i], axis2[j])`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldGrid {
    n1: usize,
    n2: usize,
    samples: Vec<FieldSample>,
}

impl FieldGrid {
    /// Wraps samples already laid out axis1-major. Fails unless there are exactly `n1 * n2`.
    pub fn from_samples(n1: usize, n2: usize, samples: Vec<FieldSample>) -> Result<Self> {
        if n1 == 0 || n2 == 0 {
            return Err(FieldMapError::InvalidAxis(format!(
                "grid dimensions {}x{} must be non-zero",
                n1, n2
            )));
        }
        let declared = n1.checked_mul(n2).ok_or_else(|| {
            FieldMapError::InvalidAxis(format!("grid dimensions {}x{} overflow", n1, n2))
        })?;
        if samples.len() != declared {
            return Err(FieldMapError::ShapeMismatch {
                what: "grid samples".to_string(),
                declared,
                actual: samples.len(),
            });
        }
        Ok(FieldGrid { n1, n2, samples })
    }

    /// Sample counts along (axis1, axis2).
    pub fn shape(&self) -> (usize, usize) {
        (self.n1, self.n2)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&FieldSample> {
        if i < self.n1 && j < self.n2 {
            self.samples.get(i * self.n2 + j)
        } else {
            None
        }
    }

    /// All samples in emission order: axis1-major, axis2-minor.
    pub fn samples(&self) -> &[FieldSample] {
        &self.samples
    }

    /// One slice per axis1 position, each holding the `n2` samples along axis2.
    pub fn rows(&self) -> std::slice::Chunks<'_, FieldSample> {
        self.samples.chunks(self.n2)
    }

    /// Positions along the first axis.
    pub fn axis1(&self) -> Vec<f64> {
        self.rows().map(|row| row[0].pos1).collect()
    }

    /// Positions along the second axis.
    pub fn axis2(&self) -> Vec<f64> {
        self.samples[..self.n2].iter().map(|s| s.pos2).collect()
    }

    /// Flattened `[pos1, pos2, field1, field2, field3]` rows in emission order.
    pub fn to_columns(&self) -> Vec<[f64; 5]> {
        self.samples.iter().map(FieldSample::columns).collect()
    }
}

/// Evaluates field functions over every point of two axes.
pub struct GridBuilder {
    axis1: AxisSamples,
    axis2: AxisSamples,
    component: FieldComponent,
}

impl GridBuilder {
    /// Creates a builder over `axis1` x `axis2`. Scalar fields go into the y component unless
    /// changed with [GridBuilder::component].
    pub fn new(axis1: AxisSamples, axis2: AxisSamples) -> Result<Self> {
        crate::axis::validate(axis1.values())?;
        crate::axis::validate(axis2.values())?;
        Ok(GridBuilder {
            axis1,
            axis2,
            component: FieldComponent::Y,
        })
    }

    pub fn component(mut self, component: FieldComponent) -> Self {
        self.component = component;
        self
    }

    /// Builds the grid with `field_fn(pos1, pos2)` in the selected component, others zero.
    pub fn build<F>(&self, field_fn: F) -> FieldGrid
    where
        F: Fn(f64, f64) -> f64,
    {
        let component = self.component;
        self.build_vector(|p1, p2| component.vector(field_fn(p1, p2)))
    }

    /// Builds the grid with the full field vector given by `field_fn(pos1, pos2)`.
    pub fn build_vector<F>(&self, field_fn: F) -> FieldGrid
    where
        F: Fn(f64, f64) -> Vector3<f64>,
    {
        let mut samples = Vec::with_capacity(self.axis1.len() * self.axis2.len());
        for p1 in self.axis1.iter() {
            for p2 in self.axis2.iter() {
                samples.push(FieldSample::new(p1, p2, field_fn(p1, p2)));
            }
        }
        FieldGrid {
            n1: self.axis1.len(),
            n2: self.axis2.len(),
            samples,
        }
    }
}
