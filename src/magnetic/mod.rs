//! Magnetic field samples and analytic field models

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod grid;
pub mod sinusoidal;

/// Selects which component of the field vector a scalar field function fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldComponent {
	X,
	Y,
	Z,
}

impl FieldComponent {
	/// Index of the component within the field vector.
	pub fn index(&self) -> usize {
		match self {
			FieldComponent::X => 0,
			FieldComponent::Y => 1,
			FieldComponent::Z => 2,
		}
	}

	/// A field vector with `value` in this component and zero elsewhere.
	pub fn vector(&self, value: f64) -> Vector3<f64> {
		let mut field = Vector3::zeros();
		field[self.index()] = value;
		field
	}
}

/// One grid cell: a position on the two mapped axes and the field vector there.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FieldSample {
	/// Coordinate along the first mapped axis, cm.
	pub pos1: f64,
	/// Coordinate along the second mapped axis, cm.
	pub pos2: f64,
	/// Field components along x,y,z in units of Tesla.
	pub field: Vector3<f64>,
}

impl FieldSample {
	pub fn new(pos1: f64, pos2: f64, field: Vector3<f64>) -> Self {
		FieldSample { pos1, pos2, field }
	}

	/// The sample as `[pos1, pos2, field1, field2, field3]`, the column order of a field file.
	pub fn columns(&self) -> [f64; 5] {
		[self.pos1, self.pos2, self.field[0], self.field[1], self.field[2]]
	}
}

impl fmt::Display for FieldSample {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"({:?},{:?}): ({:?},{:?},{:?})",
			self.pos1, self.pos2, self.field[0], self.field[1], self.field[2]
		)
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_component_vector() {
		assert_eq!(FieldComponent::Y.vector(2.0), Vector3::new(0.0, 2.0, 0.0));
		assert_eq!(FieldComponent::Z.index(), 2);
	}

	#[test]
	fn test_sample_columns() {
		let sample = FieldSample::new(1.0, -2.0, Vector3::new(0.1, 0.2, 0.3));
		assert_eq!(sample.columns(), [1.0, -2.0, 0.1, 0.2, 0.3]);
		assert_eq!(sample.to_string(), "(1.0,-2.0): (0.1,0.2,0.3)");
	}
}
