/// Mathematical constant pi
pub const PI: f64 = std::f64::consts::PI;

/// Length unit of positions written to field files.
pub const LENGTH_UNIT: &str = "cm";

/// Magnetic flux density unit of field components written to field files.
pub const FIELD_UNIT: &str = "T";
