//! Writes field maps in the BDSIM field file format.
//!
//! A 2D field file is a block of `key> value` header lines, a column line starting with `!`,
//! then one tab separated row per grid sample:
//!
//! ```text
//! format> bdsim2d
//! version> 1
//! lengthUnit> cm
//! fieldUnit> T
//! xmin> -3.00000000E1
//! xmax> 3.00000000E1
//! nx> 13
//! zmin> -2.50000000E1
//! zmax> 2.50000000E1
//! nz> 51
//! nrows> 663
//! loopOrder> tzyx
//! ! X	Z	Fx	Fy	Fz
//! -3.00000000E1	-2.50000000E1	0.00000000E0	...
//! ```
//!
//! Rows are written with the first axis as the outer loop, matching [FieldGrid] memory order.

use crate::axis::SpatialAxis;
use crate::constant::{FIELD_UNIT, LENGTH_UNIT};
use crate::error::{FieldMapError, Result};
use crate::magnetic::grid::FieldGrid;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Identifier written on the first header line.
pub const FORMAT_NAME: &str = "bdsim2d";

/// Version of the header layout.
pub const FORMAT_VERSION: u32 = 1;

/// Declares that the first mapped axis is the outer (slowest varying) loop of the body.
pub const LOOP_ORDER: &str = "tzyx";

/// Names of the field component columns, following the two position columns.
pub const FIELD_COLUMNS: [&str; 3] = ["Fx", "Fy", "Fz"];

/// Describes how a [FieldGrid] maps onto a field file.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldFileMetadata {
    /// Spatial axes of the first and second grid dimensions.
    pub axes: [SpatialAxis; 2],
    /// Declared sample counts along each axis.
    pub counts: [usize; 2],
    pub length_unit: String,
    pub field_unit: String,
}

impl FieldFileMetadata {
    pub fn new(axis1: SpatialAxis, axis2: SpatialAxis, n1: usize, n2: usize) -> Self {
        FieldFileMetadata {
            axes: [axis1, axis2],
            counts: [n1, n2],
            length_unit: LENGTH_UNIT.to_string(),
            field_unit: FIELD_UNIT.to_string(),
        }
    }

    /// Metadata whose counts match `grid`.
    pub fn for_grid(axis1: SpatialAxis, axis2: SpatialAxis, grid: &FieldGrid) -> Self {
        let (n1, n2) = grid.shape();
        FieldFileMetadata::new(axis1, axis2, n1, n2)
    }

    /// Total number of body rows, or `None` if the declared counts overflow.
    pub fn row_count(&self) -> Option<usize> {
        self.counts[0].checked_mul(self.counts[1])
    }

    /// The five column names, positions first.
    pub fn column_names(&self) -> [&'static str; 5] {
        [
            self.axes[0].label(),
            self.axes[1].label(),
            FIELD_COLUMNS[0],
            FIELD_COLUMNS[1],
            FIELD_COLUMNS[2],
        ]
    }

    /// Checks the metadata describes `grid`.
    pub fn validate(&self, grid: &FieldGrid) -> Result<()> {
        if self.axes[0] == self.axes[1] {
            return Err(FieldMapError::DuplicateAxis(self.axes[0].to_string()));
        }
        let (n1, n2) = grid.shape();
        let actual_counts = [n1, n2];
        for ((axis, &declared), &actual) in self
            .axes
            .iter()
            .zip(self.counts.iter())
            .zip(actual_counts.iter())
        {
            if declared != actual {
                return Err(FieldMapError::ShapeMismatch {
                    what: format!("n{}", axis.key()),
                    declared,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Formats a coordinate or field value. Always scientific, 9 significant digits.
pub fn format_value(value: f64) -> String {
    format!("{:.8E}", value)
}

/// A trait implemented for each field file format.
pub trait FieldFormat {
    /// Writes everything preceding the sample rows.
    fn write_header<W: Write>(
        writer: &mut W,
        grid: &FieldGrid,
        metadata: &FieldFileMetadata,
    ) -> Result<()>;

    /// Writes one row per sample, in grid order.
    fn write_samples<W: Write>(writer: &mut W, grid: &FieldGrid) -> Result<()>;
}

/// The text format read by BDSIM's 2D field loaders.
pub struct BdsimText {}

impl FieldFormat for BdsimText {
    fn write_header<W: Write>(
        writer: &mut W,
        grid: &FieldGrid,
        metadata: &FieldFileMetadata,
    ) -> Result<()> {
        writeln!(writer, "format> {}", FORMAT_NAME)?;
        writeln!(writer, "version> {}", FORMAT_VERSION)?;
        writeln!(writer, "lengthUnit> {}", metadata.length_unit)?;
        writeln!(writer, "fieldUnit> {}", metadata.field_unit)?;

        let positions = [grid.axis1(), grid.axis2()];
        for ((axis, count), values) in metadata
            .axes
            .iter()
            .zip(metadata.counts.iter())
            .zip(positions.iter())
        {
            let key = axis.key();
            writeln!(writer, "{}min> {}", key, format_value(values[0]))?;
            writeln!(writer, "{}max> {}", key, format_value(values[values.len() - 1]))?;
            writeln!(writer, "n{}> {}", key, count)?;
        }
        writeln!(writer, "nrows> {}", grid.len())?;
        writeln!(writer, "loopOrder> {}", LOOP_ORDER)?;
        writeln!(writer, "! {}", metadata.column_names().join("\t"))?;
        Ok(())
    }

    fn write_samples<W: Write>(writer: &mut W, grid: &FieldGrid) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        for columns in grid.to_columns() {
            wtr.write_record(columns.iter().map(|v| format_value(*v)))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Renders `grid` in format `F`, validating `metadata` first.
pub fn serialize_with<F: FieldFormat>(
    grid: &FieldGrid,
    metadata: &FieldFileMetadata,
) -> Result<String> {
    metadata.validate(grid)?;
    let mut buffer = Vec::new();
    F::write_header(&mut buffer, grid, metadata)?;
    F::write_samples(&mut buffer, grid)?;
    String::from_utf8(buffer)
        .map_err(|e| FieldMapError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Renders `grid` as BDSIM field file text.
pub fn serialize(grid: &FieldGrid, metadata: &FieldFileMetadata) -> Result<String> {
    serialize_with::<BdsimText>(grid, metadata)
}

/// Writes `grid` to a BDSIM field file at `path`, replacing any existing file.
///
/// The file is rendered fully in memory and moved into place in one step, so a failure
/// leaves `path` as it was.
pub fn write<P: AsRef<Path>>(
    grid: &FieldGrid,
    metadata: &FieldFileMetadata,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let contents = serialize(grid, metadata)?;
    super::persist_atomically(path, contents.as_bytes())?;
    debug!(
        "wrote {} rows ({} bytes) to {}",
        grid.len(),
        contents.len(),
        path.display()
    );
    Ok(())
}
