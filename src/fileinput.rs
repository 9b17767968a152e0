//! Loads field maps back from BDSIM field files.
use crate::axis::{self, SpatialAxis};
use crate::constant::{FIELD_UNIT, LENGTH_UNIT};
use crate::error::{FieldMapError, Result};
use crate::magnetic::grid::FieldGrid;
use crate::magnetic::FieldSample;
use crate::output::file::{FieldFileMetadata, FIELD_COLUMNS, FORMAT_NAME, FORMAT_VERSION};
use nalgebra::Vector3;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A field grid together with the metadata it was stored with.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldMap {
	pub metadata: FieldFileMetadata,
	pub grid: FieldGrid,
}

fn parse_error(line: usize, message: impl Into<String>) -> FieldMapError {
	FieldMapError::Parse {
		line,
		message: message.into(),
	}
}

/// Header key/value pairs, remembering the line each was declared on.
struct Header {
	entries: HashMap<String, (usize, String)>,
}

impl Header {
	fn get(&self, key: &str) -> Option<&(usize, String)> {
		self.entries.get(key)
	}

	fn count(&self, key: &str, column_line: usize) -> Result<usize> {
		let (line, value) = self
			.get(key)
			.ok_or_else(|| parse_error(column_line, format!("missing header key '{}>'", key)))?;
		value
			.parse::<usize>()
			.map_err(|_| parse_error(*line, format!("'{}' is not a valid count for {}", value, key)))
	}
}

/// Reads a field map from the text of a BDSIM 2D field file.
pub fn parse(text: &str) -> Result<FieldMap> {
	let mut entries = HashMap::new();
	let mut columns = None;
	let mut body_offset = text.len();
	let mut offset = 0;
	let mut line_number = 0;

	for line in text.split_inclusive('\n') {
		line_number += 1;
		offset += line.len();
		let trimmed = line.trim();
		if trimmed.is_empty() {
			continue;
		}
		if let Some(names) = trimmed.strip_prefix('!') {
			let names: Vec<String> = names.split_whitespace().map(String::from).collect();
			columns = Some((line_number, names));
			body_offset = offset;
			break;
		}
		let (key, value) = trimmed.split_once('>').ok_or_else(|| {
			parse_error(line_number, format!("expected 'key> value', found '{}'", trimmed))
		})?;
		entries.insert(key.trim().to_string(), (line_number, value.trim().to_string()));
	}

	let (column_line, names) = columns.ok_or_else(|| parse_error(line_number, "no '!' column line"))?;
	let header = Header { entries };

	if let Some((line, format)) = header.get("format") {
		if format != FORMAT_NAME {
			return Err(parse_error(*line, format!("unsupported format '{}'", format)));
		}
	}
	if let Some((line, version)) = header.get("version") {
		if version.parse::<u32>().ok() != Some(FORMAT_VERSION) {
			return Err(parse_error(*line, format!("unsupported version '{}'", version)));
		}
	}

	if names.len() != 5 {
		return Err(parse_error(
			column_line,
			format!("expected 5 columns, found {}", names.len()),
		));
	}
	let axis_of = |name: &str| {
		SpatialAxis::from_key(name)
			.ok_or_else(|| parse_error(column_line, format!("'{}' is not a spatial axis", name)))
	};
	let axes = [axis_of(&names[0])?, axis_of(&names[1])?];
	if names[2..] != FIELD_COLUMNS {
		return Err(parse_error(
			column_line,
			format!("expected field columns {:?}, found {:?}", FIELD_COLUMNS, &names[2..]),
		));
	}

	let n1 = header.count(&format!("n{}", axes[0].key()), column_line)?;
	let n2 = header.count(&format!("n{}", axes[1].key()), column_line)?;
	let unit = |key: &str, default: &str| {
		header
			.get(key)
			.map(|(_, value)| value.clone())
			.unwrap_or_else(|| default.to_string())
	};
	let metadata = FieldFileMetadata {
		axes,
		counts: [n1, n2],
		length_unit: unit("lengthUnit", LENGTH_UNIT),
		field_unit: unit("fieldUnit", FIELD_UNIT),
	};

	let samples = parse_body(&text[body_offset..], column_line)?;

	if header.get("nrows").is_some() {
		let declared = header.count("nrows", column_line)?;
		if declared != samples.len() {
			return Err(FieldMapError::ShapeMismatch {
				what: "nrows".to_string(),
				declared,
				actual: samples.len(),
			});
		}
	}
	let declared = metadata.row_count().ok_or_else(|| {
		parse_error(
			column_line,
			format!("n{} * n{} ({} * {}) overflows", axes[0].key(), axes[1].key(), n1, n2),
		)
	})?;
	if samples.len() != declared {
		return Err(FieldMapError::ShapeMismatch {
			what: format!("n{} * n{}", axes[0].key(), axes[1].key()),
			declared,
			actual: samples.len(),
		});
	}

	let grid = FieldGrid::from_samples(n1, n2, samples)?;
	check_layout(&grid, column_line)?;
	metadata.validate(&grid)?;
	Ok(FieldMap { metadata, grid })
}

fn parse_body(body: &str, column_line: usize) -> Result<Vec<FieldSample>> {
	let mut rdr = csv::ReaderBuilder::new()
		.delimiter(b'\t')
		.has_headers(false)
		.trim(csv::Trim::All)
		.from_reader(body.as_bytes());

	let mut samples = Vec::new();
	for record in rdr.records() {
		let record = record?;
		let line = column_line + record.position().map_or(0, |p| p.line() as usize);
		if record.len() != 5 {
			return Err(parse_error(
				line,
				format!("expected 5 values, found {}", record.len()),
			));
		}
		let mut values = [0.0; 5];
		for (value, field) in values.iter_mut().zip(record.iter()) {
			*value = field
				.parse::<f64>()
				.map_err(|_| parse_error(line, format!("'{}' is not a number", field)))?;
		}
		samples.push(FieldSample::new(
			values[0],
			values[1],
			Vector3::new(values[2], values[3], values[4]),
		));
	}
	Ok(samples)
}

/// Checks rows form a rectangular grid laid out axis1-major with increasing positions.
fn check_layout(grid: &FieldGrid, column_line: usize) -> Result<()> {
	let axis1 = grid.axis1();
	let axis2 = grid.axis2();
	axis::validate(&axis1)
		.and_then(|_| axis::validate(&axis2))
		.map_err(|e| parse_error(column_line, format!("rows do not form a grid: {}", e)))?;
	let (_, n2) = grid.shape();
	for (index, sample) in grid.samples().iter().enumerate() {
		let (i, j) = (index / n2, index % n2);
		if sample.pos1 != axis1[i] || sample.pos2 != axis2[j] {
			return Err(parse_error(
				column_line + index + 1,
				format!(
					"sample at ({}, {}) does not lie on the grid at index ({}, {})",
					sample.pos1, sample.pos2, i, j
				),
			));
		}
	}
	Ok(())
}

/// Reads a field map from a BDSIM 2D field file on disk.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<FieldMap> {
	let contents = fs::read_to_string(path)?;
	parse(&contents)
}

#[cfg(test)]
pub mod tests {
	use super::*;
	use crate::axis::AxisSamples;
	use crate::magnetic::grid::GridBuilder;
	use crate::magnetic::sinusoidal::SinusoidalField;
	use crate::output::file::{serialize, write};
	use assert_approx_eq::assert_approx_eq;

	fn example() -> (FieldGrid, FieldFileMetadata) {
		let x = AxisSamples::from_range(-30.0, 30.0, 5.0).unwrap();
		let z = AxisSamples::from_range(-0.25, 0.25, 0.0125).unwrap();
		let model = SinusoidalField::default();
		let grid = GridBuilder::new(x, z).unwrap().build(|x, z| model.value(x, z));
		let metadata = FieldFileMetadata::for_grid(SpatialAxis::X, SpatialAxis::Z, &grid);
		(grid, metadata)
	}

	#[test]
	fn test_round_trip_recovers_grid() {
		let (grid, metadata) = example();
		let text = serialize(&grid, &metadata).unwrap();
		let map = parse(&text).unwrap();

		assert_eq!(map.metadata, metadata);
		assert_eq!(map.grid.shape(), grid.shape());
		assert_eq!(Some(map.grid.len()), metadata.row_count());
		for (read, original) in map.grid.samples().iter().zip(grid.samples()) {
			for (a, b) in read.columns().iter().zip(original.columns().iter()) {
				assert_approx_eq!(*a, *b, 1e-6 * b.abs().max(1e-12));
			}
		}
	}

	#[test]
	fn test_load_written_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("map.dat");
		let (grid, metadata) = example();
		write(&grid, &metadata, &path).unwrap();
		let map = load_file(&path).unwrap();
		assert_eq!(map.grid.shape(), (13, 41));
	}

	const SMALL: &str = "\
nx> 2
nz> 2
nrows> 4
! X\tZ\tFx\tFy\tFz
0.0\t0.0\t0\t1\t0
0.0\t1.0\t0\t2\t0
1.0\t0.0\t0\t3\t0
1.0\t1.0\t0\t4\t0
";

	#[test]
	fn test_parse_minimal_header() {
		let map = parse(SMALL).unwrap();
		assert_eq!(map.metadata.axes, [SpatialAxis::X, SpatialAxis::Z]);
		assert_eq!(map.metadata.length_unit, "cm");
		assert_eq!(map.grid.get(1, 0).unwrap().field, Vector3::new(0.0, 3.0, 0.0));
	}

	#[test]
	fn test_declared_row_count_must_match_body() {
		let text = SMALL.replace("nrows> 4", "nrows> 5");
		assert!(matches!(
			parse(&text),
			Err(FieldMapError::ShapeMismatch { declared: 5, actual: 4, .. })
		));

		let text = SMALL.replace("nz> 2", "nz> 3").replace("nrows> 4\n", "");
		assert!(matches!(
			parse(&text),
			Err(FieldMapError::ShapeMismatch { declared: 6, actual: 4, .. })
		));
	}

	#[test]
	fn test_oversized_counts_are_rejected() {
		let text = SMALL
			.replace("nx> 2", "nx> 9223372036854775808")
			.replace("nrows> 4\n", "");
		assert!(matches!(parse(&text), Err(FieldMapError::Parse { line: 3, .. })));

		let text = SMALL.replace("nx> 2", "nx> 9223372036854775808");
		assert!(matches!(parse(&text), Err(FieldMapError::Parse { .. })));
	}

	#[test]
	fn test_rows_out_of_order_are_rejected() {
		let text = SMALL.replace(
			"0.0\t1.0\t0\t2\t0\n1.0\t0.0\t0\t3\t0",
			"1.0\t0.0\t0\t3\t0\n0.0\t1.0\t0\t2\t0",
		);
		assert!(matches!(parse(&text), Err(FieldMapError::Parse { .. })));
	}

	#[test]
	fn test_malformed_input() {
		assert!(matches!(parse("nx> 2\n"), Err(FieldMapError::Parse { .. })));
		assert!(matches!(
			parse("nx 2\n! X\tZ\tFx\tFy\tFz\n"),
			Err(FieldMapError::Parse { line: 1, .. })
		));
		assert!(matches!(
			parse(&SMALL.replace("0\t4\t0", "0\tfour\t0")),
			Err(FieldMapError::Parse { line: 8, .. })
		));
		assert!(matches!(
			parse(&format!("format> other\n{}", SMALL)),
			Err(FieldMapError::Parse { line: 1, .. })
		));
	}
}
