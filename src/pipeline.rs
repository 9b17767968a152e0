//! Runs a complete generation: build the grid, write the field file, then archive and plot it.

use crate::axis::SpatialAxis;
use crate::configuration::FieldMapConfiguration;
use crate::error::Result;
use crate::magnetic::grid::{FieldGrid, GridBuilder};
use crate::output::archive::{Archiver, TarGzArchiver};
use crate::output::file::{self, FieldFileMetadata};
use crate::visual::{Plotter, QuiverPlot};
use std::path::PathBuf;
use tracing::{info, warn};

/// Axes spanned by generated maps: x first, z second.
pub const MAP_AXES: [SpatialAxis; 2] = [SpatialAxis::X, SpatialAxis::Z];

/// Everything produced by [run].
#[derive(Debug)]
pub struct FieldMapOutput {
    pub grid: FieldGrid,
    pub metadata: FieldFileMetadata,
    pub field_file: PathBuf,
    pub archive: Option<PathBuf>,
    pub plot: Option<PathBuf>,
}

/// Builds the grid and matching metadata described by `config`, without touching the filesystem.
pub fn generate(config: &FieldMapConfiguration) -> Result<(FieldGrid, FieldFileMetadata)> {
    let model = config.field_model()?;
    let (x, z) = config.axes()?;
    info!("sampling {} x {} grid", x.len(), z.len());
    let grid = GridBuilder::new(x, z)?
        .component(config.component)
        .build(|x, z| model.value(x, z));
    let metadata = FieldFileMetadata::for_grid(MAP_AXES[0], MAP_AXES[1], &grid);
    Ok((grid, metadata))
}

/// Runs the generation with the tar.gz archiver and gnuplot quiver plots.
pub fn run(config: &FieldMapConfiguration) -> Result<FieldMapOutput> {
    run_with(config, &TarGzArchiver::default(), &QuiverPlot::default())
}

/// Runs the generation with the given collaborators.
///
/// The field file is complete on disk before the archiver or plotter are called; their failures
/// are returned but leave it in place.
pub fn run_with<A: Archiver, P: Plotter>(
    config: &FieldMapConfiguration,
    archiver: &A,
    plotter: &P,
) -> Result<FieldMapOutput> {
    let (grid, metadata) = generate(config)?;

    file::write(&grid, &metadata, &config.output_path)?;
    info!(
        "wrote {} samples to {}",
        grid.len(),
        config.output_path.display()
    );

    if let Some(destination) = &config.archive_path {
        archiver
            .archive(&[config.output_path.as_path()], destination)
            .map_err(|e| {
                warn!("archiving {} failed", config.output_path.display());
                e
            })?;
        info!("archived to {}", destination.display());
    }

    if let Some(destination) = &config.plot_path {
        plotter.plot(&grid, destination)?;
        info!("plotted to {}", destination.display());
    }

    Ok(FieldMapOutput {
        grid,
        metadata,
        field_file: config.output_path.clone(),
        archive: config.archive_path.clone(),
        plot: config.plot_path.clone(),
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::error::FieldMapError;
    use crate::fileinput;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    #[derive(Default)]
    struct RecordingArchiver {
        calls: RefCell<Vec<(Vec<PathBuf>, PathBuf)>>,
        fail: bool,
    }

    impl Archiver for RecordingArchiver {
        fn archive(&self, files: &[&Path], destination: &Path) -> Result<()> {
            self.calls.borrow_mut().push((
                files.iter().map(|f| f.to_path_buf()).collect(),
                destination.to_path_buf(),
            ));
            if self.fail {
                Err(FieldMapError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "archive refused",
                )))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct RecordingPlotter {
        plotted: RefCell<Vec<(usize, PathBuf)>>,
    }

    impl Plotter for RecordingPlotter {
        fn plot(&self, grid: &FieldGrid, destination: &Path) -> Result<()> {
            self.plotted
                .borrow_mut()
                .push((grid.len(), destination.to_path_buf()));
            Ok(())
        }
    }

    fn config_in(dir: &Path) -> FieldMapConfiguration {
        FieldMapConfiguration {
            output_path: dir.join("2dexample-along-xz.dat"),
            archive_path: Some(dir.join("2dexample-along-xz.tar.gz")),
            ..FieldMapConfiguration::default()
        }
    }

    #[test]
    fn test_run_writes_then_archives_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let archiver = RecordingArchiver::default();
        let plotter = RecordingPlotter::default();

        let output = run_with(&config, &archiver, &plotter).unwrap();
        assert_eq!(output.grid.len(), 663);
        assert_eq!(output.metadata.counts, [13, 51]);

        let calls = archiver.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec![config.output_path.clone()]);
        assert_eq!(Some(&calls[0].1), config.archive_path.as_ref());
        assert!(plotter.plotted.borrow().is_empty());

        let map = fileinput::load_file(&config.output_path).unwrap();
        assert_eq!(map.grid.shape(), (13, 51));
    }

    #[test]
    fn test_plot_only_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let config = FieldMapConfiguration {
            archive_path: None,
            plot_path: Some(dir.path().join("2dexample.png")),
            ..config_in(dir.path())
        };
        let archiver = RecordingArchiver::default();
        let plotter = RecordingPlotter::default();

        run_with(&config, &archiver, &plotter).unwrap();
        assert!(archiver.calls.borrow().is_empty());
        assert_eq!(
            *plotter.plotted.borrow(),
            vec![(663, dir.path().join("2dexample.png"))]
        );
    }

    #[test]
    fn test_archive_failure_keeps_field_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let archiver = RecordingArchiver {
            fail: true,
            ..RecordingArchiver::default()
        };

        let result = run_with(&config, &archiver, &RecordingPlotter::default());
        assert!(matches!(result, Err(FieldMapError::Io(_))));
        let (grid, metadata) = generate(&config).unwrap();
        assert_eq!(
            fs::read_to_string(&config.output_path).unwrap(),
            file::serialize(&grid, &metadata).unwrap()
        );
    }

    #[test]
    fn test_invalid_axis_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.x_range.step = 0.0;
        let result = run_with(
            &config,
            &RecordingArchiver::default(),
            &RecordingPlotter::default(),
        );
        assert!(matches!(result, Err(FieldMapError::InvalidAxis(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_with_tar_gz_archiver() {
        let dir = tempfile::tempdir().unwrap();
        let config = FieldMapConfiguration {
            x_range: crate::axis::AxisRange::new(-1.0, 1.0, 1.0),
            z_range: crate::axis::AxisRange::new(0.0, 0.1, 0.025),
            ..config_in(dir.path())
        };
        let output = run_with(&config, &TarGzArchiver::default(), &RecordingPlotter::default())
            .unwrap();
        assert_eq!(output.grid.shape(), (3, 5));
        assert!(dir.path().join("2dexample-along-xz.tar.gz").exists());
    }
}
