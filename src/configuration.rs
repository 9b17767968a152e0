//! Parameters of a field map generation run, with defaults reproducing the 2D undulator example.
//!
//! A configuration can be read from YAML or JSON. Every key is optional:
//!
//! ```yaml
//! x_range: { start: -30.0, stop: 30.0, step: 5.0 }
//! z_range: { start: -25.0, stop: 25.0, step: 1.0 }
//! amplitude: 1.0
//! period: 0.1
//! output_path: 2dexample-along-xz.dat
//! ```

use crate::axis::{AxisRange, AxisSamples};
use crate::error::{FieldMapError, Result};
use crate::magnetic::sinusoidal::SinusoidalField;
use crate::magnetic::FieldComponent;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldMapConfiguration {
    /// Samples along the first mapped axis (x), cm.
    #[serde(alias = "xRange")]
    pub x_range: AxisRange,

    /// Samples along the second mapped axis (z), cm.
    #[serde(alias = "zRange")]
    pub z_range: AxisRange,

    /// Peak field of the sinusoidal model, Tesla.
    pub amplitude: f64,

    /// Period of the field oscillation along z.
    pub period: f64,

    /// Quadratic growth of the field along x.
    pub curvature: f64,

    /// Component of the field vector that the model fills.
    pub component: FieldComponent,

    /// Where the field file is written.
    #[serde(alias = "outputPath")]
    pub output_path: PathBuf,

    /// Where the compressed archive is written. No archive is made when absent.
    #[serde(alias = "archivePath")]
    pub archive_path: Option<PathBuf>,

    /// Where a quiver plot of the grid is saved. No plot is made when absent.
    #[serde(alias = "plotPath")]
    pub plot_path: Option<PathBuf>,
}

impl Default for FieldMapConfiguration {
    fn default() -> Self {
        let model = SinusoidalField::default();
        FieldMapConfiguration {
            x_range: AxisRange::new(-30.0, 30.0, 5.0),
            z_range: AxisRange::new(-25.0, 25.0, 1.0),
            amplitude: model.amplitude,
            period: model.period,
            curvature: model.curvature,
            component: FieldComponent::Y,
            output_path: PathBuf::from("2dexample-along-xz.dat"),
            archive_path: Some(PathBuf::from("2dexample-along-xz.tar.gz")),
            plot_path: None,
        }
    }
}

impl FieldMapConfiguration {
    /// Loads a configuration from a `.yaml`/`.yml` or `.json` file.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            Some("json") => Self::from_json(&contents),
            _ => Err(FieldMapError::Config(format!(
                "{} is neither a .yaml nor a .json file",
                path.display()
            ))),
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| FieldMapError::Config(e.to_string()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| FieldMapError::Config(e.to_string()))
    }

    /// The sinusoidal field model described by this configuration.
    pub fn field_model(&self) -> Result<SinusoidalField> {
        if !(self.period.is_finite() && self.period != 0.0) {
            return Err(FieldMapError::Config(format!(
                "period must be finite and non-zero, got {}",
                self.period
            )));
        }
        if !(self.amplitude.is_finite() && self.curvature.is_finite()) {
            return Err(FieldMapError::Config(
                "amplitude and curvature must be finite".to_string(),
            ));
        }
        Ok(SinusoidalField {
            amplitude: self.amplitude,
            curvature: self.curvature,
            period: self.period,
        })
    }

    /// Generates the x and z axis samples.
    pub fn axes(&self) -> Result<(AxisSamples, AxisSamples)> {
        Ok((self.x_range.samples()?, self.z_range.samples()?))
    }
}

/// Command-line settings that take precedence over a loaded configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub output_path: Option<PathBuf>,
    pub archive_path: Option<PathBuf>,
    /// Disables archiving, whatever `archive_path` or the configuration say.
    pub no_archive: bool,
    pub plot_path: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, config: &mut FieldMapConfiguration) {
        if let Some(output) = &self.output_path {
            config.output_path = output.clone();
        }
        if let Some(archive) = &self.archive_path {
            config.archive_path = Some(archive.clone());
        }
        if self.no_archive {
            config.archive_path = None;
        }
        if let Some(plot) = &self.plot_path {
            config.plot_path = Some(plot.clone());
        }
    }
}

/// Loads `path` if given, falling back to the defaults, then applies `overrides`.
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<FieldMapConfiguration> {
    let mut config = match path {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            FieldMapConfiguration::load_file(path)?
        }
        None => FieldMapConfiguration::default(),
    };
    overrides.apply(&mut config);
    Ok(config)
}
