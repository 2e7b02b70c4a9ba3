#![warn(missing_docs)]
//! Solver configuration
//!
//! All values are in canvas pixels unless stated otherwise. Every field has a default so that
//! a configuration file only needs to name the values it changes.
use crate::error::{OpticsError, OpticsResult};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::{f64::consts::PI, path::Path};
use strum::{Display, EnumIter, EnumString};

/// Geometry of the placement grid and of the canvas it is drawn on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridGeometry {
    /// grid pitch
    pub cell_size: f64,
    /// canvas origin (top left corner). Cell `(0,0)` is centered here.
    pub offset: [f64; 2],
    /// canvas width
    pub width: f64,
    /// canvas height
    pub height: f64,
}
impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            cell_size: 40.0,
            offset: [320.0, 100.0],
            width: 800.0,
            height: 600.0,
        }
    }
}
impl GridGeometry {
    /// Canvas origin as a point.
    #[must_use]
    pub const fn origin(&self) -> Point2<f64> {
        Point2::new(self.offset[0], self.offset[1])
    }
    /// Canvas extent as a vector.
    #[must_use]
    pub const fn extent(&self) -> Vector2<f64> {
        Vector2::new(self.width, self.height)
    }
}

/// Strategy used to find the steady state of a scene.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Strategy {
    /// build the connection network and solve the linear system. Falls back to [`Strategy::Bounce`]
    /// if no connection is found.
    #[default]
    Network,
    /// always use the generation-by-generation bounce tracer
    Bounce,
}

/// Configuration of the [`WaveOpticsEngine`](crate::engine::WaveOpticsEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// grid and canvas geometry
    pub grid: GridGeometry,
    /// wavelength of the laser
    pub wavelength: f64,
    /// hit radius of a component
    pub component_radius: f64,
    /// distance of the laser port beyond the component radius
    pub laser_port_margin: f64,
    /// ray marching step
    pub ray_step: f64,
    /// maximum length of a single ray
    pub max_ray_distance: f64,
    /// sampling interval along a beam path for gold field detection
    pub gold_sample_spacing: f64,
    /// minimum beam amplitude for path records and detector contributions
    pub path_amplitude_threshold: f64,
    /// diagonal term added to `I - A`
    pub regularization: f64,
    /// maximum number of generations of the bounce tracer
    pub max_bounce_generations: usize,
    /// beams weaker than this are dropped by the bounce tracer
    pub bounce_amplitude_cutoff: f64,
    /// if `true`, mirror and beam splitter losses are ignored
    pub ideal_components: bool,
    /// fraction of power lost at each mirror reflection
    pub mirror_loss: f64,
    /// fraction of power lost at each beam splitter
    pub beam_splitter_loss: f64,
    /// solving strategy
    pub strategy: Strategy,
    /// wall clock budget of the bounce tracer in milliseconds
    pub time_budget_ms: u64,
}
impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            grid: GridGeometry::default(),
            wavelength: 30.0,
            component_radius: 25.0,
            laser_port_margin: 5.0,
            ray_step: 2.0,
            max_ray_distance: 2000.0,
            gold_sample_spacing: 5.0,
            path_amplitude_threshold: 0.001,
            regularization: 1e-10,
            max_bounce_generations: 20,
            bounce_amplitude_cutoff: 1e-6,
            ideal_components: true,
            mirror_loss: 0.05,
            beam_splitter_loss: 0.0,
            strategy: Strategy::Network,
            time_budget_ms: 250,
        }
    }
}
impl SolverConfig {
    /// Wave number `k = 2π/λ`.
    #[must_use]
    pub fn wave_number(&self) -> f64 {
        2.0 * PI / self.wavelength
    }
    /// Effective power loss of a mirror reflection.
    #[must_use]
    pub fn effective_mirror_loss(&self) -> f64 {
        if self.ideal_components {
            0.0
        } else {
            self.mirror_loss
        }
    }
    /// Effective power loss of a beam splitter.
    #[must_use]
    pub fn effective_splitter_loss(&self) -> f64 {
        if self.ideal_components {
            0.0
        } else {
            self.beam_splitter_loss
        }
    }
    /// Check the configuration for physically meaningless values.
    ///
    /// # Errors
    ///
    /// This function will return an error if a length is not strictly positive or a loss
    /// fraction lies outside `[0, 1]`.
    pub fn validate(&self) -> OpticsResult<()> {
        let positive = [
            ("wavelength", self.wavelength),
            ("grid.cell_size", self.grid.cell_size),
            ("grid.width", self.grid.width),
            ("grid.height", self.grid.height),
            ("component_radius", self.component_radius),
            ("ray_step", self.ray_step),
            ("max_ray_distance", self.max_ray_distance),
            ("gold_sample_spacing", self.gold_sample_spacing),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(OpticsError::Config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("mirror_loss", self.mirror_loss),
            ("beam_splitter_loss", self.beam_splitter_loss),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OpticsError::Config(format!(
                    "{name} must be within [0,1], got {value}"
                )));
            }
        }
        if self.regularization < 0.0 || !self.regularization.is_finite() {
            return Err(OpticsError::Config(
                "regularization must be non-negative".into(),
            ));
        }
        Ok(())
    }
    /// Read a configuration from a `.yaml`/`.yml` or `.json` file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be read, has an unknown extension,
    /// cannot be parsed or fails [`SolverConfig::validate`].
    pub fn from_file(path: &Path) -> OpticsResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OpticsError::Config(format!("cannot read file {} : {}", path.display(), e))
        })?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&contents)
                .map_err(|e| OpticsError::Config(format!("parsing of config failed: {e}")))?,
            Some("json") => serde_json::from_str(&contents)
                .map_err(|e| OpticsError::Config(format!("parsing of config failed: {e}")))?,
            _ => {
                return Err(OpticsError::Config(format!(
                    "unsupported config file type: {}",
                    path.display()
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }
}
