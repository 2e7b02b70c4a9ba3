#![warn(missing_docs)]
//! Scene snapshots and the string-tagged scene description format.
//!
//! A [`Scene`] is the input of a solve: the laser, the other placed components, the blocked
//! cells and the gold cells. A [`SceneDescription`] is the serializable form using kind names,
//! orientation tags (`/`, `\`) and grid coordinates, e.g.
//!
//! ```yaml
//! laser: { cell: [1, 6] }
//! components:
//!   - { name: bs1, kind: beam_splitter, cell: [4, 6], orientation: "/" }
//!   - { name: det, kind: detector, cell: [13, 6] }
//! blocked: [[7, 7]]
//! gold: [[6, 6]]
//! ```
use crate::{
    accumulator::DetectorReading,
    component::{Component, ComponentKind, Element},
    config::GridGeometry,
    error::{OpticsError, OpticsResult},
    geometry::{Direction, GridCell},
    nodes::{BeamSplitter, Detector, Laser, Mirror},
    scattering::Orientation,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, path::Path, str::FromStr};

/// Snapshot of everything the solver needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// the light source
    pub laser: Option<Component>,
    /// all other placed components
    pub components: Vec<Component>,
    /// beam absorbing cells
    #[serde(default)]
    pub blocked: BTreeSet<GridCell>,
    /// bonus cells
    #[serde(default)]
    pub gold: BTreeSet<GridCell>,
}
impl Scene {
    /// Creates a new, empty [`Scene`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Set the laser of this scene.
    #[must_use]
    pub fn with_laser(mut self, laser: Component) -> Self {
        self.laser = Some(laser);
        self
    }
    /// Add a component.
    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }
    /// Mark a cell as blocked.
    #[must_use]
    pub fn with_blocked(mut self, cell: GridCell) -> Self {
        self.blocked.insert(cell);
        self
    }
    /// Mark a cell as gold.
    #[must_use]
    pub fn with_gold(mut self, cell: GridCell) -> Self {
        self.gold.insert(cell);
        self
    }
    /// Returns the detectors of this scene.
    pub fn detectors(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.is_detector())
    }
    /// Find a component (or the laser) by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.laser
            .iter()
            .chain(self.components.iter())
            .find(|c| c.name() == name)
    }
    /// Write the intensities of the readings into the detector elements.
    ///
    /// Detectors without a reading are reset to zero.
    pub fn apply_readings(&mut self, readings: &[DetectorReading]) {
        for component in &mut self.components {
            let id = component.id();
            if let Some(detector) = component.detector_mut() {
                detector.intensity = readings
                    .iter()
                    .find(|r| r.detector == id)
                    .map_or(0.0, |r| r.intensity);
            }
        }
    }
}

/// Serializable description of a single component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescription {
    /// component name. Defaults to `<kind><index>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// kind name (e.g. `mirror`, `beam_splitter`, `tunable_beam_splitter`)
    #[serde(default = "laser_kind")]
    pub kind: String,
    /// grid cell the component is centered on
    pub cell: GridCell,
    /// orientation tag `/` or `\` (mirrors and splitters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    /// power reflectivity (tunable splitters and partial mirrors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflectivity: Option<f64>,
    /// emission on / off (laser)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// emission direction (laser)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}
fn laser_kind() -> String {
    ComponentKind::Laser.to_string()
}
impl Default for ComponentDescription {
    fn default() -> Self {
        Self {
            name: None,
            kind: laser_kind(),
            cell: GridCell::default(),
            orientation: None,
            reflectivity: None,
            enabled: None,
            direction: None,
        }
    }
}
impl ComponentDescription {
    fn orientation(&self, name: &str) -> OpticsResult<Orientation> {
        self.orientation
            .as_deref()
            .ok_or_else(|| OpticsError::Component(format!("{name}: missing orientation tag")))
            .and_then(Orientation::from_str)
    }
    fn reflectivity(&self, name: &str) -> OpticsResult<f64> {
        self.reflectivity
            .ok_or_else(|| OpticsError::Component(format!("{name}: missing reflectivity")))
    }
    /// Convert into a placed [`Component`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the kind name or the orientation tag is unknown, or
    /// a required parameter is missing or out of range.
    pub fn to_component(&self, index: usize, grid: &GridGeometry) -> OpticsResult<Component> {
        let kind = ComponentKind::from_str(self.kind.trim()).map_err(|_| {
            OpticsError::Component(format!("unknown component kind '{}'", self.kind))
        })?;
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("{kind}{index}"));
        let element: Element = match kind {
            ComponentKind::Laser => Laser {
                enabled: self.enabled.unwrap_or(true),
                direction: self.direction.unwrap_or(Direction::East),
            }
            .into(),
            ComponentKind::Mirror => Mirror::new(self.orientation(&name)?).into(),
            ComponentKind::BeamSplitter => BeamSplitter::new(self.orientation(&name)?).into(),
            ComponentKind::TunableBeamSplitter => {
                BeamSplitter::new_tunable(self.orientation(&name)?, self.reflectivity(&name)?)?
                    .into()
            }
            ComponentKind::PartialMirror => BeamSplitter::new_partial_mirror(
                self.orientation(&name)?,
                self.reflectivity(&name)?,
            )?
            .into(),
            ComponentKind::Detector => Detector::new().into(),
        };
        Ok(Component::at_cell(&name, element, self.cell, grid))
    }
}

/// Serializable description of a [`Scene`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// the light source (`kind` may be omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laser: Option<ComponentDescription>,
    /// all other components
    #[serde(default)]
    pub components: Vec<ComponentDescription>,
    /// beam absorbing cells
    #[serde(default)]
    pub blocked: BTreeSet<GridCell>,
    /// bonus cells
    #[serde(default)]
    pub gold: BTreeSet<GridCell>,
}
impl SceneDescription {
    /// Build the [`Scene`] on the given grid.
    ///
    /// # Errors
    ///
    /// This function will return an error if a component description is invalid or the laser
    /// entry does not describe a laser.
    pub fn to_scene(&self, grid: &GridGeometry) -> OpticsResult<Scene> {
        let laser = self
            .laser
            .as_ref()
            .map(|l| l.to_component(0, grid))
            .transpose()?;
        if let Some(l) = &laser {
            if l.kind() != ComponentKind::Laser {
                return Err(OpticsError::Scene(format!(
                    "laser entry '{}' is a {}",
                    l.name(),
                    l.kind()
                )));
            }
        }
        let components = self
            .components
            .iter()
            .enumerate()
            .map(|(idx, c)| c.to_component(idx + 1, grid))
            .collect::<OpticsResult<Vec<_>>>()?;
        Ok(Scene {
            laser,
            components,
            blocked: self.blocked.clone(),
            gold: self.gold.clone(),
        })
    }
    /// Read a description from a `.yaml`/`.yml` or `.json` file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be read, has an unknown extension
    /// or cannot be parsed.
    pub fn from_file(path: &Path) -> OpticsResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OpticsError::Scene(format!("cannot read file {} : {}", path.display(), e))
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&contents)
                .map_err(|e| OpticsError::Scene(format!("parsing of scene failed: {e}"))),
            Some("json") => serde_json::from_str(&contents)
                .map_err(|e| OpticsError::Scene(format!("parsing of scene failed: {e}"))),
            _ => Err(OpticsError::Scene(format!(
                "unsupported scene file type: {}",
                path.display()
            ))),
        }
    }
}
