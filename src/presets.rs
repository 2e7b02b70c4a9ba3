#![warn(missing_docs)]
//! Ready-made interferometer scenes.
use crate::{
    component::{Component, Element},
    config::GridGeometry,
    geometry::GridCell,
    nodes::{BeamSplitter, Detector, Laser, Mirror},
    scattering::Orientation,
    scene::Scene,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Names of the built-in scenes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Preset {
    /// laser pointing directly at a detector
    Straight,
    /// laser, 50/50 splitter and a detector in the transmitted beam
    SingleSplitter,
    /// balanced Mach-Zehnder interferometer
    MachZehnder,
    /// Mach-Zehnder interferometer with arms of different length
    DetunedMachZehnder,
    /// ring resonator coupled through a beam splitter
    Ring,
}
impl Preset {
    /// Build the scene of this preset.
    #[must_use]
    pub fn scene(self, grid: &GridGeometry) -> Scene {
        match self {
            Self::Straight => straight(grid),
            Self::SingleSplitter => single_splitter(grid),
            Self::MachZehnder => mach_zehnder(grid),
            Self::DetunedMachZehnder => detuned_mach_zehnder(grid),
            Self::Ring => ring(grid),
        }
    }
}

fn place(
    name: &str,
    element: impl Into<Element>,
    cell: (i32, i32),
    grid: &GridGeometry,
) -> Component {
    Component::at_cell(name, element, GridCell::from(cell), grid)
}

/// Laser → detector.
#[must_use]
pub fn straight(grid: &GridGeometry) -> Scene {
    Scene::new()
        .with_laser(place("laser", Laser::default(), (2, 5), grid))
        .with_component(place("det", Detector::new(), (6, 5), grid))
}

/// Laser → 50/50 splitter → detector. The reflected half leaves the canvas.
#[must_use]
pub fn single_splitter(grid: &GridGeometry) -> Scene {
    Scene::new()
        .with_laser(place("laser", Laser::default(), (2, 5), grid))
        .with_component(place(
            "bs",
            BeamSplitter::new(Orientation::Backslash),
            (5, 5),
            grid,
        ))
        .with_component(place("det", Detector::new(), (9, 5), grid))
        .with_gold(GridCell(7, 5))
}

/// Mach-Zehnder interferometer with two arms of equal length.
///
/// `det_bright` sees all the light and `det_dark` none.
#[must_use]
pub fn mach_zehnder(grid: &GridGeometry) -> Scene {
    Scene::new()
        .with_laser(place("laser", Laser::default(), (1, 5), grid))
        .with_component(place(
            "bs1",
            BeamSplitter::new(Orientation::Backslash),
            (4, 5),
            grid,
        ))
        .with_component(place("m_a", Mirror::new(Orientation::Backslash), (8, 5), grid))
        .with_component(place("m_b", Mirror::new(Orientation::Backslash), (4, 9), grid))
        .with_component(place(
            "bs2",
            BeamSplitter::new(Orientation::Backslash),
            (8, 9),
            grid,
        ))
        .with_component(place("det_bright", Detector::new(), (10, 9), grid))
        .with_component(place("det_dark", Detector::new(), (8, 11), grid))
        .with_gold(GridCell(6, 5))
}

/// Mach-Zehnder interferometer whose upper arm is longer than the direct one.
///
/// The split between the two detectors depends on the wavelength, their sum does not.
#[must_use]
pub fn detuned_mach_zehnder(grid: &GridGeometry) -> Scene {
    Scene::new()
        .with_laser(place("laser", Laser::default(), (1, 6), grid))
        .with_component(place(
            "bs1",
            BeamSplitter::new(Orientation::Slash),
            (4, 6),
            grid,
        ))
        .with_component(place("m1", Mirror::new(Orientation::Slash), (4, 2), grid))
        .with_component(place("m2", Mirror::new(Orientation::Backslash), (10, 2), grid))
        .with_component(place(
            "bs2",
            BeamSplitter::new(Orientation::Backslash),
            (10, 6),
            grid,
        ))
        .with_component(place("det1", Detector::new(), (13, 6), grid))
        .with_component(place("det2", Detector::new(), (10, 9), grid))
}

/// Ring of three mirrors closed by a beam splitter. Light circulates in the ring and leaves
/// towards the detector.
#[must_use]
pub fn ring(grid: &GridGeometry) -> Scene {
    Scene::new()
        .with_laser(place("laser", Laser::default(), (2, 8), grid))
        .with_component(place(
            "bs",
            BeamSplitter::new(Orientation::Backslash),
            (5, 8),
            grid,
        ))
        .with_component(place("m1", Mirror::new(Orientation::Slash), (8, 8), grid))
        .with_component(place("m2", Mirror::new(Orientation::Backslash), (8, 5), grid))
        .with_component(place("m3", Mirror::new(Orientation::Slash), (5, 5), grid))
        .with_component(place("det", Detector::new(), (5, 11), grid))
}
