#![warn(missing_docs)]
//! Placed components
//!
//! A [`Component`] couples a stable identity and a canvas position with the physical
//! [`Element`] it represents.
use crate::{
    config::GridGeometry,
    dottable::Dottable,
    geometry::GridCell,
    nodes::{BeamSplitter, Detector, Laser, Mirror, SplitterKind},
    scattering::Scatterer,
};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use uuid::Uuid;

/// Kind tag of a component.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComponentKind {
    /// light source
    Laser,
    /// full mirror
    Mirror,
    /// 50/50 beam splitter
    BeamSplitter,
    /// beam splitter with adjustable reflectivity
    TunableBeamSplitter,
    /// partially transmitting mirror
    PartialMirror,
    /// photo detector
    Detector,
}

/// The physical element of a [`Component`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum Element {
    /// light source
    Laser(Laser),
    /// full mirror
    Mirror(Mirror),
    /// beam splitter family
    BeamSplitter(BeamSplitter),
    /// photo detector
    Detector(Detector),
}
impl Element {
    /// Kind tag of this element.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Laser(_) => ComponentKind::Laser,
            Self::Mirror(_) => ComponentKind::Mirror,
            Self::BeamSplitter(bs) => match bs.kind {
                SplitterKind::FiftyFifty => ComponentKind::BeamSplitter,
                SplitterKind::Tunable { .. } => ComponentKind::TunableBeamSplitter,
                SplitterKind::PartialMirror { .. } => ComponentKind::PartialMirror,
            },
            Self::Detector(_) => ComponentKind::Detector,
        }
    }
    /// The element as a [`Scatterer`] if it has a scattering matrix.
    #[must_use]
    pub fn as_scatterer(&self) -> Option<&dyn Scatterer> {
        match self {
            Self::Mirror(m) => Some(m),
            Self::BeamSplitter(bs) => Some(bs),
            Self::Laser(_) | Self::Detector(_) => None,
        }
    }
    fn as_dottable(&self) -> &dyn Dottable {
        match self {
            Self::Laser(l) => l,
            Self::Mirror(m) => m,
            Self::BeamSplitter(bs) => bs,
            Self::Detector(d) => d,
        }
    }
}
impl From<Laser> for Element {
    fn from(value: Laser) -> Self {
        Self::Laser(value)
    }
}
impl From<Mirror> for Element {
    fn from(value: Mirror) -> Self {
        Self::Mirror(value)
    }
}
impl From<BeamSplitter> for Element {
    fn from(value: BeamSplitter) -> Self {
        Self::BeamSplitter(value)
    }
}
impl From<Detector> for Element {
    fn from(value: Detector) -> Self {
        Self::Detector(value)
    }
}

/// A component placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    id: Uuid,
    name: String,
    position: Point2<f64>,
    /// rotation in degrees. Only used for drawing.
    #[serde(default)]
    pub rotation: f64,
    element: Element,
}
impl Component {
    /// Creates a new [`Component`] with a fresh id.
    #[must_use]
    pub fn new(name: &str, element: impl Into<Element>, position: Point2<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            position,
            rotation: 0.0,
            element: element.into(),
        }
    }
    /// Creates a new [`Component`] centered on the given grid cell.
    #[must_use]
    pub fn at_cell(
        name: &str,
        element: impl Into<Element>,
        cell: GridCell,
        grid: &GridGeometry,
    ) -> Self {
        Self::new(name, element, cell.center(grid))
    }
    /// Returns the id of this [`Component`].
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }
    /// Returns the name of this [`Component`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Returns the position of this [`Component`].
    #[must_use]
    pub const fn position(&self) -> &Point2<f64> {
        &self.position
    }
    /// Move this [`Component`].
    pub fn set_position(&mut self, position: Point2<f64>) {
        self.position = position;
    }
    /// Returns the element of this [`Component`].
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }
    /// Returns the kind tag of this [`Component`].
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.element.kind()
    }
    /// Returns the laser if this component is one.
    #[must_use]
    pub const fn laser(&self) -> Option<&Laser> {
        match &self.element {
            Element::Laser(l) => Some(l),
            _ => None,
        }
    }
    /// Mutable access to the laser if this component is one.
    pub fn laser_mut(&mut self) -> Option<&mut Laser> {
        match &mut self.element {
            Element::Laser(l) => Some(l),
            _ => None,
        }
    }
    /// Returns the detector if this component is one.
    #[must_use]
    pub const fn detector(&self) -> Option<&Detector> {
        match &self.element {
            Element::Detector(d) => Some(d),
            _ => None,
        }
    }
    /// Mutable access to the detector if this component is one.
    pub fn detector_mut(&mut self) -> Option<&mut Detector> {
        match &mut self.element {
            Element::Detector(d) => Some(d),
            _ => None,
        }
    }
    /// Returns `true` if this component is a detector.
    #[must_use]
    pub const fn is_detector(&self) -> bool {
        matches!(self.element, Element::Detector(_))
    }
    /// Dot statement of this component.
    #[must_use]
    pub fn to_dot(&self, node_index: usize, ports: &[&str]) -> String {
        let label = format!("{} ({})", self.name, self.kind());
        self.element.as_dottable().to_dot(node_index, &label, ports)
    }
}
impl Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.kind())
    }
}
