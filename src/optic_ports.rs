#![warn(missing_docs)]
//! Optical ports of the placed components.
//!
//! Ports are plain value records stored in a [`PortArena`] which is rebuilt for every solve.
//! A port is addressed by its [`PortId`] (index into the arena) and knows the index of the
//! component it belongs to.
use crate::{config::SolverConfig, geometry::Direction};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Label of one of the four ports of a component.
///
/// The label is fixed to the side of the component: `A` left, `B` bottom, `C` right, `D` top.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum PortLabel {
    /// left
    A,
    /// bottom
    B,
    /// right
    C,
    /// top
    D,
}
impl PortLabel {
    /// All labels in matrix order.
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Row / column index of this port in a
    /// [`ScatteringMatrix`](crate::scattering::ScatteringMatrix).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }
    /// Direction in which a beam leaves the component through this port.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::A => Direction::West,
            Self::B => Direction::South,
            Self::C => Direction::East,
            Self::D => Direction::North,
        }
    }
    /// The port on the side facing `direction`.
    #[must_use]
    pub const fn facing(direction: Direction) -> Self {
        match direction {
            Direction::West => Self::A,
            Direction::South => Self::B,
            Direction::East => Self::C,
            Direction::North => Self::D,
        }
    }
}

/// Handle of a port in a [`PortArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortId(pub usize);

/// A single port of a placed component.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalPort {
    /// index of the owning component in the solve's node list
    pub node: usize,
    /// side of the component
    pub label: PortLabel,
    /// position of the port on the canvas
    pub position: Point2<f64>,
    /// direction of a beam leaving through this port
    pub direction: Direction,
}

/// Arena of all ports of one solve.
#[derive(Debug, Default, Clone)]
pub struct PortArena {
    ports: Vec<OpticalPort>,
}
impl PortArena {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self { ports: Vec::new() }
    }
    /// Add the four ports of a component centered at `center`, half a grid cell away from it.
    pub fn add_four_ports(&mut self, node: usize, center: &Point2<f64>, config: &SolverConfig) {
        let offset = config.grid.cell_size / 2.0;
        for label in PortLabel::ALL {
            let direction = label.direction();
            self.ports.push(OpticalPort {
                node,
                label,
                position: center + direction.vector() * offset,
                direction,
            });
        }
    }
    /// Add the single emitting port of a laser.
    pub fn add_laser_port(
        &mut self,
        node: usize,
        center: &Point2<f64>,
        direction: Direction,
        config: &SolverConfig,
    ) -> PortId {
        let offset = config.component_radius + config.laser_port_margin;
        self.ports.push(OpticalPort {
            node,
            label: PortLabel::facing(direction),
            position: center + direction.vector() * offset,
            direction,
        });
        PortId(self.ports.len() - 1)
    }
    /// Returns the port with the given id.
    #[must_use]
    pub fn get(&self, id: PortId) -> Option<&OpticalPort> {
        self.ports.get(id.0)
    }
    /// Port of the given node with the given label.
    #[must_use]
    pub fn find(&self, node: usize, label: PortLabel) -> Option<PortId> {
        self.ports
            .iter()
            .position(|p| p.node == node && p.label == label)
            .map(PortId)
    }
    /// Iterate over all ports with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (PortId, &OpticalPort)> {
        self.ports.iter().enumerate().map(|(i, p)| (PortId(i), p))
    }
    /// Number of ports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ports.len()
    }
    /// Returns `true` if the arena holds no ports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    #[test]
    fn label_directions() {
        for label in PortLabel::ALL {
            assert_eq!(PortLabel::facing(label.direction()), label);
        }
        assert_eq!(PortLabel::B.direction(), Direction::South);
        assert_eq!(PortLabel::D.index(), 3);
        assert_eq!(format!("{}", PortLabel::C), "C");
    }
    #[test]
    fn four_ports() {
        let config = SolverConfig::default();
        let mut arena = PortArena::new();
        assert!(arena.is_empty());
        arena.add_four_ports(2, &Point2::new(100.0, 100.0), &config);
        assert_eq!(arena.len(), 4);
        let b = arena.get(arena.find(2, PortLabel::B).unwrap()).unwrap();
        assert_abs_diff_eq!(b.position.y, 120.0);
        assert_abs_diff_eq!(b.position.x, 100.0);
        assert_eq!(b.direction, Direction::South);
        assert!(arena.find(1, PortLabel::A).is_none());
    }
    #[test]
    fn laser_port() {
        let config = SolverConfig::default();
        let mut arena = PortArena::new();
        let id = arena.add_laser_port(0, &Point2::new(100.0, 100.0), Direction::East, &config);
        let port = arena.get(id).unwrap();
        assert_abs_diff_eq!(port.position.x, 130.0);
        assert_eq!(port.label, PortLabel::C);
        assert_eq!(arena.iter().count(), 1);
    }
}
