#![warn(missing_docs)]
use crate::{dottable::Dottable, geometry::Direction};
use serde::{Deserialize, Serialize};

/// The (single) light source of a scene.
///
/// The laser emits a beam of unit amplitude. All intensities of a solve are normalized to it.
///
/// ## Optical Ports
///   - Outputs
///     - one port in the emission direction, `radius + margin` away from the center
///
/// A disabled laser emits nothing and the solve returns an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Laser {
    /// emission on / off
    pub enabled: bool,
    /// emission direction
    pub direction: Direction,
}
impl Default for Laser {
    /// Creates an enabled laser emitting to the right.
    fn default() -> Self {
        Self {
            enabled: true,
            direction: Direction::East,
        }
    }
}
impl Laser {
    /// Creates a new enabled [`Laser`] emitting in the given direction.
    #[must_use]
    pub const fn new(direction: Direction) -> Self {
        Self {
            enabled: true,
            direction,
        }
    }
}
impl Dottable for Laser {
    fn node_color(&self) -> &'static str {
        "slateblue"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn default() {
        let l = Laser::default();
        assert!(l.enabled);
        assert_eq!(l.direction, Direction::East);
        assert_eq!(l.node_color(), "slateblue");
    }
    #[test]
    fn new() {
        let l = Laser::new(Direction::North);
        assert!(l.enabled);
        assert_eq!(l.direction, Direction::North);
    }
}
