#![warn(missing_docs)]
use crate::dottable::Dottable;
use serde::{Deserialize, Serialize};

/// An ideal photo detector.
///
/// A detector absorbs every beam arriving at any of its four sides. The coherent sum of the
/// arriving amplitudes is computed by the
/// [`DetectorAccumulator`](crate::accumulator::DetectorAccumulator); the resulting intensity is
/// written back into [`Detector::intensity`] by
/// [`Scene::apply_readings`](crate::scene::Scene::apply_readings).
///
/// ## Optical Ports
///   - Inputs
///     - `A`, `B`, `C`, `D`
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    /// intensity of the last solve (in units of the laser intensity)
    #[serde(default)]
    pub intensity: f64,
}
impl Detector {
    /// Creates a new [`Detector`] with zero intensity.
    #[must_use]
    pub const fn new() -> Self {
        Self { intensity: 0.0 }
    }
}
impl Dottable for Detector {
    fn node_color(&self) -> &'static str {
        "lemonchiffon"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn new() {
        assert_eq!(Detector::new().intensity, 0.0);
        assert_eq!(Detector::default(), Detector::new());
        assert_eq!(Detector::new().node_color(), "lemonchiffon");
    }
}
