#![warn(missing_docs)]
use crate::{
    config::SolverConfig,
    dottable::Dottable,
    scattering::{Orientation, Scatterer, SplitterCoefficients},
};
use serde::{Deserialize, Serialize};

/// A plane, fully reflecting mirror mounted diagonally.
///
/// ## Optical Ports
///   - `A`, `B`, `C`, `D` (bidirectional)
///
/// Both faces reflect with a π phase shift. Outside the ideal-components mode the configured
/// `mirror_loss` is removed from the reflected power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mirror {
    /// mounting diagonal
    pub orientation: Orientation,
}
impl Mirror {
    /// Creates a new [`Mirror`].
    #[must_use]
    pub const fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }
}
impl Scatterer for Mirror {
    fn orientation(&self) -> Orientation {
        self.orientation
    }
    fn coefficients(&self) -> SplitterCoefficients {
        SplitterCoefficients::mirror()
    }
    fn power_loss(&self, config: &SolverConfig) -> f64 {
        config.effective_mirror_loss()
    }
}
impl Dottable for Mirror {
    fn node_color(&self) -> &'static str {
        "aliceblue"
    }
}
