#![warn(missing_docs)]
use crate::{
    config::SolverConfig,
    dottable::Dottable,
    error::{OpticsError, OpticsResult},
    scattering::{Orientation, Scatterer, SplitterCoefficients},
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Physical realization of a [`BeamSplitter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitterKind {
    /// 50/50 cube with a 90° reflection phase
    FiftyFifty,
    /// splitter with arbitrary power reflectivity and a 90° reflection phase
    Tunable {
        /// power reflectivity (0..=1)
        reflectivity: f64,
    },
    /// partially transmitting mirror with a π reflection phase
    PartialMirror {
        /// power reflectivity (0..=1)
        reflectivity: f64,
    },
}
impl Display for SplitterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FiftyFifty => write!(f, "50/50 beam splitter"),
            Self::Tunable { reflectivity } => {
                write!(f, "tunable beam splitter (R={reflectivity})")
            }
            Self::PartialMirror { reflectivity } => {
                write!(f, "partial mirror (R={reflectivity})")
            }
        }
    }
}

/// A diagonally mounted beam splitter.
///
/// It splits an incoming beam into a transmitted part leaving on the opposite side and a
/// reflected part leaving sideways (depending on the [`Orientation`]).
///
/// ## Optical Ports
///   - `A`, `B`, `C`, `D` (bidirectional)
///
/// ## Coefficients
///   - [`SplitterKind::FiftyFifty`]: `t = 1/√2`, `r = i/√2`
///   - [`SplitterKind::Tunable`]: `t = √(1-R)`, `r = i√R`
///   - [`SplitterKind::PartialMirror`]: `t = √(1-R)`, `r = -√R`
///
/// The reflection on the second face `r'` follows from the reciprocity relation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSplitter {
    /// mounting diagonal
    pub orientation: Orientation,
    /// splitter type
    pub kind: SplitterKind,
}
impl BeamSplitter {
    /// Creates a new 50/50 [`BeamSplitter`].
    #[must_use]
    pub const fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            kind: SplitterKind::FiftyFifty,
        }
    }
    /// Creates a new tunable [`BeamSplitter`] with the given power reflectivity.
    ///
    /// # Errors
    ///
    /// This function will return an error if the reflectivity is not within `[0, 1]`.
    pub fn new_tunable(orientation: Orientation, reflectivity: f64) -> OpticsResult<Self> {
        check_reflectivity(reflectivity)?;
        Ok(Self {
            orientation,
            kind: SplitterKind::Tunable { reflectivity },
        })
    }
    /// Creates a new partial mirror with the given power reflectivity.
    ///
    /// # Errors
    ///
    /// This function will return an error if the reflectivity is not within `[0, 1]`.
    pub fn new_partial_mirror(orientation: Orientation, reflectivity: f64) -> OpticsResult<Self> {
        check_reflectivity(reflectivity)?;
        Ok(Self {
            orientation,
            kind: SplitterKind::PartialMirror { reflectivity },
        })
    }
    /// Power reflectivity of this splitter.
    #[must_use]
    pub const fn reflectivity(&self) -> f64 {
        match self.kind {
            SplitterKind::FiftyFifty => 0.5,
            SplitterKind::Tunable { reflectivity }
            | SplitterKind::PartialMirror { reflectivity } => reflectivity,
        }
    }
}
fn check_reflectivity(reflectivity: f64) -> OpticsResult<()> {
    if (0.0..=1.0).contains(&reflectivity) {
        Ok(())
    } else {
        Err(OpticsError::Component(format!(
            "reflectivity must be within [0,1], got {reflectivity}"
        )))
    }
}
impl Scatterer for BeamSplitter {
    fn orientation(&self) -> Orientation {
        self.orientation
    }
    fn coefficients(&self) -> SplitterCoefficients {
        match self.kind {
            SplitterKind::FiftyFifty => SplitterCoefficients::fifty_fifty(),
            SplitterKind::Tunable { reflectivity } => SplitterCoefficients::tunable(reflectivity),
            SplitterKind::PartialMirror { reflectivity } => {
                SplitterCoefficients::partial_mirror(reflectivity)
            }
        }
    }
    fn power_loss(&self, config: &SolverConfig) -> f64 {
        match self.kind {
            SplitterKind::PartialMirror { .. } => config.effective_mirror_loss(),
            _ => config.effective_splitter_loss(),
        }
    }
}
impl Dottable for BeamSplitter {
    fn node_color(&self) -> &'static str {
        "lightpink"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{diagnostics::Diagnostics, optic_ports::PortLabel};
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    #[test]
    fn new() {
        let bs = BeamSplitter::new(Orientation::Slash);
        assert_eq!(bs.kind, SplitterKind::FiftyFifty);
        assert_eq!(bs.reflectivity(), 0.5);
        assert_eq!(bs.node_color(), "lightpink");
    }
    #[test]
    fn new_tunable() {
        let bs = BeamSplitter::new_tunable(Orientation::Slash, 0.3).unwrap();
        assert_eq!(bs.reflectivity(), 0.3);
        assert_matches!(
            BeamSplitter::new_tunable(Orientation::Slash, 1.1),
            Err(OpticsError::Component(_))
        );
        assert!(BeamSplitter::new_tunable(Orientation::Slash, f64::NAN).is_err());
    }
    #[test]
    fn new_partial_mirror() {
        let bs = BeamSplitter::new_partial_mirror(Orientation::Backslash, 0.8).unwrap();
        assert_eq!(bs.reflectivity(), 0.8);
        assert!(BeamSplitter::new_partial_mirror(Orientation::Backslash, -0.1).is_err());
    }
    #[test]
    fn display() {
        assert_eq!(format!("{}", SplitterKind::FiftyFifty), "50/50 beam splitter");
        assert_eq!(
            format!("{}", SplitterKind::Tunable { reflectivity: 0.25 }),
            "tunable beam splitter (R=0.25)"
        );
    }
    #[test]
    fn tunable_matrix() {
        let bs = BeamSplitter::new_tunable(Orientation::Backslash, 0.2).unwrap();
        let mut d = Diagnostics::new();
        let s = bs.scattering_matrix(&SolverConfig::default(), "bs", &mut d);
        assert_abs_diff_eq!(s.get(PortLabel::B, PortLabel::A).norm_sqr(), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(s.get(PortLabel::C, PortLabel::A).norm_sqr(), 0.8, epsilon = 1e-12);
        assert!(d.records().is_empty());
    }
    #[test]
    fn losses() {
        let config = SolverConfig {
            ideal_components: false,
            beam_splitter_loss: 0.1,
            ..Default::default()
        };
        assert_eq!(BeamSplitter::new(Orientation::Slash).power_loss(&config), 0.1);
        let pm = BeamSplitter::new_partial_mirror(Orientation::Slash, 0.5).unwrap();
        assert_eq!(pm.power_loss(&config), 0.05);
        assert_eq!(pm.power_loss(&SolverConfig::default()), 0.0);
    }
    #[test]
    fn serde() {
        let bs = BeamSplitter::new_tunable(Orientation::Slash, 0.3).unwrap();
        let s = serde_json::to_string(&bs).unwrap();
        let back: BeamSplitter = serde_json::from_str(&s).unwrap();
        assert_eq!(back, bs);
    }
}
