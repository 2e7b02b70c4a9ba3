#![warn(missing_docs)]
//! Scattering-matrix model of the four-port components.
//!
//! A four-port component (mirror, beam splitter) is described by a 4×4 complex matrix `S`
//! mapping the amplitudes entering through the ports `[A, B, C, D]` to the amplitudes leaving
//! through them: `out[p] = Σ S[p, q] · in[q]`.
//!
//! The reflection pairs depend on the [`Orientation`] of the component while the transmission
//! pairs are always `A ↔ C` and `B ↔ D`:
//!
//! | orientation | reflection `r` | reflection `r'` |
//! |-------------|----------------|-----------------|
//! | `\`         | `A ↔ B`        | `C ↔ D`         |
//! | `/`         | `A ↔ D`        | `B ↔ C`         |
use crate::{
    config::SolverConfig,
    diagnostics::Diagnostics,
    error::{OpticsError, OpticsResult},
    optic_ports::PortLabel,
};
use nalgebra::Matrix4;
use num::complex::Complex64;
use num::Zero;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Tolerance of the coefficient checks.
pub const COEFFICIENT_TOLERANCE: f64 = 1e-6;
/// Tolerance of the matrix unitarity and symmetry checks.
pub const MATRIX_TOLERANCE: f64 = 1e-10;

/// Diagonal orientation of a mirror or beam splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// `/`: lower left to upper right
    #[serde(rename = "/")]
    Slash,
    /// `\`: upper left to lower right
    #[serde(rename = "\\")]
    Backslash,
}
impl Orientation {
    /// The tag character of this orientation.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Slash => '/',
            Self::Backslash => '\\',
        }
    }
    /// Port pairs coupled by the `r` and the `r'` reflection.
    #[must_use]
    pub const fn reflection_pairs(self) -> [(PortLabel, PortLabel); 2] {
        match self {
            Self::Backslash => [(PortLabel::A, PortLabel::B), (PortLabel::C, PortLabel::D)],
            Self::Slash => [(PortLabel::A, PortLabel::D), (PortLabel::B, PortLabel::C)],
        }
    }
}
impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
impl TryFrom<char> for Orientation {
    type Error = OpticsError;
    fn try_from(value: char) -> OpticsResult<Self> {
        match value {
            '/' => Ok(Self::Slash),
            '\\' => Ok(Self::Backslash),
            _ => Err(OpticsError::Component(format!(
                "invalid orientation tag '{value}'"
            ))),
        }
    }
}
impl FromStr for Orientation {
    type Err = OpticsError;
    fn from_str(s: &str) -> OpticsResult<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(OpticsError::Component(format!(
                "invalid orientation tag '{s}'"
            ))),
        }
    }
}

/// Transmission and reflection coefficients of a lossless four-port component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitterCoefficients {
    /// transmission
    pub t: Complex64,
    /// reflection on the `r` side
    pub r: Complex64,
    /// reflection on the `r'` side
    pub r_prime: Complex64,
}
impl SplitterCoefficients {
    /// Creates new coefficients. If `r_prime` is `None` it is derived from `t` and `r`.
    #[must_use]
    pub fn new(t: Complex64, r: Complex64, r_prime: Option<Complex64>) -> Self {
        Self {
            t,
            r,
            r_prime: r_prime.unwrap_or_else(|| Self::derive_r_prime(t, r)),
        }
    }
    /// Reciprocal reflection coefficient (Stokes relation `r* t + t* r' = 0`).
    ///
    /// For a pure reflector (`t = 0`) both sides reflect with the same coefficient.
    #[must_use]
    pub fn derive_r_prime(t: Complex64, r: Complex64) -> Complex64 {
        if t.norm() < f64::EPSILON {
            r
        } else {
            -t * r.conj() / t.conj()
        }
    }
    /// Ideal mirror: no transmission and a π phase shift on reflection.
    #[must_use]
    pub fn mirror() -> Self {
        Self::new(Complex64::zero(), Complex64::new(-1.0, 0.0), None)
    }
    /// 50/50 beam splitter with `t = 1/√2` and `r = i/√2`.
    #[must_use]
    pub fn fifty_fifty() -> Self {
        let a = std::f64::consts::FRAC_1_SQRT_2;
        Self::new(Complex64::new(a, 0.0), Complex64::new(0.0, a), None)
    }
    /// Tunable beam splitter with power reflectivity `reflectivity` and a 90° reflection phase.
    #[must_use]
    pub fn tunable(reflectivity: f64) -> Self {
        Self::new(
            Complex64::new((1.0 - reflectivity).sqrt(), 0.0),
            Complex64::new(0.0, reflectivity.sqrt()),
            None,
        )
    }
    /// Partial mirror with power reflectivity `reflectivity` and a π reflection phase.
    #[must_use]
    pub fn partial_mirror(reflectivity: f64) -> Self {
        Self::new(
            Complex64::new((1.0 - reflectivity).sqrt(), 0.0),
            Complex64::new(-reflectivity.sqrt(), 0.0),
            None,
        )
    }
    /// Check energy conservation and the reciprocal phase relation.
    ///
    /// Violations are reported as warnings but never rejected.
    pub fn check(&self, context: &str, diagnostics: &mut Diagnostics) {
        let energy = self.r.norm_sqr() + self.t.norm_sqr();
        if (energy - 1.0).abs() > COEFFICIENT_TOLERANCE {
            diagnostics.warning(
                context,
                format!("energy not conserved: |r|²+|t|² = {energy:.8}"),
            );
        }
        let energy_prime = self.r_prime.norm_sqr() + self.t.norm_sqr();
        if (energy_prime - 1.0).abs() > COEFFICIENT_TOLERANCE {
            diagnostics.warning(
                context,
                format!("energy not conserved: |r'|²+|t|² = {energy_prime:.8}"),
            );
        }
        let phase = self.r.conj() * self.t + self.t.conj() * self.r_prime;
        if phase.norm() > COEFFICIENT_TOLERANCE {
            diagnostics.warning(
                context,
                format!("reciprocal phase relation violated: r*t + t*r' = {phase:.8}"),
            );
        }
    }
}

/// 4×4 complex scattering matrix indexed `[output port, input port]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatteringMatrix(Matrix4<Complex64>);

impl ScatteringMatrix {
    /// Assemble the matrix of a component with the given coefficients and orientation.
    ///
    /// The coefficients as well as unitarity (`SᴴS = I`) and reciprocity (`S = Sᵀ`) of the
    /// result are checked. Failed checks are pushed as warnings to `diagnostics`.
    #[must_use]
    pub fn new(
        coefficients: &SplitterCoefficients,
        orientation: Orientation,
        context: &str,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        coefficients.check(context, diagnostics);
        let mut m = Matrix4::<Complex64>::zeros();
        let mut couple = |a: PortLabel, b: PortLabel, value: Complex64| {
            m[(a.index(), b.index())] = value;
            m[(b.index(), a.index())] = value;
        };
        couple(PortLabel::A, PortLabel::C, coefficients.t);
        couple(PortLabel::B, PortLabel::D, coefficients.t);
        let [(r1, r2), (rp1, rp2)] = orientation.reflection_pairs();
        couple(r1, r2, coefficients.r);
        couple(rp1, rp2, coefficients.r_prime);
        let matrix = Self(m);
        let unitarity = matrix.unitarity_error();
        if unitarity > MATRIX_TOLERANCE {
            diagnostics.warning(
                context,
                format!("scattering matrix not unitary (max error {unitarity:.3e})"),
            );
        }
        let symmetry = matrix.symmetry_error();
        if symmetry > MATRIX_TOLERANCE {
            diagnostics.warning(
                context,
                format!("scattering matrix not symmetric (max error {symmetry:.3e})"),
            );
        }
        matrix
    }
    /// Scale the amplitudes by `sqrt(1 - power_loss)`.
    #[must_use]
    pub fn with_power_loss(self, power_loss: f64) -> Self {
        if power_loss <= 0.0 {
            return self;
        }
        let factor = (1.0 - power_loss.min(1.0)).sqrt();
        Self(self.0 * Complex64::new(factor, 0.0))
    }
    /// Coupling from `input` to `output`.
    #[must_use]
    pub fn get(&self, output: PortLabel, input: PortLabel) -> Complex64 {
        self.0[(output.index(), input.index())]
    }
    /// Output amplitudes for the given input amplitudes `[A, B, C, D]`.
    #[must_use]
    pub fn apply(&self, input: &[Complex64; 4]) -> [Complex64; 4] {
        let mut out = [Complex64::zero(); 4];
        for (o, value) in out.iter_mut().enumerate() {
            *value = (0..4).map(|i| self.0[(o, i)] * input[i]).sum();
        }
        out
    }
    /// Maximum absolute element of `SᴴS - I`.
    #[must_use]
    pub fn unitarity_error(&self) -> f64 {
        let product = self.0.adjoint() * self.0 - Matrix4::<Complex64>::identity();
        product.iter().map(|c| c.norm()).fold(0.0, f64::max)
    }
    /// Maximum absolute element of `S - Sᵀ`.
    #[must_use]
    pub fn symmetry_error(&self) -> f64 {
        (self.0 - self.0.transpose())
            .iter()
            .map(|c| c.norm())
            .fold(0.0, f64::max)
    }
    /// Returns the underlying matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix4<Complex64> {
        &self.0
    }
}

/// Trait for components described by a [`ScatteringMatrix`].
pub trait Scatterer {
    /// Orientation of the component.
    fn orientation(&self) -> Orientation;
    /// Lossless coefficients of the component.
    fn coefficients(&self) -> SplitterCoefficients;
    /// Fraction of power lost on each pass for the given configuration.
    fn power_loss(&self, config: &SolverConfig) -> f64;
    /// Build the (possibly lossy) scattering matrix.
    fn scattering_matrix(
        &self,
        config: &SolverConfig,
        context: &str,
        diagnostics: &mut Diagnostics,
    ) -> ScatteringMatrix {
        ScatteringMatrix::new(&self.coefficients(), self.orientation(), context, diagnostics)
            .with_power_loss(self.power_loss(config))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::check_warnings;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    fn unit(label: PortLabel) -> [Complex64; 4] {
        let mut v = [Complex64::zero(); 4];
        v[label.index()] = Complex64::new(1.0, 0.0);
        v
    }
    #[test]
    fn orientation_parse() {
        assert_eq!(Orientation::from_str("/").unwrap(), Orientation::Slash);
        assert_eq!(Orientation::from_str("\\").unwrap(), Orientation::Backslash);
        assert_eq!(Orientation::try_from('/').unwrap(), Orientation::Slash);
        assert_matches!(Orientation::from_str("|"), Err(OpticsError::Component(_)));
        assert!(Orientation::from_str("//").is_err());
        assert!(Orientation::from_str("").is_err());
        assert_eq!(format!("{}", Orientation::Backslash), "\\");
    }
    #[test]
    fn orientation_serde() {
        let s = serde_json::to_string(&Orientation::Backslash).unwrap();
        assert_eq!(s, "\"\\\\\"");
        let o: Orientation = serde_json::from_str("\"/\"").unwrap();
        assert_eq!(o, Orientation::Slash);
    }
    #[test]
    fn fifty_fifty_coefficients() {
        let c = SplitterCoefficients::fifty_fifty();
        assert_abs_diff_eq!(c.t.re, FRAC_1_SQRT_2);
        assert_abs_diff_eq!(c.r.im, FRAC_1_SQRT_2);
        assert_abs_diff_eq!(c.r_prime.im, FRAC_1_SQRT_2);
        assert_abs_diff_eq!(c.r_prime.re, 0.0);
    }
    #[test]
    fn mirror_coefficients() {
        let c = SplitterCoefficients::mirror();
        assert_eq!(c.t, Complex64::zero());
        assert_eq!(c.r, Complex64::new(-1.0, 0.0));
        assert_eq!(c.r_prime, c.r);
        assert_abs_diff_eq!(c.r.arg().abs(), PI);
    }
    #[test]
    fn splitter_unitarity() {
        testing_logger::setup();
        let mut d = Diagnostics::new();
        for orientation in [Orientation::Slash, Orientation::Backslash] {
            let s = ScatteringMatrix::new(
                &SplitterCoefficients::fifty_fifty(),
                orientation,
                "bs",
                &mut d,
            );
            for input in PortLabel::ALL {
                let out = s.apply(&unit(input));
                let power: f64 = out.iter().map(|c| c.norm_sqr()).sum();
                assert_abs_diff_eq!(power, 1.0, epsilon = 0.001);
                let active: Vec<_> = out.iter().filter(|c| c.norm() > 1e-12).collect();
                assert_eq!(active.len(), 2);
                for a in active {
                    assert_abs_diff_eq!(a.norm(), FRAC_1_SQRT_2, epsilon = 1e-12);
                }
            }
        }
        assert!(d.records().is_empty());
        check_warnings(vec![]);
    }
    #[test]
    fn backslash_layout() {
        let mut d = Diagnostics::new();
        let s = ScatteringMatrix::new(
            &SplitterCoefficients::fifty_fifty(),
            Orientation::Backslash,
            "bs",
            &mut d,
        );
        let r = Complex64::new(0.0, FRAC_1_SQRT_2);
        let t = Complex64::new(FRAC_1_SQRT_2, 0.0);
        assert_eq!(s.get(PortLabel::B, PortLabel::A), r);
        assert_eq!(s.get(PortLabel::C, PortLabel::A), t);
        assert_eq!(s.get(PortLabel::D, PortLabel::A), Complex64::zero());
        assert_eq!(s.get(PortLabel::D, PortLabel::B), t);
        assert_abs_diff_eq!(s.get(PortLabel::C, PortLabel::D).im, FRAC_1_SQRT_2);
        assert_eq!(s.get(PortLabel::A, PortLabel::A), Complex64::zero());
    }
    #[test]
    fn slash_mirror_layout() {
        let mut d = Diagnostics::new();
        let s = ScatteringMatrix::new(
            &SplitterCoefficients::mirror(),
            Orientation::Slash,
            "m",
            &mut d,
        );
        let minus_one = Complex64::new(-1.0, 0.0);
        assert_eq!(s.get(PortLabel::D, PortLabel::A), minus_one);
        assert_eq!(s.get(PortLabel::A, PortLabel::D), minus_one);
        assert_eq!(s.get(PortLabel::C, PortLabel::B), minus_one);
        assert_eq!(s.get(PortLabel::C, PortLabel::A), Complex64::zero());
        assert_abs_diff_eq!(s.unitarity_error(), 0.0);
        assert_abs_diff_eq!(s.symmetry_error(), 0.0);
        assert!(d.records().is_empty());
    }
    #[test]
    fn tunable_and_partial() {
        let mut d = Diagnostics::new();
        for r in [0.0, 0.1, 0.3, 0.5, 0.9, 1.0] {
            for c in [
                SplitterCoefficients::tunable(r),
                SplitterCoefficients::partial_mirror(r),
            ] {
                let s = ScatteringMatrix::new(&c, Orientation::Backslash, "t", &mut d);
                assert!(s.unitarity_error() < MATRIX_TOLERANCE);
                assert_abs_diff_eq!(c.r.norm_sqr(), r, epsilon = 1e-12);
            }
        }
        assert!(d.records().is_empty());
        let c = SplitterCoefficients::partial_mirror(0.25);
        assert_abs_diff_eq!(c.r.re, -0.5);
        assert_abs_diff_eq!(c.r_prime.re, 0.5);
    }
    #[test]
    fn invalid_coefficients_warn() {
        testing_logger::setup();
        let mut d = Diagnostics::new();
        let c = SplitterCoefficients::new(
            Complex64::new(0.5, 0.0),
            Complex64::new(0.5, 0.0),
            Some(Complex64::new(0.5, 0.0)),
        );
        let s = ScatteringMatrix::new(&c, Orientation::Slash, "bad", &mut d);
        assert_eq!(d.records().len(), 4);
        assert!(s.unitarity_error() > 0.1);
        check_warnings(vec![
            "bad: energy not conserved: |r|²+|t|² = 0.50000000",
            "bad: energy not conserved: |r'|²+|t|² = 0.50000000",
            "bad: reciprocal phase relation violated: r*t + t*r' = 0.50000000+0.00000000i",
            "bad: scattering matrix not unitary (max error 5.000e-1)",
        ]);
    }
    #[test]
    fn power_loss() {
        let mut d = Diagnostics::new();
        let s = ScatteringMatrix::new(
            &SplitterCoefficients::mirror(),
            Orientation::Backslash,
            "m",
            &mut d,
        )
        .with_power_loss(0.05);
        let out = s.apply(&unit(PortLabel::A));
        assert_abs_diff_eq!(out[PortLabel::B.index()].norm_sqr(), 0.95, epsilon = 1e-12);
        assert_eq!(s.clone().with_power_loss(0.0), s);
    }
}
