#![warn(missing_docs)]
//! Steady-state amplitudes of a network
//!
//! Every [`Beam`](crate::network::Beam) `i` gets an unknown complex amplitude `x_i`, measured
//! where it leaves its source port. A beam arriving at a scattering component feeds all beams
//! leaving that component:
//!
//! `x_j = b_j + Σ_i S[p_out(j), p_in(i)] · exp(i·k·L_i) · x_i`
//!
//! with `b_j = 1` for beams emitted by the laser. In matrix form this is `(I - A) x = b`, which
//! is solved by LU decomposition including feedback loops.
use crate::{config::SolverConfig, diagnostics::Diagnostics, network::OpticalNetwork};
use nalgebra::{DMatrix, DVector};
use num::complex::Complex64;
use num::{One, Zero};

/// Propagation factor `exp(i·k·L)` of a path of length `length`.
#[must_use]
pub fn propagation(length: f64, config: &SolverConfig) -> Complex64 {
    Complex64::from_polar(1.0, config.wave_number() * length)
}

/// Assemble the coupling matrix `A` and the source vector `b` of a network.
#[must_use]
pub fn assemble(
    network: &OpticalNetwork,
    config: &SolverConfig,
) -> (DMatrix<Complex64>, DVector<Complex64>) {
    let n = network.beams().len();
    let mut a = DMatrix::<Complex64>::zeros(n, n);
    let mut b = DVector::<Complex64>::zeros(n);
    for i in network.laser_beams() {
        b[i] = Complex64::one();
    }
    for c in network.couplings() {
        a[(c.to, c.from)] += c.value * propagation(network.beams()[c.from].length, config);
    }
    (a, b)
}

/// Solve `(I - A + ε·I) x = b`.
///
/// Returns `None` if the system is singular to working precision or the result is not finite.
#[must_use]
pub fn solve_linear(
    a: &DMatrix<Complex64>,
    b: &DVector<Complex64>,
    regularization: f64,
) -> Option<DVector<Complex64>> {
    let n = a.nrows();
    if n == 0 {
        return Some(DVector::zeros(0));
    }
    let diagonal = Complex64::new(1.0 + regularization, 0.0);
    let m = DMatrix::<Complex64>::from_diagonal_element(n, n, diagonal) - a;
    let x = m.lu().solve(b)?;
    x.iter()
        .all(|c| c.re.is_finite() && c.im.is_finite())
        .then_some(x)
}

/// Steady-state amplitudes of all beams of the network (as they leave their source).
///
/// If the linear system cannot be solved, only the laser beams keep their unit amplitude and a
/// warning is recorded.
#[must_use]
pub fn solve_network(
    network: &OpticalNetwork,
    config: &SolverConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<Complex64> {
    let (a, b) = assemble(network, config);
    if let Some(x) = solve_linear(&a, &b, config.regularization) {
        x.iter().copied().collect()
    } else {
        diagnostics.warning(
            "solver",
            format!(
                "linear system of {} beams is singular, using direct laser amplitudes only",
                b.len()
            ),
        );
        b.iter().copied().collect()
    }
}

/// Amplitudes of the beams where they arrive at their target port.
#[must_use]
pub fn arrivals(
    network: &OpticalNetwork,
    amplitudes: &[Complex64],
    config: &SolverConfig,
) -> Vec<Complex64> {
    network
        .beams()
        .iter()
        .zip(amplitudes)
        .map(|(beam, x)| x * propagation(beam.length, config))
        .collect()
}

/// Sum of the arriving amplitudes per input port of a node (`[A, B, C, D]`).
#[must_use]
pub fn node_inputs(
    network: &OpticalNetwork,
    arrivals: &[Complex64],
    node: usize,
) -> [Complex64; 4] {
    let mut inputs = [Complex64::zero(); 4];
    for (beam, amplitude) in network.beams().iter().zip(arrivals) {
        if beam.target_node == node {
            if let Some(label) = network.label(beam.target) {
                inputs[label.index()] += amplitude;
            }
        }
    }
    inputs
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        component::{Component, Element},
        geometry::GridCell,
        nodes::{BeamSplitter, Detector, Laser, Mirror},
        scattering::Orientation,
        utils::test_helper::test_helper::check_warnings,
    };
    use approx::assert_abs_diff_eq;
    use std::collections::BTreeSet;
    use std::f64::consts::PI;

    fn place(name: &str, element: impl Into<Element>, cell: (i32, i32)) -> Component {
        Component::at_cell(
            name,
            element,
            GridCell::from(cell),
            &SolverConfig::default().grid,
        )
    }
    #[test]
    fn propagation_phase() {
        let config = SolverConfig {
            wavelength: 10.0,
            ..Default::default()
        };
        assert_abs_diff_eq!(propagation(5.0, &config).re, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(propagation(20.0, &config).re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(propagation(2.5, &config).arg(), PI / 2.0, epsilon = 1e-12);
    }
    #[test]
    fn singular_system() {
        let a = DMatrix::<Complex64>::identity(2, 2);
        let b = DVector::from_vec(vec![Complex64::one(), Complex64::zero()]);
        assert!(solve_linear(&a, &b, 0.0).is_none());
        let x = solve_linear(&DMatrix::zeros(2, 2), &b, 0.0).unwrap();
        assert_eq!(x, b);
    }
    #[test]
    fn empty_system() {
        let x = solve_linear(&DMatrix::zeros(0, 0), &DVector::zeros(0), 1e-10).unwrap();
        assert!(x.is_empty());
        let config = SolverConfig::default();
        let laser = place("laser", Laser::default(), (2, 5));
        let mut d = Diagnostics::new();
        let net = OpticalNetwork::build(&laser, &[], &BTreeSet::new(), &config, &mut d);
        assert!(solve_network(&net, &config, &mut d).is_empty());
        assert!(d.records().is_empty());
    }
    #[test]
    fn regularized_resonance() {
        // a lossless loop at exact resonance is singular without the diagonal term
        let a = DMatrix::from_vec(
            2,
            2,
            vec![
                Complex64::zero(),
                Complex64::one(),
                Complex64::one(),
                Complex64::zero(),
            ],
        );
        let b = DVector::from_vec(vec![Complex64::one(), Complex64::one()]);
        assert!(solve_linear(&a, &b, 0.0).is_none());
        let x = solve_linear(&a, &b, 1e-10).unwrap();
        assert!(x[0].norm() > 1e9);
    }
    #[test]
    fn straight_through() {
        let config = SolverConfig::default();
        let laser = place("laser", Laser::default(), (2, 5));
        let components = vec![place("det", Detector::new(), (6, 5))];
        let mut d = Diagnostics::new();
        let net = OpticalNetwork::build(&laser, &components, &BTreeSet::new(), &config, &mut d);
        let x = solve_network(&net, &config, &mut d);
        assert_eq!(x.len(), 1);
        assert_abs_diff_eq!(x[0].re, 1.0, epsilon = 1e-9);
        let arr = arrivals(&net, &x, &config);
        assert_abs_diff_eq!(arr[0].norm(), 1.0, epsilon = 1e-9);
        let inputs = node_inputs(&net, &arr, 1);
        assert_abs_diff_eq!(inputs[0].norm(), 1.0, epsilon = 1e-9);
        assert!(d.records().is_empty());
    }
    #[test]
    fn splitter_assembly() {
        let config = SolverConfig::default();
        let laser = place("laser", Laser::default(), (2, 5));
        let components = vec![
            place("bs", BeamSplitter::new(Orientation::Backslash), (5, 5)),
            place("det", Detector::new(), (9, 5)),
        ];
        let mut d = Diagnostics::new();
        let net = OpticalNetwork::build(&laser, &components, &BTreeSet::new(), &config, &mut d);
        let (a, b) = assemble(&net, &config);
        assert_eq!(a.nrows(), net.beams().len());
        assert_eq!(b.iter().filter(|c| c.norm() > 0.0).count(), 1);
        let x = solve_network(&net, &config, &mut d);
        let to_det = net
            .beams()
            .iter()
            .position(|beam| net.nodes()[beam.target_node].is_detector())
            .unwrap();
        assert_abs_diff_eq!(x[to_det].norm_sqr(), 0.5, epsilon = 1e-9);
    }
    fn detector_input(
        laser: &Component,
        components: &[Component],
        config: &SolverConfig,
    ) -> Complex64 {
        let mut d = Diagnostics::new();
        let net = OpticalNetwork::build(laser, components, &BTreeSet::new(), config, &mut d);
        let x = solve_network(&net, config, &mut d);
        let arr = arrivals(&net, &x, config);
        let det = net.nodes().iter().position(|n| n.is_detector()).unwrap();
        node_inputs(&net, &arr, det).iter().sum()
    }
    #[test]
    fn single_mirror_adds_pi() {
        // laser -> m -> det, all lengths are multiples of the wavelength
        let config = SolverConfig {
            wavelength: 10.0,
            ..Default::default()
        };
        let laser = place("laser", Laser::default(), (2, 5));
        let components = vec![
            place("m", Mirror::new(Orientation::Backslash), (5, 5)),
            place("det", Detector::new(), (5, 8)),
        ];
        let input = detector_input(&laser, &components, &config);
        assert_abs_diff_eq!(input.re, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(input.im, 0.0, epsilon = 1e-9);
    }
    #[test]
    fn three_mirrors_add_three_pi() {
        let config = SolverConfig {
            wavelength: 10.0,
            ..Default::default()
        };
        let laser = place("laser", Laser::default(), (2, 5));
        let components = vec![
            place("m1", Mirror::new(Orientation::Backslash), (5, 5)),
            place("m2", Mirror::new(Orientation::Backslash), (5, 8)),
            place("m3", Mirror::new(Orientation::Slash), (8, 8)),
            place("det", Detector::new(), (8, 2)),
        ];
        let input = detector_input(&laser, &components, &config);
        assert_abs_diff_eq!(input.re, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(input.im, 0.0, epsilon = 1e-9);
    }
    #[test]
    fn mirror_phase_in_series() {
        // laser -> m1 -> m2 -> det, all lengths are multiples of the wavelength
        let config = SolverConfig {
            wavelength: 10.0,
            ..Default::default()
        };
        let laser = place("laser", Laser::default(), (2, 5));
        let components = vec![
            place("m1", Mirror::new(Orientation::Backslash), (5, 5)),
            place("m2", Mirror::new(Orientation::Backslash), (5, 8)),
            place("det", Detector::new(), (8, 8)),
        ];
        let mut d = Diagnostics::new();
        let net = OpticalNetwork::build(&laser, &components, &BTreeSet::new(), &config, &mut d);
        let x = solve_network(&net, &config, &mut d);
        let arr = arrivals(&net, &x, &config);
        let det = net.nodes().iter().position(|n| n.is_detector()).unwrap();
        let input: Complex64 = node_inputs(&net, &arr, det).iter().sum();
        assert_abs_diff_eq!(input.norm(), 1.0, epsilon = 1e-9);
        // two reflections: 2π
        assert_abs_diff_eq!(input.re, 1.0, epsilon = 1e-9);
        assert!(d.records().is_empty());
    }
    #[test]
    fn warning_on_failure() {
        testing_logger::setup();
        let config = SolverConfig::default();
        let laser = place("laser", Laser::default(), (2, 5));
        let components = vec![place("det", Detector::new(), (6, 5))];
        let mut d = Diagnostics::new();
        let net = OpticalNetwork::build(&laser, &components, &BTreeSet::new(), &config, &mut d);
        let config = SolverConfig {
            regularization: f64::NAN,
            ..config
        };
        let x = solve_network(&net, &config, &mut d);
        assert_eq!(x, vec![Complex64::one()]);
        check_warnings(vec![
            "solver: linear system of 1 beams is singular, using direct laser amplitudes only",
        ]);
    }
}
