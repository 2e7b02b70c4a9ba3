#![warn(missing_docs)]
//! Energy balance of a solved network.
//!
//! The laser power (normalized to 1) ends up in one of four places: a detector, an open port
//! (the beam leaves the canvas or is blocked), back at the laser, or in component losses.
use crate::{network::OpticalNetwork, optic_ports::PortLabel, solver::node_inputs};
use approx::abs_diff_eq;
use num::complex::Complex64;
use serde::{Deserialize, Serialize};

/// Where the laser power went.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyBalance {
    /// power absorbed by detectors
    pub detected: f64,
    /// power leaving through ports without a connection
    pub escaped: f64,
    /// power travelling back into the laser
    pub returned_to_source: f64,
    /// power dissipated in lossy components
    pub lost: f64,
}
impl EnergyBalance {
    /// Sum of all terms. Equals `1` (the laser power) for a consistent solution.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.detected + self.escaped + self.returned_to_source + self.lost
    }
    /// Returns `true` if [`Self::total`] deviates from `1` by at most `tolerance`.
    #[must_use]
    pub fn is_conserved(&self, tolerance: f64) -> bool {
        abs_diff_eq!(self.total(), 1.0, epsilon = tolerance)
    }
}

/// Compute the balance from the arriving beam amplitudes of a solved network.
#[must_use]
pub fn energy_balance(network: &OpticalNetwork, arrivals: &[Complex64]) -> EnergyBalance {
    let mut balance = EnergyBalance::default();
    if !network.is_connected(network.laser_port()) {
        balance.escaped += 1.0;
    }
    for (idx, node) in network.nodes().iter().enumerate() {
        let inputs = node_inputs(network, arrivals, idx);
        if idx == 0 {
            balance.returned_to_source += inputs.iter().map(Complex64::norm_sqr).sum::<f64>();
        } else if node.is_detector() {
            balance.detected += inputs.iter().sum::<Complex64>().norm_sqr();
        } else if let Some(matrix) = network.matrix(idx) {
            let outputs = matrix.apply(&inputs);
            let power_in: f64 = inputs.iter().map(Complex64::norm_sqr).sum();
            let power_out: f64 = outputs.iter().map(Complex64::norm_sqr).sum();
            balance.lost += power_in - power_out;
            for (label, output) in PortLabel::ALL.iter().zip(outputs) {
                let open = network
                    .ports()
                    .find(idx, *label)
                    .map_or(true, |port| !network.is_connected(port));
                if open {
                    balance.escaped += output.norm_sqr();
                }
            }
        }
    }
    balance
}
