//! This is the documentation for the **interfero** package, a steady-state wave-optics solver
//! for laser interferometers built on a placement grid.
//!
//! A [`Scene`](scene::Scene) snapshot (laser, mirrors, beam splitters, detectors, blocked and
//! gold cells) is turned into a network of optical connections. The complex amplitudes of all
//! beams follow from a single linear system, so interference and feedback loops are handled
//! exactly. [`WaveOpticsEngine`](engine::WaveOpticsEngine) is the main entry point.
#![allow(clippy::module_name_repetitions)]

pub mod accumulator;
pub mod bounce;
pub mod component;
pub mod config;
pub mod console;
pub mod diagnostics;
pub mod dottable;
pub mod energy;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod network;
pub mod nodes;
pub mod optic_ports;
pub mod presets;
pub mod ray_trace;
pub mod reporter;
pub mod scattering;
pub mod scene;
pub mod solver;
pub mod utils;

/// Return the version of this crate.
#[must_use]
pub fn get_version() -> String {
    format!("{} ({})", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_NAME"))
}
