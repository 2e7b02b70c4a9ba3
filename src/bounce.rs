#![warn(missing_docs)]
//! Generation-by-generation bounce tracer.
//!
//! Fallback for layouts in which the network builder finds no connection. Starting with the
//! laser beam, every generation casts the rays of the current beams, sums the arriving
//! amplitudes per component port and scatters them into the next generation of beams. The
//! walk stops when no beam above the amplitude cutoff is left, after a fixed number of
//! generations or when the wall clock budget is used up.
//!
//! For loop-free layouts the detector amplitudes agree with the linear system solution.
use crate::{
    component::Component,
    config::SolverConfig,
    diagnostics::Diagnostics,
    geometry::GridCell,
    network::Layout,
    optic_ports::{PortId, PortLabel},
    ray_trace::RayEnd,
    solver::propagation,
};
use log::debug;
use nalgebra::Point2;
use num::complex::Complex64;
use num::{One, Zero};
use std::{
    collections::{BTreeMap, BTreeSet},
    time::{Duration, Instant},
};

/// A traced beam segment.
#[derive(Debug, Clone, PartialEq)]
pub struct BounceSegment {
    /// polyline from the emitting component to the end of the ray
    pub path: Vec<Point2<f64>>,
    /// amplitude where the segment starts
    pub amplitude: Complex64,
    /// index of the emitting component in the layout
    pub source_node: usize,
    /// `false` if the ray was blocked or left the canvas
    pub connected: bool,
}

/// A beam absorbed by a detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorHit {
    /// index of the detector in the layout
    pub node: usize,
    /// index of the emitting component
    pub source_node: usize,
    /// amplitude arriving at the detector
    pub amplitude: Complex64,
}

/// Outcome of a bounce trace.
#[derive(Debug, Clone, Default)]
pub struct BounceOutcome {
    /// beams absorbed by detectors
    pub detector_hits: Vec<DetectorHit>,
    /// all traced segments
    pub segments: Vec<BounceSegment>,
    /// number of generations traced
    pub generations: usize,
    /// `true` if beams were still alive when the trace stopped
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy)]
struct LiveBeam {
    port: PortId,
    amplitude: Complex64,
}

/// Trace the beams of a snapshot generation by generation.
pub fn trace_bounces(
    layout: &Layout,
    blocked: &BTreeSet<GridCell>,
    config: &SolverConfig,
    diagnostics: &mut Diagnostics,
) -> BounceOutcome {
    let started = Instant::now();
    let budget = Duration::from_millis(config.time_budget_ms);
    let targets = layout.ray_targets();
    let mut outcome = BounceOutcome::default();
    let mut live = vec![LiveBeam {
        port: layout.laser_port(),
        amplitude: Complex64::one(),
    }];
    while !live.is_empty() {
        if outcome.generations >= config.max_bounce_generations {
            outcome.truncated = true;
            diagnostics.info(
                "bounce",
                format!(
                    "stopped after {} generations with {} live beams",
                    outcome.generations,
                    live.len()
                ),
            );
            break;
        }
        if started.elapsed() > budget {
            outcome.truncated = true;
            diagnostics.warning(
                "bounce",
                format!(
                    "time budget of {} ms exceeded after {} generations",
                    config.time_budget_ms, outcome.generations
                ),
            );
            break;
        }
        let mut inputs: BTreeMap<usize, [Complex64; 4]> = BTreeMap::new();
        for beam in &live {
            let Some(trace) = layout.trace(beam.port, &targets, blocked, config) else {
                continue;
            };
            let arrival = beam.amplitude * propagation(trace.length, config);
            let source_node = layout.node_of(beam.port);
            let connected = matches!(trace.end, RayEnd::Component { .. });
            outcome.segments.push(BounceSegment {
                path: trace.path,
                amplitude: beam.amplitude,
                source_node,
                connected,
            });
            if let RayEnd::Component { node, port } = trace.end {
                if layout.nodes()[node].is_detector() {
                    outcome.detector_hits.push(DetectorHit {
                        node,
                        source_node,
                        amplitude: arrival,
                    });
                } else if layout.matrix(node).is_some() {
                    inputs.entry(node).or_insert([Complex64::zero(); 4])[port.index()] += arrival;
                }
            }
        }
        outcome.generations += 1;
        live = scatter(layout, &inputs, config);
        debug!(
            "bounce generation {}: {} beams",
            outcome.generations,
            live.len()
        );
    }
    outcome
}

fn scatter(
    layout: &Layout,
    inputs: &BTreeMap<usize, [Complex64; 4]>,
    config: &SolverConfig,
) -> Vec<LiveBeam> {
    let mut next = Vec::new();
    for (node, node_inputs) in inputs {
        let Some(matrix) = layout.matrix(*node) else {
            continue;
        };
        let outputs = matrix.apply(node_inputs);
        for (label, amplitude) in PortLabel::ALL.iter().zip(outputs) {
            if amplitude.norm() <= config.bounce_amplitude_cutoff {
                continue;
            }
            if let Some(port) = layout.ports().find(*node, *label) {
                next.push(LiveBeam { port, amplitude });
            }
        }
    }
    next
}

/// Convenience wrapper building the layout of a snapshot and tracing it.
pub fn trace_snapshot(
    laser: &Component,
    components: &[Component],
    blocked: &BTreeSet<GridCell>,
    config: &SolverConfig,
    diagnostics: &mut Diagnostics,
) -> BounceOutcome {
    let layout = Layout::new(laser, components, config, diagnostics);
    trace_bounces(&layout, blocked, config, diagnostics)
}
