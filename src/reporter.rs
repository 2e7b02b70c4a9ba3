#![warn(missing_docs)]
//! Beam path records for visualization, gold field scoring and serializable solve reports.
use crate::{
    accumulator::DetectorReading,
    component::ComponentKind,
    config::SolverConfig,
    diagnostics::Diagnostic,
    energy::EnergyBalance,
    engine::{SolveMethod, SolveResult},
    geometry::GridCell,
    utils::{f64_to_usize, usize_to_f64},
};
use chrono::{DateTime, Local};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A beam segment to be drawn by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamPath {
    /// polyline from the emitting to the receiving component
    pub path: Vec<Point2<f64>>,
    /// modulus of the complex amplitude
    pub amplitude: f64,
    /// argument of the complex amplitude (radians)
    pub phase: f64,
    /// kind of the emitting component
    pub source_kind: ComponentKind,
}
impl BeamPath {
    /// Intensity carried by this beam.
    #[must_use]
    pub fn intensity(&self) -> f64 {
        self.amplitude * self.amplitude
    }
}

/// Intensity attributed to a single gold cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoldHit {
    /// grid coordinate of the gold cell
    pub cell: GridCell,
    /// attributed intensity
    pub intensity: f64,
}

/// Sample points along a polyline, at most `spacing` apart and including both ends of every
/// segment.
#[must_use]
pub fn sample_path(path: &[Point2<f64>], spacing: f64) -> Vec<Point2<f64>> {
    let mut samples = Vec::new();
    for segment in path.windows(2) {
        let (p0, p1) = (segment[0], segment[1]);
        let length = nalgebra::distance(&p0, &p1);
        let num_samples = f64_to_usize((length / spacing).ceil()).max(1) + 1;
        for i in 0..num_samples {
            let t = usize_to_f64(i) / usize_to_f64(num_samples - 1);
            samples.push(p0 + (p1 - p0) * t);
        }
    }
    samples
}

/// Gold cells lit by the given paths in a single solve.
///
/// A cell is lit if a sample point of a path lies within half a grid cell of its center. Every
/// cell is attributed the intensity of the first path lighting it.
#[must_use]
pub fn gold_hits(
    paths: &[BeamPath],
    gold: &BTreeSet<GridCell>,
    config: &SolverConfig,
) -> BTreeMap<GridCell, f64> {
    let mut hits = BTreeMap::new();
    if gold.is_empty() {
        return hits;
    }
    let radius = config.grid.cell_size / 2.0;
    for path in paths {
        for sample in sample_path(&path.path, config.gold_sample_spacing) {
            for cell in gold {
                if hits.contains_key(cell) {
                    continue;
                }
                if nalgebra::distance(&sample, &cell.center(&config.grid)) <= radius {
                    hits.insert(*cell, path.intensity());
                }
            }
        }
    }
    hits
}

/// Session-wide record of collected gold cells.
///
/// A gold cell contributes to the score only the first time it is lit within a session, no
/// matter how many solves it stays lit.
#[derive(Debug, Clone, Default)]
pub struct GoldFieldLedger {
    totals: BTreeMap<GridCell, f64>,
}
impl GoldFieldLedger {
    /// Creates a new, empty [`GoldFieldLedger`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Add the hits of a solve. Returns the cells collected for the first time.
    pub fn collect(&mut self, hits: &BTreeMap<GridCell, f64>) -> BTreeMap<GridCell, f64> {
        let mut fresh = BTreeMap::new();
        for (cell, intensity) in hits {
            if !self.totals.contains_key(cell) {
                self.totals.insert(*cell, *intensity);
                fresh.insert(*cell, *intensity);
            }
        }
        fresh
    }
    /// Returns `true` if the cell has already been collected in this session.
    #[must_use]
    pub fn is_collected(&self, cell: &GridCell) -> bool {
        self.totals.contains_key(cell)
    }
    /// Accumulated intensity per collected cell.
    #[must_use]
    pub const fn totals(&self) -> &BTreeMap<GridCell, f64> {
        &self.totals
    }
    /// Sum over all collected cells.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.totals.values().sum()
    }
    /// Start a new session.
    pub fn reset_session(&mut self) {
        self.totals.clear();
    }
}

fn to_hits(map: &BTreeMap<GridCell, f64>) -> Vec<GoldHit> {
    map.iter()
        .map(|(cell, intensity)| GoldHit {
            cell: *cell,
            intensity: *intensity,
        })
        .collect()
}

#[derive(Serialize, Debug)]
/// Structure for storing the data of a solve being integrated in a report.
pub struct SolveReport {
    interfero_version: String,
    solve_timestamp: DateTime<Local>,
    method: SolveMethod,
    detectors: Vec<DetectorReading>,
    energy: Option<EnergyBalance>,
    beam_count: usize,
    gold_hits: Vec<GoldHit>,
    gold_totals: Vec<GoldHit>,
    gold_score: f64,
    diagnostics: Vec<Diagnostic>,
}
impl SolveReport {
    /// Creates a new [`SolveReport`] of the given result.
    #[must_use]
    pub fn new(result: &SolveResult, ledger: &GoldFieldLedger) -> Self {
        Self {
            interfero_version: crate::get_version(),
            solve_timestamp: Local::now(),
            method: result.method,
            detectors: result.readings.clone(),
            energy: result.energy.clone(),
            beam_count: result.paths.len(),
            gold_hits: to_hits(&result.gold_hits),
            gold_totals: to_hits(ledger.totals()),
            gold_score: ledger.score(),
            diagnostics: result.diagnostics.clone(),
        }
    }
    /// Returns the detector readings of this [`SolveReport`].
    #[must_use]
    pub fn detectors(&self) -> &[DetectorReading] {
        &self.detectors
    }
    /// Returns the session score of this [`SolveReport`].
    #[must_use]
    pub const fn gold_score(&self) -> f64 {
        self.gold_score
    }
}
