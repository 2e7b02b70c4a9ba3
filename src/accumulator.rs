#![warn(missing_docs)]
//! Coherent accumulation of the beams arriving at the detectors.
//!
//! The amplitudes are collected first and summed as complex numbers on
//! [`DetectorAccumulator::finalize`]. Only the modulus squared of the sum is the intensity,
//! which is what produces interference.
use num::complex::Complex64;
use num::Zero;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Metadata of a beam arriving at a detector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BeamOrigin {
    /// name of the emitting component
    pub source: String,
}

#[derive(Debug, Clone, Default)]
struct DetectorState {
    name: String,
    pending: Vec<(Complex64, BeamOrigin)>,
    finalized: bool,
    amplitude: Complex64,
    intensity: f64,
}

/// Final reading of a single detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorReading {
    /// id of the detector component
    pub detector: Uuid,
    /// name of the detector component
    pub name: String,
    /// `|Σ amplitude|²` in units of the laser intensity
    pub intensity: f64,
    /// coherent sum of the arriving amplitudes
    pub amplitude: Complex64,
    /// number of contributing beams
    pub beams: usize,
}

/// Per-solve accumulator of all detectors, keyed by the detector id.
#[derive(Debug, Clone, Default)]
pub struct DetectorAccumulator {
    detectors: BTreeMap<Uuid, DetectorState>,
    order: Vec<Uuid>,
}
impl DetectorAccumulator {
    /// Creates a new, empty [`DetectorAccumulator`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Register a detector. Registering an already known detector resets it.
    pub fn register(&mut self, id: Uuid, name: &str) {
        if !self.detectors.contains_key(&id) {
            self.order.push(id);
        }
        self.detectors.insert(
            id,
            DetectorState {
                name: name.to_owned(),
                ..Default::default()
            },
        );
    }
    /// Clear the pending beams and the finalized flag of all detectors.
    pub fn reset(&mut self) {
        for state in self.detectors.values_mut() {
            state.pending.clear();
            state.finalized = false;
            state.amplitude = Complex64::zero();
            state.intensity = 0.0;
        }
    }
    /// Append an arriving amplitude. The intensity is not touched until [`Self::finalize`].
    ///
    /// Returns `false` if the detector is unknown.
    pub fn add(&mut self, id: Uuid, amplitude: Complex64, origin: BeamOrigin) -> bool {
        self.detectors.get_mut(&id).is_some_and(|state| {
            state.pending.push((amplitude, origin));
            state.finalized = false;
            true
        })
    }
    /// Sum the pending amplitudes of a detector and set its intensity to `|Σ|²`.
    ///
    /// Calling this again without new beams is a no-op. Returns the intensity or `None` for an
    /// unknown detector.
    pub fn finalize(&mut self, id: Uuid) -> Option<f64> {
        let state = self.detectors.get_mut(&id)?;
        if !state.finalized {
            state.amplitude = state.pending.iter().map(|(a, _)| a).sum();
            state.intensity = state.amplitude.norm_sqr();
            state.finalized = true;
        }
        Some(state.intensity)
    }
    /// Finalize all detectors.
    pub fn finalize_all(&mut self) {
        for id in self.order.clone() {
            let _ = self.finalize(id);
        }
    }
    /// Intensity of a detector (zero until finalized).
    #[must_use]
    pub fn intensity(&self, id: Uuid) -> Option<f64> {
        self.detectors.get(&id).map(|s| s.intensity)
    }
    /// Returns `true` if the detector has been finalized since the last change.
    #[must_use]
    pub fn is_finalized(&self, id: Uuid) -> bool {
        self.detectors.get(&id).is_some_and(|s| s.finalized)
    }
    /// Origins of the beams collected for a detector.
    #[must_use]
    pub fn origins(&self, id: Uuid) -> Vec<&BeamOrigin> {
        self.detectors
            .get(&id)
            .map(|s| s.pending.iter().map(|(_, o)| o).collect())
            .unwrap_or_default()
    }
    /// Readings of all detectors in registration order.
    #[must_use]
    pub fn readings(&self) -> Vec<DetectorReading> {
        self.order
            .iter()
            .filter_map(|id| {
                self.detectors.get(id).map(|s| DetectorReading {
                    detector: *id,
                    name: s.name.clone(),
                    intensity: s.intensity,
                    amplitude: s.amplitude,
                    beams: s.pending.len(),
                })
            })
            .collect()
    }
}
