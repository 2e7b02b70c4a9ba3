#![warn(missing_docs)]
//! Solve orchestration
//!
//! [`WaveOpticsEngine::solve`] runs the complete pipeline for one scene snapshot: network
//! construction, the linear solve (or the bounce fallback), detector accumulation, path records,
//! gold field accounting and the energy balance. It never fails. Invalid input and numerical
//! trouble end up as [`Diagnostic`]s on the returned [`SolveResult`].
use crate::{
    accumulator::{BeamOrigin, DetectorAccumulator, DetectorReading},
    bounce::trace_bounces,
    component::Component,
    config::{SolverConfig, Strategy},
    diagnostics::{Diagnostic, Diagnostics},
    energy::{energy_balance, EnergyBalance},
    error::OpticsResult,
    geometry::GridCell,
    network::{Layout, OpticalNetwork},
    reporter::{gold_hits, BeamPath, GoldFieldLedger},
    scene::{Scene, SceneDescription},
    solver::{arrivals, solve_network},
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Method that produced a [`SolveResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveMethod {
    /// linear system over the connection network
    Network,
    /// generation-by-generation bounce tracing
    Bounce,
    /// nothing was solved (no or disabled laser, invalid scene)
    Empty,
}

/// Everything a solve produces.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// method used
    pub method: SolveMethod,
    /// one reading per detector of the scene, in scene order
    pub readings: Vec<DetectorReading>,
    /// beam segments for drawing
    pub paths: Vec<BeamPath>,
    /// gold cells lit in this solve and their intensity
    pub gold_hits: BTreeMap<GridCell, f64>,
    /// energy balance (network method only)
    pub energy: Option<EnergyBalance>,
    /// diagnostics collected during the solve
    pub diagnostics: Vec<Diagnostic>,
}
impl SolveResult {
    /// Intensity of the detector with the given name.
    #[must_use]
    pub fn intensity(&self, detector: &str) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.name == detector)
            .map(|r| r.intensity)
    }
    /// Sum of all detector intensities.
    #[must_use]
    pub fn total_intensity(&self) -> f64 {
        self.readings.iter().map(|r| r.intensity).sum()
    }
}

/// Stateful solver of a single game session.
///
/// Apart from the gold field ledger nothing is kept between two solves.
#[derive(Debug, Clone, Default)]
pub struct WaveOpticsEngine {
    config: SolverConfig,
    ledger: GoldFieldLedger,
}
impl WaveOpticsEngine {
    /// Creates a new [`WaveOpticsEngine`] with the given configuration.
    ///
    /// # Errors
    ///
    /// This function will return an error if the configuration is invalid.
    pub fn new(config: SolverConfig) -> OpticsResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ledger: GoldFieldLedger::new(),
        })
    }
    /// Returns the configuration of this [`WaveOpticsEngine`].
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }
    /// Returns the gold field ledger of the current session.
    #[must_use]
    pub const fn ledger(&self) -> &GoldFieldLedger {
        &self.ledger
    }
    /// Start a new session. Already collected gold cells count again.
    pub fn reset_session(&mut self) {
        self.ledger.reset_session();
    }
    /// Solve a scene snapshot.
    pub fn solve(&mut self, scene: &Scene) -> SolveResult {
        let mut diagnostics = Diagnostics::new();
        let mut accumulator = DetectorAccumulator::new();
        for detector in scene.detectors() {
            accumulator.register(detector.id(), detector.name());
        }
        let Some(laser) = active_laser(scene, &mut diagnostics) else {
            accumulator.finalize_all();
            return empty_result(accumulator.readings(), diagnostics);
        };
        let network = OpticalNetwork::build(
            laser,
            &scene.components,
            &scene.blocked,
            &self.config,
            &mut diagnostics,
        );
        let (method, paths, energy) = if self.config.strategy == Strategy::Bounce {
            let paths = self.bounce(network.layout(), scene, &mut accumulator, &mut diagnostics);
            (SolveMethod::Bounce, paths, None)
        } else if network.is_empty() {
            diagnostics.info(
                "network",
                "no connection found, falling back to bounce tracing".into(),
            );
            let paths = self.bounce(network.layout(), scene, &mut accumulator, &mut diagnostics);
            (SolveMethod::Bounce, paths, None)
        } else {
            let (paths, energy) = self.linear(&network, &mut accumulator, &mut diagnostics);
            network.diagnose(&mut diagnostics);
            (SolveMethod::Network, paths, Some(energy))
        };
        accumulator.finalize_all();
        let hits = gold_hits(&paths, &scene.gold, &self.config);
        let fresh = self.ledger.collect(&hits);
        debug!(
            "solved {} beams with {method:?}, {} new gold cells",
            paths.len(),
            fresh.len()
        );
        SolveResult {
            method,
            readings: accumulator.readings(),
            paths,
            gold_hits: hits,
            energy,
            diagnostics: diagnostics.into_records(),
        }
    }
    /// Solve a scene snapshot and write the detector intensities into the scene.
    pub fn solve_interferometer(&mut self, scene: &mut Scene) -> SolveResult {
        let result = self.solve(scene);
        scene.apply_readings(&result.readings);
        result
    }
    /// Build the scene of a description and solve it.
    ///
    /// An invalid description yields an empty result with an error diagnostic.
    pub fn solve_description(&mut self, description: &SceneDescription) -> SolveResult {
        match description.to_scene(&self.config.grid) {
            Ok(scene) => self.solve(&scene),
            Err(e) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.error("scene", e.to_string());
                empty_result(Vec::new(), diagnostics)
            }
        }
    }
    fn linear(
        &self,
        network: &OpticalNetwork,
        accumulator: &mut DetectorAccumulator,
        diagnostics: &mut Diagnostics,
    ) -> (Vec<BeamPath>, EnergyBalance) {
        let amplitudes = solve_network(network, &self.config, diagnostics);
        let arriving = arrivals(network, &amplitudes, &self.config);
        let nodes = network.nodes();
        let mut paths = Vec::new();
        for ((beam, x), arrival) in network.beams().iter().zip(&amplitudes).zip(&arriving) {
            let target = nodes[beam.target_node];
            if target.is_detector() && arrival.norm() > self.config.path_amplitude_threshold {
                accumulator.add(
                    target.id(),
                    *arrival,
                    BeamOrigin {
                        source: nodes[beam.source_node].name().to_owned(),
                    },
                );
            }
            if x.norm() > self.config.path_amplitude_threshold {
                paths.push(BeamPath {
                    path: beam.path.clone(),
                    amplitude: x.norm(),
                    phase: x.arg(),
                    source_kind: nodes[beam.source_node].kind(),
                });
            }
        }
        (paths, energy_balance(network, &arriving))
    }
    fn bounce(
        &self,
        layout: &Layout,
        scene: &Scene,
        accumulator: &mut DetectorAccumulator,
        diagnostics: &mut Diagnostics,
    ) -> Vec<BeamPath> {
        let outcome = trace_bounces(layout, &scene.blocked, &self.config, diagnostics);
        let nodes = layout.nodes();
        let threshold = self.config.path_amplitude_threshold;
        for hit in outcome
            .detector_hits
            .iter()
            .filter(|h| h.amplitude.norm() > threshold)
        {
            accumulator.add(
                nodes[hit.node].id(),
                hit.amplitude,
                BeamOrigin {
                    source: nodes[hit.source_node].name().to_owned(),
                },
            );
        }
        outcome
            .segments
            .into_iter()
            .filter(|s| s.amplitude.norm() > threshold)
            .map(|s| BeamPath {
                amplitude: s.amplitude.norm(),
                phase: s.amplitude.arg(),
                source_kind: nodes[s.source_node].kind(),
                path: s.path,
            })
            .collect()
    }
}

fn active_laser<'a>(scene: &'a Scene, diagnostics: &mut Diagnostics) -> Option<&'a Component> {
    let Some(component) = scene.laser.as_ref() else {
        diagnostics.error("laser", "scene has no laser".into());
        return None;
    };
    match component.laser() {
        Some(laser) if laser.enabled => Some(component),
        Some(_) => {
            diagnostics.info(component.name(), "laser is switched off".into());
            None
        }
        None => {
            diagnostics.error(
                component.name(),
                format!("a {} cannot be used as laser", component.kind()),
            );
            None
        }
    }
}

fn empty_result(readings: Vec<DetectorReading>, diagnostics: Diagnostics) -> SolveResult {
    SolveResult {
        method: SolveMethod::Empty,
        readings,
        paths: Vec::new(),
        gold_hits: BTreeMap::new(),
        energy: None,
        diagnostics: diagnostics.into_records(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        component::ComponentKind,
        diagnostics::Severity,
        geometry::Direction,
        nodes::{BeamSplitter, Detector, Laser, Mirror},
        presets,
        scattering::Orientation,
        scene::ComponentDescription,
    };
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    fn engine() -> WaveOpticsEngine {
        WaveOpticsEngine::new(SolverConfig::default()).unwrap()
    }
    fn grid() -> crate::config::GridGeometry {
        SolverConfig::default().grid
    }
    #[test]
    fn invalid_config() {
        let config = SolverConfig {
            wavelength: -1.0,
            ..Default::default()
        };
        assert!(WaveOpticsEngine::new(config).is_err());
    }
    #[test]
    fn straight_through() {
        let result = engine().solve(&presets::straight(&grid()));
        assert_eq!(result.method, SolveMethod::Network);
        assert_abs_diff_eq!(result.intensity("det").unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].source_kind, ComponentKind::Laser);
        assert!(result.diagnostics.is_empty());
    }
    #[test]
    fn single_splitter() {
        let mut engine = engine();
        let result = engine.solve(&presets::single_splitter(&grid()));
        assert_abs_diff_eq!(result.intensity("det").unwrap(), 0.5, epsilon = 1e-9);
        let energy = result.energy.unwrap();
        assert_abs_diff_eq!(energy.escaped, 0.5, epsilon = 1e-9);
        assert!(energy.is_conserved(1e-9));
        assert_abs_diff_eq!(result.gold_hits[&GridCell(7, 5)], 0.5, epsilon = 1e-9);
    }
    #[test]
    fn mach_zehnder() {
        let result = engine().solve(&presets::mach_zehnder(&grid()));
        assert_abs_diff_eq!(result.intensity("det_bright").unwrap(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.intensity("det_dark").unwrap(), 0.0, epsilon = 1e-6);
        let energy = result.energy.unwrap();
        assert_abs_diff_eq!(energy.detected, 1.0, epsilon = 1e-6);
        assert_eq!(result.readings[0].name, "det_bright");
        assert_eq!(result.readings[0].beams, 1);
    }
    #[test]
    fn detuned_mach_zehnder_sums_to_one() {
        for wavelength in [13.0, 27.5, 30.0, 44.0, 61.0] {
            let config = SolverConfig {
                wavelength,
                ..Default::default()
            };
            let mut engine = WaveOpticsEngine::new(config).unwrap();
            let result = engine.solve(&presets::detuned_mach_zehnder(&grid()));
            assert_eq!(result.readings.len(), 2);
            assert_abs_diff_eq!(result.total_intensity(), 1.0, epsilon = 0.01);
        }
    }
    #[test]
    fn ring_resonator() {
        let result = engine().solve(&presets::ring(&grid()));
        assert_eq!(result.method, SolveMethod::Network);
        assert_abs_diff_eq!(result.intensity("det").unwrap(), 1.0, epsilon = 1e-6);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.message == "feedback loop detected"));
    }
    #[test]
    fn idempotent() {
        let mut engine = engine();
        let scene = presets::detuned_mach_zehnder(&grid());
        let first = engine.solve(&scene);
        let second = engine.solve(&scene);
        assert_eq!(first.readings, second.readings);
        assert_eq!(first.paths, second.paths);
    }
    #[test]
    fn gold_counted_once_per_session() {
        let mut engine = engine();
        let scene = presets::single_splitter(&grid());
        for _ in 0..100 {
            let result = engine.solve(&scene);
            assert_eq!(result.gold_hits.len(), 1);
        }
        assert_abs_diff_eq!(engine.ledger().score(), 0.5, epsilon = 1e-9);
        engine.reset_session();
        assert_abs_diff_eq!(engine.ledger().score(), 0.0);
        engine.solve(&scene);
        assert_abs_diff_eq!(engine.ledger().score(), 0.5, epsilon = 1e-9);
    }
    #[test]
    fn disabled_laser() {
        let mut scene = presets::straight(&grid());
        if let Some(l) = scene.laser.as_mut().and_then(Component::laser_mut) {
            l.enabled = false;
        }
        let result = engine().solve_interferometer(&mut scene);
        assert_eq!(result.method, SolveMethod::Empty);
        assert!(result.paths.is_empty());
        assert_eq!(result.readings.len(), 1);
        assert_eq!(result.readings[0].intensity, 0.0);
        assert_eq!(result.diagnostics[0].severity, Severity::Info);
    }
    #[test]
    fn missing_laser() {
        let mut scene = presets::straight(&grid());
        scene.laser = None;
        let result = engine().solve(&scene);
        assert_eq!(result.method, SolveMethod::Empty);
        assert_eq!(result.readings[0].intensity, 0.0);
        assert_eq!(result.diagnostics[0].severity, Severity::Error);
        let mut scene = presets::straight(&grid());
        scene.laser = Some(Component::at_cell(
            "fake",
            Mirror::new(Orientation::Slash),
            GridCell(2, 5),
            &grid(),
        ));
        let result = engine().solve(&scene);
        assert_eq!(result.method, SolveMethod::Empty);
        assert_eq!(result.diagnostics[0].context, "fake");
    }
    #[test]
    fn detector_intensity_written_back() {
        let mut scene = presets::single_splitter(&grid());
        engine().solve_interferometer(&mut scene);
        let det = scene.detectors().next().unwrap();
        assert_abs_diff_eq!(det.detector().unwrap().intensity, 0.5, epsilon = 1e-9);
        // switching the laser off resets the detector
        if let Some(l) = scene.laser.as_mut().and_then(Component::laser_mut) {
            l.enabled = false;
        }
        engine().solve_interferometer(&mut scene);
        let det = scene.detectors().next().unwrap();
        assert_eq!(det.detector().unwrap().intensity, 0.0);
    }
    #[test]
    fn invalid_description() {
        let description = SceneDescription {
            laser: Some(ComponentDescription {
                cell: GridCell(1, 1),
                ..Default::default()
            }),
            components: vec![ComponentDescription {
                kind: "mirror".into(),
                cell: GridCell(3, 1),
                orientation: Some("-".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let result = engine().solve_description(&description);
        assert_eq!(result.method, SolveMethod::Empty);
        assert!(result.readings.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].severity, Severity::Error);
    }
    #[test]
    fn valid_description() {
        let description = SceneDescription {
            laser: Some(ComponentDescription {
                cell: GridCell(2, 5),
                ..Default::default()
            }),
            components: vec![ComponentDescription {
                name: Some("det".into()),
                kind: "detector".into(),
                cell: GridCell(6, 5),
                ..Default::default()
            }],
            ..Default::default()
        };
        let result = engine().solve_description(&description);
        assert_abs_diff_eq!(result.intensity("det").unwrap(), 1.0, epsilon = 1e-9);
    }
    #[test]
    fn fallback_without_connections() {
        let scene = Scene::new()
            .with_laser(Component::at_cell(
                "laser",
                Laser::new(Direction::North),
                GridCell(2, 5),
                &grid(),
            ))
            .with_component(Component::at_cell(
                "det",
                Detector::new(),
                GridCell(6, 5),
                &grid(),
            ));
        let result = engine().solve(&scene);
        assert_eq!(result.method, SolveMethod::Bounce);
        assert_eq!(result.intensity("det"), Some(0.0));
        assert_eq!(result.paths.len(), 1);
        assert!(result.energy.is_none());
        assert_matches!(
            result.diagnostics.first(),
            Some(Diagnostic {
                severity: Severity::Info,
                ..
            })
        );
    }
    #[test]
    fn bounce_strategy_agrees() {
        let config = SolverConfig {
            strategy: Strategy::Bounce,
            ..Default::default()
        };
        let mut bounce = WaveOpticsEngine::new(config).unwrap();
        let mut linear = engine();
        for scene in [
            presets::straight(&grid()),
            presets::single_splitter(&grid()),
            presets::mach_zehnder(&grid()),
            presets::detuned_mach_zehnder(&grid()),
        ] {
            let a = bounce.solve(&scene);
            let b = linear.solve(&scene);
            assert_eq!(a.method, SolveMethod::Bounce);
            for (ra, rb) in a.readings.iter().zip(&b.readings) {
                assert_eq!(ra.name, rb.name);
                assert_abs_diff_eq!(ra.intensity, rb.intensity, epsilon = 1e-6);
            }
        }
    }
    #[test]
    fn weak_detector_contributions_ignored() {
        let config = SolverConfig {
            path_amplitude_threshold: 0.8,
            ..Default::default()
        };
        for strategy in [Strategy::Network, Strategy::Bounce] {
            let mut engine = WaveOpticsEngine::new(SolverConfig {
                strategy,
                ..config.clone()
            })
            .unwrap();
            let result = engine.solve(&presets::straight(&grid()));
            assert_abs_diff_eq!(result.intensity("det").unwrap(), 1.0, epsilon = 1e-9);
            assert_eq!(result.readings[0].beams, 1);
            // both halves of the split beam carry an amplitude of 1/√2 only
            let result = engine.solve(&presets::single_splitter(&grid()));
            assert_eq!(result.intensity("det").unwrap(), 0.0);
            assert_eq!(result.readings[0].beams, 0);
            assert!(result.gold_hits.is_empty());
        }
    }
    #[test]
    fn tunable_splitter() {
        let scene = Scene::new()
            .with_laser(Component::at_cell(
                "laser",
                Laser::default(),
                GridCell(2, 5),
                &grid(),
            ))
            .with_component(Component::at_cell(
                "bs",
                BeamSplitter::new_tunable(Orientation::Backslash, 0.2).unwrap(),
                GridCell(5, 5),
                &grid(),
            ))
            .with_component(Component::at_cell(
                "det_t",
                Detector::new(),
                GridCell(9, 5),
                &grid(),
            ))
            .with_component(Component::at_cell(
                "det_r",
                Detector::new(),
                GridCell(5, 8),
                &grid(),
            ));
        let result = engine().solve(&scene);
        assert_abs_diff_eq!(result.intensity("det_t").unwrap(), 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(result.intensity("det_r").unwrap(), 0.2, epsilon = 1e-9);
    }
}
