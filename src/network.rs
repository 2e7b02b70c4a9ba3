#![warn(missing_docs)]
//! Optical connection network
//!
//! The network is rebuilt from a (laser, components) snapshot for every solve:
//!
//! 1. every component gets its ports,
//! 2. a ray is cast from every port that can emit light (all but detector ports),
//! 3. all rays ending at a port of another component become candidate connections,
//! 4. the candidates are ranked and greedily accepted such that every port takes part in at
//!    most one connection.
//!
//! Each accepted connection carries up to two directed [`Beam`]s, one per propagation
//! direction. Beams leaving a detector are never created since detectors absorb everything.
use crate::{
    component::{Component, ComponentKind, Element},
    config::SolverConfig,
    diagnostics::Diagnostics,
    geometry::{axis_aligned, Direction, GridCell},
    optic_ports::{PortArena, PortId, PortLabel},
    ray_trace::{cast, RayTarget, RayTrace},
    scattering::ScatteringMatrix,
};
use itertools::Itertools;
use nalgebra::Point2;
use num::complex::Complex64;
use petgraph::{
    algo::is_cyclic_directed,
    graph::{DiGraph, NodeIndex},
    visit::Dfs,
};
use std::collections::{BTreeSet, HashMap};

/// Priority bonus of connections starting or ending at the laser.
const LASER_PRIORITY: i32 = -1000;
/// Priority bonus of connections ending at a detector.
const DETECTOR_PRIORITY: i32 = -100;
/// Penalty of connections between components not sharing a grid row or column.
const OFF_AXIS_PENALTY: i32 = 50;
/// Penalty of connections between two components of the same kind.
const SAME_KIND_PENALTY: i32 = 500;

/// An accepted (undirected) connection between two ports.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalConnection {
    /// emitting port of the ray that found this connection
    pub port1: PortId,
    /// port hit by the ray
    pub port2: PortId,
    /// polyline from the anchor of `port1`'s component to the anchor of `port2`'s component
    pub path: Vec<Point2<f64>>,
    /// physical length of `path`
    pub length: f64,
    /// propagation phase `length · 2π/λ`
    pub phase: f64,
}

/// A directed beam along a connection. Beams are the unknowns of the linear system.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    /// index of the carrying connection
    pub connection: usize,
    /// port the beam leaves through
    pub source: PortId,
    /// port the beam enters through
    pub target: PortId,
    /// index of the emitting component
    pub source_node: usize,
    /// index of the receiving component
    pub target_node: usize,
    /// path in propagation direction
    pub path: Vec<Point2<f64>>,
    /// propagation length
    pub length: f64,
}

/// A non-zero entry of the coupling matrix: light of beam `from` arriving at a component is
/// scattered into beam `to` with the given (scattering matrix) amplitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coupling {
    /// index of the arriving beam
    pub from: usize,
    /// index of the leaving beam
    pub to: usize,
    /// scattering matrix element `S[out, in]`
    pub value: Complex64,
}

#[derive(Debug, Clone)]
struct Candidate {
    source: PortId,
    target: PortId,
    trace: RayTrace,
    priority: i32,
}

/// Components, ports and scattering matrices of a single solve.
///
/// The laser is node `0`. The other components follow sorted by their distance to the laser.
#[derive(Debug)]
pub struct Layout<'a> {
    nodes: Vec<&'a Component>,
    ports: PortArena,
    laser_port: PortId,
    matrices: Vec<Option<ScatteringMatrix>>,
}
impl<'a> Layout<'a> {
    /// Create the layout of a snapshot.
    ///
    /// Additional lasers in `components` are ignored with a warning. Scattering matrices are
    /// constructed here; their consistency warnings go to `diagnostics`.
    pub fn new(
        laser: &'a Component,
        components: &'a [Component],
        config: &SolverConfig,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut nodes = vec![laser];
        for c in components {
            if c.kind() == ComponentKind::Laser {
                diagnostics.warning(
                    c.name(),
                    "only a single laser is supported, ignoring this one".into(),
                );
            } else {
                nodes.push(c);
            }
        }
        nodes[1..].sort_by(|a, b| {
            let da = nalgebra::distance(laser.position(), a.position());
            let db = nalgebra::distance(laser.position(), b.position());
            da.total_cmp(&db)
        });
        let direction = laser.laser().map_or(Direction::East, |l| l.direction);
        let mut ports = PortArena::new();
        let laser_port = ports.add_laser_port(0, laser.position(), direction, config);
        let mut matrices = vec![None];
        for (idx, node) in nodes.iter().enumerate().skip(1) {
            ports.add_four_ports(idx, node.position(), config);
            matrices.push(
                node.element()
                    .as_scatterer()
                    .map(|s| s.scattering_matrix(config, node.name(), diagnostics)),
            );
        }
        Self {
            nodes,
            ports,
            laser_port,
            matrices,
        }
    }
    /// Start point of a beam leaving through `port`: the laser port itself or the center of
    /// the owning component.
    #[must_use]
    pub fn anchor(&self, port: PortId) -> Point2<f64> {
        self.ports.get(port).map_or_else(Point2::origin, |p| {
            if p.node == 0 {
                p.position
            } else {
                *self.nodes[p.node].position()
            }
        })
    }
    /// Hit targets of all nodes for [`cast`].
    #[must_use]
    pub fn ray_targets(&self) -> Vec<RayTarget> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                if idx == 0 {
                    let label = self.ports.get(self.laser_port).map(|p| p.label);
                    RayTarget {
                        node: 0,
                        center: *node.position(),
                        anchor: self.anchor(self.laser_port),
                        ports: label.into_iter().collect(),
                    }
                } else {
                    RayTarget {
                        node: idx,
                        center: *node.position(),
                        anchor: *node.position(),
                        ports: PortLabel::ALL.to_vec(),
                    }
                }
            })
            .collect()
    }
    /// Cast the ray leaving through `port`.
    #[must_use]
    pub fn trace(
        &self,
        port: PortId,
        targets: &[RayTarget],
        blocked: &BTreeSet<GridCell>,
        config: &SolverConfig,
    ) -> Option<RayTrace> {
        let p = self.ports.get(port)?;
        Some(cast(
            &self.anchor(port),
            &p.position,
            p.direction,
            p.node,
            targets,
            blocked,
            config,
        ))
    }
    /// Returns the components. Index `0` is the laser.
    #[must_use]
    pub fn nodes(&self) -> &[&'a Component] {
        &self.nodes
    }
    /// Returns the port arena.
    #[must_use]
    pub const fn ports(&self) -> &PortArena {
        &self.ports
    }
    /// Returns the emitting port of the laser.
    #[must_use]
    pub const fn laser_port(&self) -> PortId {
        self.laser_port
    }
    /// Returns the scattering matrix of the given node, if it has one.
    #[must_use]
    pub fn matrix(&self, node: usize) -> Option<&ScatteringMatrix> {
        self.matrices.get(node).and_then(Option::as_ref)
    }
    /// Index of the node owning `port`.
    #[must_use]
    pub fn node_of(&self, port: PortId) -> usize {
        self.ports.get(port).map_or(0, |p| p.node)
    }
}

/// The connection network of a single solve.
#[derive(Debug)]
pub struct OpticalNetwork<'a> {
    layout: Layout<'a>,
    connections: Vec<OpticalConnection>,
    beams: Vec<Beam>,
    claimed: HashMap<PortId, usize>,
    dead_ends: Vec<RayTrace>,
}

impl<'a> OpticalNetwork<'a> {
    /// Build the network of the given snapshot.
    ///
    /// See [`Layout::new`] for the node order and the handling of additional lasers.
    pub fn build(
        laser: &'a Component,
        components: &'a [Component],
        blocked: &BTreeSet<GridCell>,
        config: &SolverConfig,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut network = Self {
            layout: Layout::new(laser, components, config, diagnostics),
            connections: Vec::new(),
            beams: Vec::new(),
            claimed: HashMap::new(),
            dead_ends: Vec::new(),
        };
        let candidates = network.collect_candidates(blocked, config);
        network.accept_candidates(candidates, config);
        network.create_beams();
        network
    }
    fn collect_candidates(
        &mut self,
        blocked: &BTreeSet<GridCell>,
        config: &SolverConfig,
    ) -> Vec<Candidate> {
        let layout = &self.layout;
        let targets = layout.ray_targets();
        let mut candidates = Vec::new();
        let mut dead_ends = Vec::new();
        for (id, port) in layout.ports.iter() {
            if layout.nodes[port.node].is_detector() {
                continue;
            }
            let Some(trace) = layout.trace(id, &targets, blocked, config) else {
                continue;
            };
            let Some(target) = trace
                .hit()
                .and_then(|(node, label)| layout.ports.find(node, label))
            else {
                dead_ends.push(trace);
                continue;
            };
            let priority = self.priority(id, target);
            candidates.push(Candidate {
                source: id,
                target,
                trace,
                priority,
            });
        }
        self.dead_ends = dead_ends;
        candidates
    }
    fn priority(&self, source: PortId, target: PortId) -> i32 {
        let (na, nb) = (self.layout.node_of(source), self.layout.node_of(target));
        if na == 0 || nb == 0 {
            return LASER_PRIORITY;
        }
        let (a, b) = (self.layout.nodes[na], self.layout.nodes[nb]);
        if a.is_detector() || b.is_detector() {
            return DETECTOR_PRIORITY;
        }
        let mut priority = 0;
        if !axis_aligned(a.position(), b.position()) {
            priority += OFF_AXIS_PENALTY;
        }
        if a.kind() == b.kind() {
            priority += SAME_KIND_PENALTY;
        }
        priority
    }
    fn accept_candidates(&mut self, candidates: Vec<Candidate>, config: &SolverConfig) {
        let k = config.wave_number();
        let ranked = candidates.into_iter().sorted_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(a.trace.length.total_cmp(&b.trace.length))
                .then(a.source.cmp(&b.source))
                .then(a.target.cmp(&b.target))
        });
        for candidate in ranked {
            if self.claimed.contains_key(&candidate.source)
                || self.claimed.contains_key(&candidate.target)
            {
                continue;
            }
            let idx = self.connections.len();
            self.claimed.insert(candidate.source, idx);
            self.claimed.insert(candidate.target, idx);
            self.connections.push(OpticalConnection {
                port1: candidate.source,
                port2: candidate.target,
                length: candidate.trace.length,
                phase: candidate.trace.length * k,
                path: candidate.trace.path,
            });
        }
    }
    fn create_beams(&mut self) {
        let mut beams = Vec::new();
        for (idx, c) in self.connections.iter().enumerate() {
            for (source, target, reversed) in [(c.port1, c.port2, false), (c.port2, c.port1, true)]
            {
                let source_node = self.layout.node_of(source);
                if self.layout.nodes[source_node].is_detector() {
                    continue;
                }
                let mut path = c.path.clone();
                if reversed {
                    path.reverse();
                }
                beams.push(Beam {
                    connection: idx,
                    source,
                    target,
                    source_node,
                    target_node: self.layout.node_of(target),
                    path,
                    length: c.length,
                });
            }
        }
        self.beams = beams;
    }
    /// Returns the layout (components, ports, matrices) of this network.
    #[must_use]
    pub const fn layout(&self) -> &Layout<'a> {
        &self.layout
    }
    /// Returns the components of this network. Index `0` is the laser.
    #[must_use]
    pub fn nodes(&self) -> &[&'a Component] {
        self.layout.nodes()
    }
    /// Returns the port arena of this network.
    #[must_use]
    pub const fn ports(&self) -> &PortArena {
        self.layout.ports()
    }
    /// Returns the emitting port of the laser.
    #[must_use]
    pub const fn laser_port(&self) -> PortId {
        self.layout.laser_port()
    }
    /// Returns the scattering matrix of the given node, if it has one.
    #[must_use]
    pub fn matrix(&self, node: usize) -> Option<&ScatteringMatrix> {
        self.layout.matrix(node)
    }
    /// Returns the accepted connections.
    #[must_use]
    pub fn connections(&self) -> &[OpticalConnection] {
        &self.connections
    }
    /// Returns the directed beams.
    #[must_use]
    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }
    /// Returns the rays which did not end at a port.
    #[must_use]
    pub fn dead_ends(&self) -> &[RayTrace] {
        &self.dead_ends
    }
    /// Returns `true` if no connection was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
    /// Returns `true` if the given port takes part in a connection.
    #[must_use]
    pub fn is_connected(&self, port: PortId) -> bool {
        self.claimed.contains_key(&port)
    }
    /// Returns the label of a port.
    #[must_use]
    pub fn label(&self, port: PortId) -> Option<PortLabel> {
        self.ports().get(port).map(|p| p.label)
    }
    /// Indices of all beams emitted by the laser.
    #[must_use]
    pub fn laser_beams(&self) -> Vec<usize> {
        self.beams
            .iter()
            .positions(|b| b.source == self.laser_port())
            .collect()
    }
    /// All non-zero couplings between arriving and leaving beams at scattering components.
    #[must_use]
    pub fn couplings(&self) -> Vec<Coupling> {
        let mut leaving: HashMap<usize, Vec<usize>> = HashMap::new();
        for (j, beam) in self.beams.iter().enumerate() {
            leaving.entry(beam.source_node).or_default().push(j);
        }
        let mut couplings = Vec::new();
        for (i, arriving) in self.beams.iter().enumerate() {
            let (Some(matrix), Some(p_in)) =
                (self.matrix(arriving.target_node), self.label(arriving.target))
            else {
                continue;
            };
            for &j in leaving.get(&arriving.target_node).into_iter().flatten() {
                let Some(p_out) = self.label(self.beams[j].source) else {
                    continue;
                };
                let value = matrix.get(p_out, p_in);
                if value.norm() > 0.0 {
                    couplings.push(Coupling {
                        from: i,
                        to: j,
                        value,
                    });
                }
            }
        }
        couplings
    }
    /// Directed graph of the beams with an edge for every non-zero [`Coupling`].
    #[must_use]
    pub fn coupling_graph(&self) -> DiGraph<usize, Complex64> {
        let mut graph = DiGraph::new();
        let indices: Vec<NodeIndex> = (0..self.beams.len()).map(|i| graph.add_node(i)).collect();
        for c in self.couplings() {
            graph.add_edge(indices[c.from], indices[c.to], c.value);
        }
        graph
    }
    /// Returns `true` if light can circulate (a cycle in the coupling graph).
    #[must_use]
    pub fn has_feedback_loop(&self) -> bool {
        is_cyclic_directed(&self.coupling_graph())
    }
    /// Indices of the components reachable by light from the laser (including the laser).
    #[must_use]
    pub fn reachable_nodes(&self) -> BTreeSet<usize> {
        let graph = self.coupling_graph();
        let mut reached = BTreeSet::from([0]);
        for start in self.laser_beams() {
            let mut dfs = Dfs::new(&graph, NodeIndex::new(start));
            while let Some(nx) = dfs.next(&graph) {
                reached.insert(self.beams[graph[nx]].target_node);
            }
        }
        reached
    }
    /// Report unreached components and feedback loops as informational diagnostics.
    pub fn diagnose(&self, diagnostics: &mut Diagnostics) {
        let reached = self.reachable_nodes();
        for (idx, node) in self.nodes().iter().enumerate() {
            if !reached.contains(&idx) {
                diagnostics.info(node.name(), "not reached by the laser beam".into());
            }
        }
        if self.has_feedback_loop() {
            diagnostics.info("network", "feedback loop detected".into());
        }
    }
    /// Export the network in Graphviz `.dot` format.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot =
            String::from("digraph {\n\tfontsize = 8;\n\tcompound = true;\n\trankdir = \"LR\";\n");
        for (idx, node) in self.nodes().iter().enumerate() {
            let labels: Vec<String> = self
                .ports()
                .iter()
                .filter(|(_, p)| p.node == idx)
                .map(|(_, p)| p.label.to_string())
                .collect();
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            dot.push_str(&node.to_dot(idx, &labels));
        }
        for (idx, c) in self.connections.iter().enumerate() {
            let (Some(p1), Some(p2)) = (self.ports().get(c.port1), self.ports().get(c.port2)) else {
                continue;
            };
            let count = self.beams.iter().filter(|b| b.connection == idx).count();
            let dir = if count == 2 { "both" } else { "forward" };
            let (from, to) = if self.nodes()[p1.node].is_detector() {
                (p2, p1)
            } else {
                (p1, p2)
            };
            dot.push_str(&format!(
                "\ti{}:{} -> i{}:{} [dir=\"{dir}\" label=\"{:.1}\"]\n",
                from.node, from.label, to.node, to.label, c.length
            ));
        }
        dot.push_str("}\n");
        dot
    }
    /// Returns `true` if the element of the given node is a laser.
    #[must_use]
    pub fn is_laser(&self, node: usize) -> bool {
        matches!(
            self.nodes().get(node).map(|n| n.element()),
            Some(Element::Laser(_))
        )
    }
}
