#![warn(missing_docs)]
//! Stepped ray casting across the canvas.
//!
//! A ray is marched from a port in fixed increments along the port direction until it enters a
//! blocked cell, leaves the canvas, exceeds the maximum distance or comes within the hit radius
//! of another component.
use crate::{
    config::SolverConfig,
    geometry::{canvas_exit, inside_canvas, polyline_length, Direction, GridCell},
    optic_ports::PortLabel,
};
use nalgebra::Point2;
use std::collections::BTreeSet;

/// A component a ray can hit.
#[derive(Debug, Clone)]
pub struct RayTarget {
    /// index of the component in the solve's node list
    pub node: usize,
    /// center of the component, used for hit detection
    pub center: Point2<f64>,
    /// point where an arriving beam path ends (the center, or the port of a laser)
    pub anchor: Point2<f64>,
    /// sides of the component that accept a beam
    pub ports: Vec<PortLabel>,
}

/// How a ray ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayEnd {
    /// entered a component through the given port
    Component {
        /// index of the hit component
        node: usize,
        /// port facing the incoming ray
        port: PortLabel,
    },
    /// hit a component on a side without a port (e.g. the back of a laser)
    Absorbed {
        /// index of the hit component
        node: usize,
    },
    /// entered a blocked cell
    Blocked(GridCell),
    /// left the canvas
    Boundary,
    /// exceeded the maximum ray length
    MaxDistance,
}

/// Result of a single ray cast.
#[derive(Debug, Clone, PartialEq)]
pub struct RayTrace {
    /// polyline from the source anchor to the end point
    pub path: Vec<Point2<f64>>,
    /// length of `path`
    pub length: f64,
    /// termination of the ray
    pub end: RayEnd,
}
impl RayTrace {
    fn new(path: Vec<Point2<f64>>, end: RayEnd) -> Self {
        let length = polyline_length(&path);
        Self { path, length, end }
    }
    /// Returns the hit component and port if the ray ended at a port.
    #[must_use]
    pub const fn hit(&self) -> Option<(usize, PortLabel)> {
        match self.end {
            RayEnd::Component { node, port } => Some((node, port)),
            _ => None,
        }
    }
}

/// Cast a ray.
///
/// * `origin`: anchor of the emitting component. The returned path starts here.
/// * `start`: position of the emitting port. Marching starts here.
/// * `source`: index of the emitting component, which is never hit.
#[must_use]
pub fn cast(
    origin: &Point2<f64>,
    start: &Point2<f64>,
    direction: Direction,
    source: usize,
    targets: &[RayTarget],
    blocked: &BTreeSet<GridCell>,
    config: &SolverConfig,
) -> RayTrace {
    let d = direction.vector();
    let mut travelled = 0.0;
    loop {
        let next_travel = travelled + config.ray_step;
        if next_travel > config.max_ray_distance {
            return RayTrace::new(vec![*origin, start + d * travelled], RayEnd::MaxDistance);
        }
        let next = start + d * next_travel;
        if !inside_canvas(&next, &config.grid) {
            let exit = canvas_exit(start, &d, &config.grid);
            return RayTrace::new(vec![*origin, exit], RayEnd::Boundary);
        }
        let cell = GridCell::containing(&next, &config.grid);
        if blocked.contains(&cell) {
            return RayTrace::new(vec![*origin, next], RayEnd::Blocked(cell));
        }
        let hit = targets
            .iter()
            .filter(|t| t.node != source)
            .map(|t| (t, nalgebra::distance(&next, &t.center)))
            .filter(|(_, dist)| *dist <= config.component_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((target, _)) = hit {
            let port = PortLabel::facing(direction.opposite());
            if !target.ports.contains(&port) {
                return RayTrace::new(vec![*origin, next], RayEnd::Absorbed { node: target.node });
            }
            let foot = start + d * (target.anchor - start).dot(&d);
            let path = if nalgebra::distance(&foot, &target.anchor) > 1e-6 {
                vec![*origin, foot, target.anchor]
            } else {
                vec![*origin, target.anchor]
            };
            return RayTrace::new(
                path,
                RayEnd::Component {
                    node: target.node,
                    port,
                },
            );
        }
        travelled = next_travel;
    }
}
