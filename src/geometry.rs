#![warn(missing_docs)]
//! Planar geometry primitives on the canvas.
//!
//! Canvas coordinates are screen coordinates: `x` grows to the right and `y` grows downwards.
use crate::{config::GridGeometry, utils::f64_to_i32};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strum::{Display as StrumDisplay, EnumIter};

/// Integer coordinate of a grid cell.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCell(pub i32, pub i32);

impl GridCell {
    /// Returns the cell whose center is closest to the given point.
    #[must_use]
    pub fn containing(point: &Point2<f64>, grid: &GridGeometry) -> Self {
        let rel = (point - grid.origin()) / grid.cell_size;
        Self(f64_to_i32(rel.x), f64_to_i32(rel.y))
    }
    /// Canvas position of the center of this cell.
    #[must_use]
    pub fn center(&self, grid: &GridGeometry) -> Point2<f64> {
        grid.origin() + Vector2::new(f64::from(self.0), f64::from(self.1)) * grid.cell_size
    }
}
impl Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}
impl From<(i32, i32)> for GridCell {
    fn from(value: (i32, i32)) -> Self {
        Self(value.0, value.1)
    }
}

/// The four cardinal directions of the grid.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumIter,
)]
pub enum Direction {
    /// towards negative `x`
    West,
    /// towards positive `y` (screen down)
    South,
    /// towards positive `x`
    East,
    /// towards negative `y` (screen up)
    North,
}
impl Direction {
    /// Unit vector of this direction.
    #[must_use]
    pub const fn vector(self) -> Vector2<f64> {
        match self {
            Self::West => Vector2::new(-1.0, 0.0),
            Self::South => Vector2::new(0.0, 1.0),
            Self::East => Vector2::new(1.0, 0.0),
            Self::North => Vector2::new(0.0, -1.0),
        }
    }
    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::West => Self::East,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::North => Self::South,
        }
    }
    /// Returns the cardinal direction parallel to `v` or `None` if `v` is not axis-aligned.
    #[must_use]
    pub fn from_vector(v: &Vector2<f64>) -> Option<Self> {
        let n = v.norm();
        if n < f64::EPSILON {
            return None;
        }
        let u = v / n;
        [Self::West, Self::South, Self::East, Self::North]
            .into_iter()
            .find(|d| (d.vector() - u).norm() < 1e-9)
    }
}

/// Returns `true` if the point lies on or inside the canvas rectangle.
#[must_use]
pub fn inside_canvas(point: &Point2<f64>, grid: &GridGeometry) -> bool {
    let min = grid.origin();
    let max = min + grid.extent();
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}

/// Point where a ray starting at `start` (inside the canvas) with direction `dir` leaves the
/// canvas rectangle.
///
/// Uses the slab method. If `start` is already outside, `start` is returned.
#[must_use]
pub fn canvas_exit(start: &Point2<f64>, dir: &Vector2<f64>, grid: &GridGeometry) -> Point2<f64> {
    if !inside_canvas(start, grid) {
        return *start;
    }
    let min = grid.origin();
    let max = min + grid.extent();
    let mut t_exit = f64::INFINITY;
    for axis in 0..2 {
        if dir[axis].abs() > f64::EPSILON {
            let bound = if dir[axis] > 0.0 { max[axis] } else { min[axis] };
            t_exit = t_exit.min((bound - start[axis]) / dir[axis]);
        }
    }
    if t_exit.is_finite() {
        start + dir * t_exit
    } else {
        *start
    }
}

/// Returns `true` if two points share a grid row or column (within a small tolerance).
#[must_use]
pub fn axis_aligned(a: &Point2<f64>, b: &Point2<f64>) -> bool {
    (a.x - b.x).abs() < 1e-6 || (a.y - b.y).abs() < 1e-6
}

/// Total length of a polyline.
#[must_use]
pub fn polyline_length(path: &[Point2<f64>]) -> f64 {
    path.windows(2)
        .map(|w| nalgebra::distance(&w[0], &w[1]))
        .sum()
}
