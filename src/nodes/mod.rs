#![warn(missing_docs)]
//! This module contains the concrete component types (laser, mirror, beam splitters, detector)
mod beam_splitter;
mod detector;
mod laser;
mod mirror;

pub use beam_splitter::{BeamSplitter, SplitterKind};
pub use detector::Detector;
pub use laser::Laser;
pub use mirror::Mirror;
