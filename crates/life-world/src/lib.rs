//! Grid simulation engine.
//!
//! This crate implements the Game of Life grid, its double-buffered update,
//! the canvas renderer, the periodic snapshot exporter and the scheduler that
//! drives all of them from a single cooperative loop.

pub mod grid;
pub mod rules;
pub mod simulation;
pub mod render;
pub mod exporter;
pub mod schedule;
pub mod session;
#[cfg(test)]
mod patterns;

pub use grid::Grid;
pub use render::{Canvas, Renderer};
pub use exporter::{ExportCycle, Snapshot, SnapshotExporter};
pub use schedule::{Cadence, Clock, ManualClock, MonotonicClock, PeriodicTask};
pub use session::{Session, SessionEvent};
pub use simulation::Simulation;
