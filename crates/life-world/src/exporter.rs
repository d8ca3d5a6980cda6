//! Periodic PNG snapshots with a reset every few cycles.

use crate::render::Canvas;
use life_core::{Result, SimulationConfig};
use tracing::{info, instrument};

/// An encoded frame ready for a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub file_name: String,
    pub png: Vec<u8>,
}

/// Outcome of one export cycle
#[derive(Debug, Clone)]
pub struct ExportCycle {
    pub snapshot: Snapshot,
    /// 1-based position of this cycle within the current reset window
    pub cycle: u32,
    /// Set on the cycle that completes the window
    pub reset: bool,
}

pub struct SnapshotExporter {
    file_name: String,
    exports_before_reset: u32,
    counter: u32,
}

impl SnapshotExporter {
    pub fn new(file_name: impl Into<String>, exports_before_reset: u32) -> Self {
        Self {
            file_name: file_name.into(),
            exports_before_reset: exports_before_reset.max(1),
            counter: 0,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.snapshot_file_name.clone(), config.exports_before_reset)
    }

    /// Encode the canvas and count the cycle.
    ///
    /// The counter goes back to zero on the cycle that requests a reset, so
    /// a reset is requested at most once per window.
    #[instrument(skip(self, canvas))]
    pub fn export(&mut self, canvas: &Canvas) -> Result<ExportCycle> {
        let png = canvas.encode_png()?;

        self.counter += 1;
        let cycle = self.counter;
        let reset = cycle == self.exports_before_reset;
        if reset {
            self.counter = 0;
        }

        info!(
            file_name = %self.file_name,
            bytes = png.len(),
            cycle,
            reset,
            "Snapshot exported"
        );

        Ok(ExportCycle {
            snapshot: Snapshot {
                file_name: self.file_name.clone(),
                png,
            },
            cycle,
            reset,
        })
    }

    /// Cycles completed in the current window
    pub fn counter(&self) -> u32 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_exactly_on_third_cycle() {
        let canvas = Canvas::new(20, 20, 10);
        let mut exporter = SnapshotExporter::new("gameState.png", 3);

        let resets: Vec<bool> = (0..9)
            .map(|_| exporter.export(&canvas).unwrap().reset)
            .collect();

        assert_eq!(
            resets,
            vec![false, false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_cycle_numbers_restart_after_reset() {
        let canvas = Canvas::new(10, 10, 10);
        let mut exporter = SnapshotExporter::new("gameState.png", 3);

        let cycles: Vec<u32> = (0..4)
            .map(|_| exporter.export(&canvas).unwrap().cycle)
            .collect();
        assert_eq!(cycles, vec![1, 2, 3, 1]);
        assert_eq!(exporter.counter(), 1);
    }

    #[test]
    fn test_snapshot_is_named_png() {
        let canvas = Canvas::new(10, 10, 10);
        let mut exporter = SnapshotExporter::from_config(&SimulationConfig::default());

        let cycle = exporter.export(&canvas).unwrap();
        assert_eq!(cycle.snapshot.file_name, "gameState.png");
        assert_eq!(&cycle.snapshot.png[1..4], b"PNG");
    }

    #[test]
    fn test_encoding_failure_does_not_count() {
        let canvas = Canvas::new(0, 0, 10);
        let mut exporter = SnapshotExporter::new("gameState.png", 3);

        assert!(exporter.export(&canvas).is_err());
        assert_eq!(exporter.counter(), 0);
    }
}
