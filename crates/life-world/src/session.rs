//! The simulation, its canvas and its periodic tasks, driven from one loop.

use crate::exporter::{Snapshot, SnapshotExporter};
use crate::render::Canvas;
use crate::schedule::{Cadence, PeriodicTask};
use crate::simulation::Simulation;
use life_core::{Result, SimulationConfig};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Something that happened during [`Session::run_due`]
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Ticked { generation: u64 },
    Exported(Snapshot),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Tick,
    Export,
}

pub struct Session {
    simulation: Simulation,
    canvas: Canvas,
    exporter: SnapshotExporter,
    tick_task: PeriodicTask,
    export_task: PeriodicTask,
    resets: u64,
}

impl Session {
    /// New random simulation whose tasks start counting at `start`
    pub fn new(config: &SimulationConfig, start: Duration) -> Self {
        let simulation = Simulation::new(config);
        Self::with_simulation(config, simulation, start)
    }

    pub fn with_simulation(config: &SimulationConfig, simulation: Simulation, start: Duration) -> Self {
        let mut canvas = Canvas::from_config(config);
        // The canvas shows the starting grid until the first tick
        canvas.paint(simulation.current());

        Self {
            simulation,
            canvas,
            exporter: SnapshotExporter::from_config(config),
            tick_task: PeriodicTask::new(
                Duration::from_millis(config.tick_interval_ms),
                Cadence::FixedRate,
                start,
            ),
            export_task: PeriodicTask::new(
                Duration::from_millis(config.export_interval_ms),
                Cadence::SelfRescheduling,
                start,
            ),
            resets: 0,
        }
    }

    /// Run every task due at or before `now`, earliest first.
    ///
    /// Ticks win ties with exports. A reset restarts both tasks from `now`
    /// and ends the pass.
    #[instrument(skip(self), fields(now_ms = now.as_millis() as u64))]
    pub fn run_due(&mut self, now: Duration) -> Result<Vec<SessionEvent>> {
        let mut events = Vec::new();

        while let Some(task) = self.next_due_task(now) {
            match task {
                Task::Tick => {
                    self.simulation.tick(&mut self.canvas)?;
                    self.tick_task.complete(now);
                    events.push(SessionEvent::Ticked {
                        generation: self.simulation.generation(),
                    });
                }
                Task::Export => {
                    let cycle = self.exporter.export(&self.canvas)?;
                    self.export_task.complete(now);
                    events.push(SessionEvent::Exported(cycle.snapshot));

                    if cycle.reset {
                        self.reset(now);
                        events.push(SessionEvent::Reset);
                        break;
                    }
                }
            }
        }

        if !events.is_empty() {
            debug!(events = events.len(), "Ran due tasks");
        }

        Ok(events)
    }

    fn next_due_task(&self, now: Duration) -> Option<Task> {
        let tick = self.tick_task.is_due(now).then_some(self.tick_task.next_due());
        let export = self.export_task.is_due(now).then_some(self.export_task.next_due());

        match (tick, export) {
            (Some(t), Some(e)) if e < t => Some(Task::Export),
            (Some(_), _) => Some(Task::Tick),
            (None, Some(_)) => Some(Task::Export),
            (None, None) => None,
        }
    }

    fn reset(&mut self, now: Duration) {
        self.simulation.reset();
        self.canvas.paint(self.simulation.current());
        self.tick_task.restart(now);
        self.export_task.restart(now);
        self.resets += 1;

        info!(resets = self.resets, "Session restarted with a fresh grid");
    }

    /// When the next task becomes due
    pub fn next_deadline(&self) -> Duration {
        self.tick_task.next_due().min(self.export_task.next_due())
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }
}
