//! Sequential async pipelines of grid operations.
//!
//! A pipeline is declared as JSON and run on the host's tokio runtime. Steps
//! execute strictly in order on the calling task; the runner only yields
//! between steps so progress consumers on the same runtime get a turn.

pub mod step;

pub use step::Step;

use serde::{Deserialize, Serialize};

use crate::core::{ProgressChannel, Result};
use crate::voxel::VoxelGrid;

/// Ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Parse `{"steps": [...]}` or a bare `[...]` step array.
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Document {
            Pipeline(Pipeline),
            Steps(Vec<Step>),
        }

        Ok(match serde_json::from_str(json)? {
            Document::Pipeline(pipeline) => pipeline,
            Document::Steps(steps) => Self { steps },
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Append a step.
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Run every step against `grid`, returning the final grid.
    ///
    /// The first failing step aborts the run and its error is returned.
    pub async fn run(&self, grid: VoxelGrid, channel: &ProgressChannel) -> Result<VoxelGrid> {
        let task = channel.begin("pipeline", format!("running {} steps", self.steps.len()));
        let total = self.steps.len().max(1) as f32;
        let mut work = grid;

        for (i, step) in self.steps.iter().enumerate() {
            task.pending(i as f32 / total * 100.0, format!("step {}: {}", i + 1, step.name()));
            work = match step.apply(&work, channel) {
                Ok(next) => next,
                Err(err) => {
                    log::warn!("Pipeline step {} ({}) failed: {}", i + 1, step.name(), err);
                    task.fail(format!("step {} ({}) failed: {}", i + 1, step.name(), err));
                    return Err(err);
                }
            };
            tokio::task::yield_now().await;
        }

        log::debug!(
            "Pipeline finished: {} steps, {:?}, volume {}",
            self.steps.len(),
            work.dims(),
            work.volume()
        );
        task.end("pipeline finished");
        Ok(work)
    }
}
