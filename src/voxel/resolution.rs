//! Resolution history for pyramid resampling.

use serde::{Deserialize, Serialize};

use crate::math::BoundingBox;

/// Shape of a grid captured right before it was scaled down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSnapshot {
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub bounds: BoundingBox,
}

/// LIFO stack of snapshots. `scale_down` pushes, `scale_up` pops.
///
/// Balanced push/pop pairs restore the exact original shape; an unbalanced
/// `scale_up` falls back to plain doubling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStack {
    snapshots: Vec<ResolutionSnapshot>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: ResolutionSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn pop(&mut self) -> Option<ResolutionSnapshot> {
        self.snapshots.pop()
    }

    pub fn peek(&self) -> Option<&ResolutionSnapshot> {
        self.snapshots.last()
    }

    /// Number of pyramid levels below the original resolution.
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
