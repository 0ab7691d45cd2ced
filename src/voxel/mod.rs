//! Voxel data structures

pub mod grid;
pub mod resolution;
pub mod pattern;

pub use grid::VoxelGrid;
pub use resolution::{ResolutionSnapshot, ResolutionStack};
pub use pattern::{Operand, Pattern, PatternSpec};
