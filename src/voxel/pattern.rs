//! Infinite procedural voxel sources and CSG operands.

use std::f32::consts::TAU;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use super::grid::VoxelGrid;

type Sampler = dyn Fn(i32, i32, i32) -> bool + Send + Sync;

/// Boundless voxel source sampled on demand. Has no stored bits and no Z
/// extent, so it can only be combined with a finite grid by intersection or
/// difference.
#[derive(Clone)]
pub struct Pattern {
    sampler: Arc<Sampler>,
}

impl Pattern {
    /// Pattern backed by an arbitrary sampling function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(i32, i32, i32) -> bool + Send + Sync + 'static,
    {
        Self { sampler: Arc::new(f) }
    }

    /// Sample the pattern; defined for every coordinate, including negative ones.
    #[inline]
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> bool {
        (self.sampler)(x, y, z)
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern").field("sampler", &"<fn>").finish()
    }
}

/// Serializable description of the built-in patterns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PatternSpec {
    /// 3D checkerboard of `cell`-sized cubes, solid where the cell parity is even
    Checker { cell: u32 },
    /// Vertical walls along X and Y every `spacing` voxels, `wall` voxels thick
    Lattice { spacing: u32, wall: u32 },
    /// Gyroid minimal-surface shell with the given period (voxels) and
    /// iso-band half-width (0..1.5)
    Gyroid { period: u32, thickness: f32 },
}

impl PatternSpec {
    /// Instantiate the pattern, validating its parameters.
    pub fn build(&self) -> Result<Pattern> {
        match *self {
            PatternSpec::Checker { cell } => {
                if cell == 0 {
                    return Err(Error::InvalidParameter("checker cell must be positive".into()));
                }
                let cell = cell as i32;
                Ok(Pattern::from_fn(move |x, y, z| {
                    (x.div_euclid(cell) + y.div_euclid(cell) + z.div_euclid(cell)).rem_euclid(2) == 0
                }))
            }
            PatternSpec::Lattice { spacing, wall } => {
                if spacing == 0 {
                    return Err(Error::InvalidParameter("lattice spacing must be positive".into()));
                }
                let (spacing, wall) = (spacing as i32, wall as i32);
                Ok(Pattern::from_fn(move |x, y, _| {
                    x.rem_euclid(spacing) < wall || y.rem_euclid(spacing) < wall
                }))
            }
            PatternSpec::Gyroid { period, thickness } => {
                if period == 0 {
                    return Err(Error::InvalidParameter("gyroid period must be positive".into()));
                }
                let k = TAU / period as f32;
                Ok(Pattern::from_fn(move |x, y, z| {
                    let (x, y, z) = (x as f32 * k, y as f32 * k, z as f32 * k);
                    let g = x.sin() * y.cos() + y.sin() * z.cos() + z.sin() * x.cos();
                    g.abs() <= thickness
                }))
            }
        }
    }
}

/// Second operand of a CSG operation.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a> {
    /// Finite grid with stored bits
    Grid(&'a VoxelGrid),
    /// Infinite procedural pattern
    Pattern(&'a Pattern),
}

impl<'a> From<&'a VoxelGrid> for Operand<'a> {
    fn from(grid: &'a VoxelGrid) -> Self {
        Operand::Grid(grid)
    }
}

impl<'a> From<&'a Pattern> for Operand<'a> {
    fn from(pattern: &'a Pattern) -> Self {
        Operand::Pattern(pattern)
    }
}
