//! Dense bit-packed voxel grid.
//!
//! Voxel `(x, y, z)` lives at bit `z * size_y * size_x + y * size_x + x`.
//! Reads outside the grid are `false`, writes outside the grid are dropped.

use bitvec::prelude::*;

use crate::core::{Error, ProgressChannel, Result};
use crate::math::BoundingBox;
use super::resolution::ResolutionStack;

/// Dense 3D boolean volume with its bounding box and pyramid history.
///
/// The bounding box is always a superset of the true voxels: `set_voxel`
/// widens it when writing `true`, and operations either derive it
/// analytically or recompute it with [`VoxelGrid::refresh_bounding_box`].
/// The one exception is `boolean_inversion`, which keeps the old box.
#[derive(Clone)]
pub struct VoxelGrid {
    size_x: usize,
    size_y: usize,
    size_z: usize,
    bits: BitVec,
    bounds: BoundingBox,
    history: ResolutionStack,
}

impl VoxelGrid {
    /// Build a grid from externally decoded bits.
    ///
    /// Fails with `DimensionMismatch` if `bits.len()` differs from the
    /// dimension product or any dimension is zero. Without a box the bounds
    /// are recomputed with a full scan.
    pub fn new(
        size_x: usize,
        size_y: usize,
        size_z: usize,
        bits: BitVec,
        bounds: Option<BoundingBox>,
        channel: &ProgressChannel,
    ) -> Result<Self> {
        let task = channel.begin("constructor", "testing data...");
        if let Err(err) = check_dims(size_x, size_y, size_z, bits.len()) {
            task.fail("voxel data does not match dimensions");
            return Err(err);
        }
        task.pending(10.0, "loading voxel data...");

        let mut grid = Self::from_parts(
            size_x,
            size_y,
            size_z,
            bits,
            BoundingBox::empty_for(size_x, size_y, size_z),
            ResolutionStack::new(),
        );
        match bounds {
            Some(bounds) => {
                grid.bounds = bounds.clamped(size_x, size_y, size_z);
                task.end("custom bounding box used, voxel cube initialised.");
            }
            None => {
                task.pending(75.0, "refreshing bounding box...");
                grid.refresh_bounding_box(channel);
                task.end("bounding box refreshed, voxel cube initialised.");
            }
        }
        Ok(grid)
    }

    /// All-false grid.
    pub fn empty(size_x: usize, size_y: usize, size_z: usize) -> Result<Self> {
        check_dims(size_x, size_y, size_z, size_x * size_y * size_z)?;
        Ok(Self::blank(size_x, size_y, size_z, ResolutionStack::new()))
    }

    /// Grid whose voxels are produced by `f(x, y, z)`; the box is exact.
    pub fn from_fn<F>(size_x: usize, size_y: usize, size_z: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize, usize) -> bool,
    {
        let mut grid = Self::empty(size_x, size_y, size_z)?;
        for z in 0..size_z {
            for y in 0..size_y {
                for x in 0..size_x {
                    if f(x, y, z) {
                        grid.set_voxel(x as i32, y as i32, z as i32, true);
                    }
                }
            }
        }
        Ok(grid)
    }

    /// Assemble a grid without validation. Callers guarantee the invariants.
    pub(crate) fn from_parts(
        size_x: usize,
        size_y: usize,
        size_z: usize,
        bits: BitVec,
        bounds: BoundingBox,
        history: ResolutionStack,
    ) -> Self {
        debug_assert_eq!(bits.len(), size_x * size_y * size_z);
        Self { size_x, size_y, size_z, bits, bounds, history }
    }

    /// Zero-filled grid with an empty box.
    pub(crate) fn blank(size_x: usize, size_y: usize, size_z: usize, history: ResolutionStack) -> Self {
        Self::from_parts(
            size_x,
            size_y,
            size_z,
            bitvec![0; size_x * size_y * size_z],
            BoundingBox::empty_for(size_x, size_y, size_z),
            history,
        )
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }

    pub fn size_y(&self) -> usize {
        self.size_y
    }

    pub fn size_z(&self) -> usize {
        self.size_z
    }

    /// `(size_x, size_y, size_z)`
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.size_x, self.size_y, self.size_z)
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Replace the bounding box, clamped to the grid. The caller vouches that
    /// it still encloses every true voxel.
    pub fn set_bounding_box(&mut self, bounds: BoundingBox) {
        self.bounds = bounds.clamped(self.size_x, self.size_y, self.size_z);
    }

    pub fn resolution_stack(&self) -> &ResolutionStack {
        &self.history
    }

    /// Raw bit buffer.
    pub fn bits(&self) -> &BitSlice {
        &self.bits
    }

    pub fn into_bits(self) -> BitVec {
        self.bits
    }

    /// Bit index of a coordinate, `None` when out of range.
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if x >= self.size_x || y >= self.size_y || z >= self.size_z {
            return None;
        }
        Some(z * self.size_y * self.size_x + y * self.size_x + x)
    }

    /// Voxel value; `false` outside the grid.
    #[inline]
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> bool {
        match self.index(x, y, z) {
            Some(i) => self.bits[i],
            None => false,
        }
    }

    /// Write a voxel. Returns `false` (and writes nothing) when out of range.
    #[inline]
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, value: bool) -> bool {
        match self.index(x, y, z) {
            Some(i) => {
                self.bits.set(i, value);
                if value {
                    self.bounds.include(x, y, z);
                }
                true
            }
            None => false,
        }
    }

    /// Number of true voxels.
    pub fn volume(&self) -> usize {
        self.bits.count_ones()
    }

    /// Copy of the `size_x * size_y` slice at height `z` (0-indexed).
    /// An out-of-range `z` yields an all-false layer.
    pub fn get_layer(&self, z: i32) -> BitVec {
        let layer = self.size_x * self.size_y;
        if z < 0 || z as usize >= self.size_z {
            return bitvec![0; layer];
        }
        let start = z as usize * layer;
        self.bits[start..start + layer].to_bitvec()
    }

    /// Recompute the exact bounding box with a full scan.
    pub fn refresh_bounding_box(&mut self, channel: &ProgressChannel) {
        let mut task = channel.begin("refreshBoundingBox", "bounding box calibration start");
        let layer = self.size_x * self.size_y;
        let mut bounds = BoundingBox::empty_for(self.size_x, self.size_y, self.size_z);

        task.set_work(self.size_z as u64);
        for z in 0..self.size_z {
            let slice = &self.bits[z * layer..(z + 1) * layer];
            for i in slice.iter_ones() {
                bounds.include((i % self.size_x) as i32, (i / self.size_x) as i32, z as i32);
            }
            task.tick("calibrating bounding box");
        }

        self.bounds = bounds;
        task.end("bounding box calibrated");
    }

    /// Same-shaped zero grid that inherits this grid's pyramid history.
    pub(crate) fn blank_like(&self) -> Self {
        Self::blank(self.size_x, self.size_y, self.size_z, self.history.clone())
    }
}

fn check_dims(size_x: usize, size_y: usize, size_z: usize, len: usize) -> Result<()> {
    if size_x == 0 || size_y == 0 || size_z == 0 {
        return Err(Error::DimensionMismatch(format!(
            "dimensions must be positive, got {}x{}x{}",
            size_x, size_y, size_z
        )));
    }
    let expected = size_x
        .checked_mul(size_y)
        .and_then(|xy| xy.checked_mul(size_z))
        .ok_or_else(|| Error::DimensionMismatch(format!(
            "{}x{}x{} overflows the address space",
            size_x, size_y, size_z
        )))?;
    if expected != len {
        return Err(Error::DimensionMismatch(format!(
            "voxel data does not match dimensions: {}x{}x{} needs {} bits, got {}",
            size_x, size_y, size_z, expected, len
        )));
    }
    Ok(())
}

/// Voxel-for-voxel equality; bounding boxes and pyramid history are ignored.
impl PartialEq for VoxelGrid {
    fn eq(&self, other: &Self) -> bool {
        self.dims() == other.dims() && self.bits == other.bits
    }
}

impl Eq for VoxelGrid {}

impl std::fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("dims", &self.dims())
            .field("volume", &self.volume())
            .field("bounds", &self.bounds)
            .field("pyramid_depth", &self.history.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordingSink;
    use std::sync::Arc;

    #[test]
    fn test_new_rejects_wrong_length() {
        let channel = ProgressChannel::silent();
        let err = VoxelGrid::new(2, 2, 2, bitvec![0; 7], None, &channel).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch(_)));
    }

    #[test]
    fn test_new_rejects_zero_dimension() {
        let channel = ProgressChannel::silent();
        assert!(VoxelGrid::new(0, 2, 2, BitVec::new(), None, &channel).is_err());
        assert!(VoxelGrid::empty(3, 0, 1).is_err());
    }

    #[test]
    fn test_new_failure_emits_error_event() {
        let sink = Arc::new(RecordingSink::new());
        let channel = ProgressChannel::new(sink.clone());
        let _ = VoxelGrid::new(2, 2, 2, bitvec![0; 3], None, &channel);
        let events = sink.events_for("constructor");
        assert_eq!(events.last().unwrap().state, crate::core::ProgressState::Error);
    }

    #[test]
    fn test_new_computes_box() {
        let channel = ProgressChannel::silent();
        let mut bits = bitvec![0; 27];
        bits.set(1 + 3 + 9, true); // (1,1,1)
        bits.set(2 + 2 * 9, true); // (2,0,2)
        let grid = VoxelGrid::new(3, 3, 3, bits, None, &channel).unwrap();
        assert_eq!(*grid.bounding_box(), BoundingBox::new(1, 2, 0, 1, 1, 2));
        assert_eq!(grid.volume(), 2);
    }

    #[test]
    fn test_new_keeps_supplied_box() {
        let channel = ProgressChannel::silent();
        let custom = BoundingBox::full(2, 2, 2);
        let grid = VoxelGrid::new(2, 2, 2, bitvec![0; 8], Some(custom), &channel).unwrap();
        assert_eq!(*grid.bounding_box(), custom);
    }

    #[test]
    fn test_oversized_box_is_clamped() {
        let channel = ProgressChannel::silent();
        let oversized = BoundingBox::new(0, 5, 0, 5, 0, 5);
        let mut grid = VoxelGrid::new(2, 2, 2, bitvec![1; 8], Some(oversized), &channel).unwrap();
        assert_eq!(*grid.bounding_box(), BoundingBox::full(2, 2, 2));

        grid.set_bounding_box(BoundingBox::new(-3, 1, 1, 9, 0, 0));
        assert_eq!(*grid.bounding_box(), BoundingBox::new(0, 1, 1, 1, 0, 0));
    }

    #[test]
    fn test_out_of_range_reads_are_false() {
        let grid = VoxelGrid::from_fn(3, 4, 5, |_, _, _| true).unwrap();
        for &(x, y, z) in &[(-1, 0, 0), (0, -1, 0), (0, 0, -1), (3, 0, 0), (0, 4, 0), (0, 0, 5)] {
            assert!(!grid.get_voxel(x, y, z), "({}, {}, {}) should read empty", x, y, z);
        }
        assert!(grid.get_voxel(2, 3, 4));
    }

    #[test]
    fn test_out_of_range_write_is_noop() {
        let mut grid = VoxelGrid::empty(2, 2, 2).unwrap();
        assert!(!grid.set_voxel(2, 0, 0, true));
        assert!(!grid.set_voxel(0, 0, -1, true));
        assert_eq!(grid.volume(), 0);
        assert!(grid.bounding_box().is_empty());
    }

    #[test]
    fn test_index_layout() {
        let grid = VoxelGrid::empty(4, 3, 2).unwrap();
        assert_eq!(grid.index(1, 2, 1), Some(12 + 2 * 4 + 1));
    }

    #[test]
    fn test_set_voxel_widens_box() {
        let mut grid = VoxelGrid::empty(4, 4, 4).unwrap();
        grid.set_voxel(1, 2, 3, true);
        assert_eq!(*grid.bounding_box(), BoundingBox::new(1, 1, 2, 2, 3, 3));
        grid.set_voxel(1, 2, 3, false);
        assert_eq!(grid.volume(), 0);
        // Clearing keeps a superset box until the next refresh
        assert!(!grid.bounding_box().is_empty());
        grid.refresh_bounding_box(&ProgressChannel::silent());
        assert!(grid.bounding_box().is_empty());
    }

    #[test]
    fn test_get_layer_zero_indexed() {
        let grid = VoxelGrid::from_fn(2, 2, 3, |_, _, z| z == 0).unwrap();
        assert_eq!(grid.get_layer(0).count_ones(), 4);
        assert_eq!(grid.get_layer(1).count_ones(), 0);
        assert_eq!(grid.get_layer(3).len(), 4);
        assert_eq!(grid.get_layer(-1).count_ones(), 0);
    }

    #[test]
    fn test_equality_ignores_box() {
        let a = VoxelGrid::from_fn(3, 3, 3, |x, _, _| x == 1).unwrap();
        let mut b = a.clone();
        b.set_bounding_box(BoundingBox::full(3, 3, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_into_bits_keeps_layout() {
        let grid = VoxelGrid::from_fn(3, 2, 2, |x, y, z| x == 2 && y == 1 && z == 1).unwrap();
        let index = grid.index(2, 1, 1).unwrap();
        let bits = grid.into_bits();
        assert_eq!(bits.len(), 12);
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![index]);
    }
}
