//! Inclusive integer bounding box of true voxels

use serde::{Deserialize, Serialize};

/// Inclusive voxel-space bounds: `left..=right` on X, `front..=back` on Y,
/// `bottom..=top` on Z.
///
/// An inverted range on any axis (e.g. `left > right`) means "no true
/// voxels". The canonical empty box for a grid is produced by
/// [`BoundingBox::empty_for`]. On an axis of size 1 the canonical empty range
/// collapses to `0..=0`, which then reads as a (loose) superset box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub right: i32,
    pub front: i32,
    pub back: i32,
    pub bottom: i32,
    pub top: i32,
}

impl BoundingBox {
    pub fn new(left: i32, right: i32, front: i32, back: i32, bottom: i32, top: i32) -> Self {
        Self { left, right, front, back, bottom, top }
    }

    /// Canonical "nothing found yet" box for a grid of the given size.
    pub fn empty_for(size_x: usize, size_y: usize, size_z: usize) -> Self {
        Self {
            left: size_x as i32 - 1,
            right: 0,
            front: size_y as i32 - 1,
            back: 0,
            bottom: size_z as i32 - 1,
            top: 0,
        }
    }

    /// Box covering the whole grid.
    pub fn full(size_x: usize, size_y: usize, size_z: usize) -> Self {
        Self {
            left: 0,
            right: size_x as i32 - 1,
            front: 0,
            back: size_y as i32 - 1,
            bottom: 0,
            top: size_z as i32 - 1,
        }
    }

    /// True if any axis range is inverted.
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.front > self.back || self.bottom > self.top
    }

    /// Number of cells enclosed (0 for an empty box).
    pub fn volume(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (self.right - self.left + 1) as u64
            * (self.back - self.front + 1) as u64
            * (self.top - self.bottom + 1) as u64
    }

    /// Whether the coordinate lies inside the box. Always false when empty.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= self.left && x <= self.right &&
        y >= self.front && y <= self.back &&
        z >= self.bottom && z <= self.top
    }

    /// Tighten the box so it encloses the given voxel.
    ///
    /// Works directly on the inverted empty convention: each bound only moves
    /// outward relative to the coordinate.
    pub fn include(&mut self, x: i32, y: i32, z: i32) {
        self.left = self.left.min(x);
        self.right = self.right.max(x);
        self.front = self.front.min(y);
        self.back = self.back.max(y);
        self.bottom = self.bottom.min(z);
        self.top = self.top.max(z);
    }

    /// Coordinate-wise min/max combination (enclosing box).
    pub fn merged(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            right: self.right.max(other.right),
            front: self.front.min(other.front),
            back: self.back.max(other.back),
            bottom: self.bottom.min(other.bottom),
            top: self.top.max(other.top),
        }
    }

    /// Coordinate-wise max/min combination (overlap box, possibly inverted).
    pub fn intersection(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.max(other.left),
            right: self.right.min(other.right),
            front: self.front.max(other.front),
            back: self.back.min(other.back),
            bottom: self.bottom.max(other.bottom),
            top: self.top.min(other.top),
        }
    }

    /// Shift every bound by the given offset.
    pub fn translated(&self, dx: i32, dy: i32, dz: i32) -> BoundingBox {
        BoundingBox {
            left: self.left + dx,
            right: self.right + dx,
            front: self.front + dy,
            back: self.back + dy,
            bottom: self.bottom + dz,
            top: self.top + dz,
        }
    }

    /// Grow every bound outward by `r` voxels.
    pub fn expanded(&self, r: i32) -> BoundingBox {
        BoundingBox {
            left: self.left - r,
            right: self.right + r,
            front: self.front - r,
            back: self.back + r,
            bottom: self.bottom - r,
            top: self.top + r,
        }
    }

    /// Clamp to the valid coordinate range of a grid. An empty result is
    /// returned in canonical form.
    pub fn clamped(&self, size_x: usize, size_y: usize, size_z: usize) -> BoundingBox {
        let clamped = BoundingBox {
            left: self.left.max(0),
            right: self.right.min(size_x as i32 - 1),
            front: self.front.max(0),
            back: self.back.min(size_y as i32 - 1),
            bottom: self.bottom.max(0),
            top: self.top.min(size_z as i32 - 1),
        };
        if clamped.is_empty() {
            BoundingBox::empty_for(size_x, size_y, size_z)
        } else {
            clamped
        }
    }

    /// Iterate every coordinate inside the box, X fastest, then Y, then Z.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, i32)> + use<> {
        let b = *self;
        (b.bottom..=b.top).flat_map(move |z| {
            (b.front..=b.back).flat_map(move |y| (b.left..=b.right).map(move |x| (x, y, z)))
        })
    }
}
