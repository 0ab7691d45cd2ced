//! Boolean constructive solid geometry on voxel grids.
//!
//! Binary operands must share the X/Y footprint; heights may differ. Voxels
//! above an operand's height read as empty for that operand.

use crate::core::{Error, ProgressChannel, Result, Task};
use crate::voxel::{Operand, Pattern, VoxelGrid};

impl VoxelGrid {
    /// Union. The output is as tall as the taller operand.
    ///
    /// Infinite patterns are rejected with `InvalidOperand`: bound them with
    /// an intersection first.
    pub fn boolean_add<'a>(
        &self,
        other: impl Into<Operand<'a>>,
        channel: &ProgressChannel,
    ) -> Result<VoxelGrid> {
        let task = channel.begin("booleanAdd", "boolean add start");
        let other = match other.into() {
            Operand::Grid(grid) => grid,
            Operand::Pattern(_) => {
                task.fail("do not use boolean add with infinite patterns!");
                return Err(Error::InvalidOperand(
                    "boolean add with an infinite pattern; cut part of it with intersect first".into(),
                ));
            }
        };
        let mut task = check_footprint(self, other, task)?;

        let (taller, shorter) = if self.size_z() >= other.size_z() {
            (self, other)
        } else {
            (other, self)
        };
        let min_z = shorter.size_z() as i32;
        let bounds = self
            .bounding_box()
            .merged(other.bounding_box())
            .clamped(self.size_x(), self.size_y(), taller.size_z());

        let mut out = VoxelGrid::blank(
            self.size_x(),
            self.size_y(),
            taller.size_z(),
            self.resolution_stack().clone(),
        );
        task.set_work(bounds.volume());
        for (x, y, z) in bounds.iter() {
            let value = if z < min_z {
                self.get_voxel(x, y, z) || other.get_voxel(x, y, z)
            } else {
                taller.get_voxel(x, y, z)
            };
            if value {
                out.set_voxel(x, y, z, true);
            }
            task.tick("combining (boolean add)...");
        }
        out.set_bounding_box(bounds);

        log::debug!("booleanAdd: {:?} + {:?} -> volume {}", self.dims(), other.dims(), out.volume());
        task.end("boolean add finished");
        Ok(out)
    }

    /// Intersection.
    ///
    /// Against a grid the output is as tall as the taller operand and empty at
    /// and above the shorter one's height. Against a pattern only this grid's
    /// bounding box is sampled.
    pub fn boolean_intersect<'a>(
        &self,
        other: impl Into<Operand<'a>>,
        channel: &ProgressChannel,
    ) -> Result<VoxelGrid> {
        let task = channel.begin("booleanIntersect", "boolean intersect start");
        let other = match other.into() {
            Operand::Pattern(pattern) => {
                let out = self.combine_with_pattern(pattern, task, "combining (boolean intersect)...", |a, p| a && p);
                return Ok(out);
            }
            Operand::Grid(grid) => grid,
        };
        let mut task = check_footprint(self, other, task)?;

        let out_z = self.size_z().max(other.size_z());
        let min_z = self.size_z().min(other.size_z()) as i32;
        let bounds = self
            .bounding_box()
            .intersection(other.bounding_box())
            .clamped(self.size_x(), self.size_y(), out_z);

        let mut out = VoxelGrid::blank(self.size_x(), self.size_y(), out_z, self.resolution_stack().clone());
        task.set_work(bounds.volume());
        for (x, y, z) in bounds.iter() {
            if z < min_z && self.get_voxel(x, y, z) && other.get_voxel(x, y, z) {
                out.set_voxel(x, y, z, true);
            }
            task.tick("combining (boolean intersect)...");
        }
        out.set_bounding_box(bounds);

        log::debug!("booleanIntersect: {:?} & {:?} -> volume {}", self.dims(), other.dims(), out.volume());
        task.end("boolean intersect finished");
        Ok(out)
    }

    /// Difference `self - other`. The result keeps this grid's bounding box.
    pub fn boolean_difference<'a>(
        &self,
        other: impl Into<Operand<'a>>,
        channel: &ProgressChannel,
    ) -> Result<VoxelGrid> {
        let task = channel.begin("booleanDifference", "boolean difference start");
        let other = match other.into() {
            Operand::Pattern(pattern) => {
                let out = self.combine_with_pattern(pattern, task, "combining (boolean difference)...", |a, p| a && !p);
                return Ok(out);
            }
            Operand::Grid(grid) => grid,
        };
        let mut task = check_footprint(self, other, task)?;

        let out_z = self.size_z().max(other.size_z());
        let min_z = self.size_z().min(other.size_z()) as i32;
        let self_is_taller = self.size_z() > other.size_z();
        let bounds = *self.bounding_box();

        let mut out = VoxelGrid::blank(self.size_x(), self.size_y(), out_z, self.resolution_stack().clone());
        task.set_work(bounds.volume());
        for (x, y, z) in bounds.iter() {
            let value = if z < min_z {
                self.get_voxel(x, y, z) && !other.get_voxel(x, y, z)
            } else {
                self_is_taller && self.get_voxel(x, y, z)
            };
            if value {
                out.set_voxel(x, y, z, true);
            }
            task.tick("combining (boolean difference)...");
        }
        out.set_bounding_box(bounds.clamped(self.size_x(), self.size_y(), out_z));

        log::debug!("booleanDifference: {:?} - {:?} -> volume {}", self.dims(), other.dims(), out.volume());
        task.end("boolean difference finished");
        Ok(out)
    }

    /// Bitwise complement of the whole buffer.
    ///
    /// The bounding box is carried over unchanged, so it no longer encloses
    /// the newly-true voxels outside it; refresh it if exact bounds matter.
    pub fn boolean_inversion(&self, channel: &ProgressChannel) -> VoxelGrid {
        let task = channel.begin("booleanInversion", "boolean inversion does not show progress, be patient");
        let (sx, sy, sz) = self.dims();
        let out = VoxelGrid::from_parts(
            sx,
            sy,
            sz,
            !self.bits().to_bitvec(),
            *self.bounding_box(),
            self.resolution_stack().clone(),
        );
        task.end("boolean inversion finished");
        out
    }

    /// Walk this grid's bounding box and keep `op(self, pattern)` per voxel.
    fn combine_with_pattern(
        &self,
        pattern: &Pattern,
        mut task: Task<'_>,
        message: &str,
        op: impl Fn(bool, bool) -> bool,
    ) -> VoxelGrid {
        let bounds = *self.bounding_box();
        let mut out = self.blank_like();
        task.set_work(bounds.volume());
        for (x, y, z) in bounds.iter() {
            if op(self.get_voxel(x, y, z), pattern.get_voxel(x, y, z)) {
                out.set_voxel(x, y, z, true);
            }
            task.tick(message);
        }
        out.set_bounding_box(bounds);
        task.end("combination with pattern finished");
        out
    }
}

/// Operands must share the X/Y footprint.
fn check_footprint<'c>(a: &VoxelGrid, b: &VoxelGrid, task: Task<'c>) -> Result<Task<'c>> {
    if a.size_x() != b.size_x() || a.size_y() != b.size_y() {
        task.fail("cubes have different profile!");
        return Err(Error::DimensionMismatch(format!(
            "cubes have different profile: {}x{} vs {}x{}",
            a.size_x(), a.size_y(), b.size_x(), b.size_y()
        )));
    }
    Ok(task)
}
