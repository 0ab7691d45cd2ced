//! Rigid transforms: translate, half-turn rotation, height changes.

use crate::core::{Error, ProgressChannel, Result};
use crate::math::BoundingBox;
use crate::voxel::VoxelGrid;

impl VoxelGrid {
    /// Shift every voxel by `(dx, dy, dz)` inside a grid of the same size.
    ///
    /// Voxels carried outside the grid are dropped. The box is the source
    /// box shifted and clamped, so it may be loose after clipping.
    pub fn translate(&self, dx: i32, dy: i32, dz: i32, channel: &ProgressChannel) -> VoxelGrid {
        let mut task = channel.begin("translate", "translate start");
        if dx == 0 && dy == 0 && dz == 0 {
            task.end("translation finished");
            return self.clone();
        }

        let src = *self.bounding_box();
        let mut out = self.blank_like();
        task.set_work(src.volume());
        for (x, y, z) in src.iter() {
            if self.get_voxel(x, y, z) {
                out.set_voxel(x + dx, y + dy, z + dz, true);
            }
            task.tick("translating...");
        }
        if !src.is_empty() {
            let (sx, sy, sz) = out.dims();
            out.set_bounding_box(src.translated(dx, dy, dz).clamped(sx, sy, sz));
        }

        task.end("translation finished");
        out
    }

    /// Rotate around the Z axis by `rotations` quarter turns.
    ///
    /// Only half turns exist: `rotations % 4 == 2` mirrors X and Y, `0` copies.
    /// Quarter turns fail with `NotImplemented`. `clockwise` is accepted for
    /// interface symmetry and does not affect half turns.
    pub fn rotate(&self, rotations: i32, clockwise: bool, channel: &ProgressChannel) -> Result<VoxelGrid> {
        let mut task = channel.begin("rotate", format!("rotation by {} quarter turns", rotations));
        match rotations.rem_euclid(4) {
            0 => {
                task.end("rotation finished");
                Ok(self.clone())
            }
            2 => {
                let (sx, sy, _) = self.dims();
                let (mx, my) = (sx as i32 - 1, sy as i32 - 1);
                let src = *self.bounding_box();
                let mut out = self.blank_like();

                task.set_work(src.volume());
                for (x, y, z) in src.iter() {
                    if self.get_voxel(x, y, z) {
                        out.set_voxel(mx - x, my - y, z, true);
                    }
                    task.tick("rotating...");
                }
                task.pending(90.0, "refreshing bounding box...");
                out.refresh_bounding_box(channel);
                task.end("rotation finished");
                Ok(out)
            }
            quarter => {
                let message = format!(
                    "rotation by {} quarter turn(s) {} is not supported",
                    quarter,
                    if clockwise { "clockwise" } else { "counter-clockwise" }
                );
                task.fail(message.clone());
                Err(Error::NotImplemented(message))
            }
        }
    }

    /// Resize the Z axis, keeping X and Y.
    ///
    /// The new height is `size_z + change` when `relative`, else `change`.
    /// Overlapping layers are copied; layers above a smaller height are lost.
    pub fn change_z(&self, change: i32, relative: bool, channel: &ProgressChannel) -> Result<VoxelGrid> {
        if relative && change == 0 {
            return Ok(self.clone());
        }
        let final_z = if relative { self.size_z() as i64 + change as i64 } else { change as i64 };
        let mut task = channel.begin("changeZ", format!("new height is {}", final_z));
        if final_z <= 0 {
            let message = format!("height must stay positive, got {}", final_z);
            task.fail(message.clone());
            return Err(Error::InvalidParameter(message));
        }

        let (sx, sy, _) = self.dims();
        let mut out = VoxelGrid::blank(sx, sy, final_z as usize, self.resolution_stack().clone());
        let src = *self.bounding_box();
        task.set_work(src.volume());
        for (x, y, z) in src.iter() {
            if self.get_voxel(x, y, z) {
                out.set_voxel(x, y, z, true);
            }
            task.tick("changeZ in progress...");
        }
        out.refresh_bounding_box(channel);

        log::debug!("changeZ: {:?} -> {:?}", self.dims(), out.dims());
        task.end("changeZ finished...");
        Ok(out)
    }

    /// Grow the grid by `before[k]` voxels at the low end and `after[k]` at the
    /// high end of each axis. Content shifts by `before`.
    pub(crate) fn padded(&self, before: [usize; 3], after: [usize; 3], channel: &ProgressChannel) -> VoxelGrid {
        let mut task = channel.begin("pad", "growing grid...");
        let (sx, sy, sz) = self.dims();
        let (nx, ny, nz) = (
            sx + before[0] + after[0],
            sy + before[1] + after[1],
            sz + before[2] + after[2],
        );
        let (ox, oy, oz) = (before[0] as i32, before[1] as i32, before[2] as i32);

        let src = *self.bounding_box();
        let mut out = VoxelGrid::blank(nx, ny, nz, self.resolution_stack().clone());
        task.set_work(src.volume());
        for (x, y, z) in src.iter() {
            if self.get_voxel(x, y, z) {
                out.set_voxel(x + ox, y + oy, z + oz, true);
            }
            task.tick("copying...");
        }
        out.set_bounding_box(if src.is_empty() {
            BoundingBox::empty_for(nx, ny, nz)
        } else {
            src.translated(ox, oy, oz)
        });

        task.end("grid grown");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordingSink;
    use std::sync::Arc;

    fn asymmetric() -> VoxelGrid {
        VoxelGrid::from_fn(5, 4, 3, |x, y, z| (x == 0 && y < 3) || (x == 3 && y == 1 && z == 2)).unwrap()
    }

    #[test]
    fn test_translate_moves_voxels() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(3, 3, 3, |x, y, z| x == 0 && y == 0 && z == 1).unwrap();
        let moved = grid.translate(1, 2, -1, &channel);
        assert_eq!(moved.volume(), 1);
        assert!(moved.get_voxel(1, 2, 0));
        assert_eq!(*moved.bounding_box(), BoundingBox::new(1, 1, 2, 2, 0, 0));
    }

    #[test]
    fn test_translate_drops_out_of_range() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(4, 1, 1, |x, _, _| x >= 2).unwrap();
        let moved = grid.translate(1, 0, 0, &channel);
        assert_eq!(moved.volume(), 1);
        assert!(moved.get_voxel(3, 0, 0));
        assert_eq!(*moved.bounding_box(), BoundingBox::new(3, 3, 0, 0, 0, 0));
    }

    #[test]
    fn test_translate_zero_is_copy() {
        let channel = ProgressChannel::silent();
        let grid = asymmetric();
        assert_eq!(grid.translate(0, 0, 0, &channel), grid);
    }

    #[test]
    fn test_rotate_half_turn_mirrors_xy() {
        let channel = ProgressChannel::silent();
        let grid = asymmetric();
        let rotated = grid.rotate(2, true, &channel).unwrap();
        assert_eq!(rotated.volume(), grid.volume());
        assert!(rotated.get_voxel(4, 3, 0));
        assert!(rotated.get_voxel(1, 2, 2));
        assert!(!rotated.get_voxel(0, 0, 0));
        assert_eq!(*rotated.bounding_box(), BoundingBox::new(1, 4, 1, 3, 0, 2));
    }

    #[test]
    fn test_rotate_twice_is_identity() {
        let channel = ProgressChannel::silent();
        let grid = asymmetric();
        let back = grid
            .rotate(2, false, &channel)
            .and_then(|g| g.rotate(-2, false, &channel))
            .unwrap();
        assert_eq!(back, grid);
        assert_eq!(back.bounding_box(), grid.bounding_box());
    }

    #[test]
    fn test_rotate_identity_and_quarter_turns() {
        let channel = ProgressChannel::silent();
        let grid = asymmetric();
        assert_eq!(grid.rotate(4, true, &channel).unwrap(), grid);
        assert!(matches!(grid.rotate(1, true, &channel), Err(Error::NotImplemented(_))));
        assert!(matches!(grid.rotate(-1, false, &channel), Err(Error::NotImplemented(_))));
    }

    #[test]
    fn test_rotate_failure_emits_error_event() {
        let sink = Arc::new(RecordingSink::new());
        let channel = ProgressChannel::new(sink.clone());
        let _ = asymmetric().rotate(3, true, &channel);
        let events = sink.events_for("rotate");
        assert_eq!(events.last().map(|e| e.state), Some(crate::core::ProgressState::Error));
    }

    #[test]
    fn test_change_z_grow_and_shrink() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(2, 2, 3, |_, _, z| z != 1).unwrap();

        let taller = grid.change_z(2, true, &channel).unwrap();
        assert_eq!(taller.dims(), (2, 2, 5));
        assert_eq!(taller.volume(), grid.volume());
        assert_eq!(taller.bounding_box().top, 2);

        let shorter = grid.change_z(1, false, &channel).unwrap();
        assert_eq!(shorter.dims(), (2, 2, 1));
        assert_eq!(shorter.volume(), 4);
        assert_eq!(shorter.bounding_box().top, 0);
    }

    #[test]
    fn test_change_z_rejects_non_positive_height() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::empty(2, 2, 3).unwrap();
        assert!(matches!(grid.change_z(-3, true, &channel), Err(Error::InvalidParameter(_))));
        assert!(matches!(grid.change_z(0, false, &channel), Err(Error::InvalidParameter(_))));
        assert_eq!(grid.change_z(0, true, &channel).unwrap().dims(), (2, 2, 3));
    }

    #[test]
    fn test_padded_shifts_content() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(2, 2, 2, |x, y, z| x == 1 && y == 0 && z == 0).unwrap();
        let grown = grid.padded([0, 1, 2], [1, 0, 0], &channel);
        assert_eq!(grown.dims(), (3, 3, 4));
        assert!(grown.get_voxel(1, 1, 2));
        assert_eq!(*grown.bounding_box(), BoundingBox::new(1, 1, 1, 1, 2, 2));
    }
}
