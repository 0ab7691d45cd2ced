//! Pyramid resampling: halve or double every dimension.
//!
//! `scale_down` records the pre-scale shape on the grid's
//! [`ResolutionStack`](crate::voxel::ResolutionStack) so a matching
//! `scale_up` lands on exactly the same dimensions and bounding box.

use crate::core::ProgressChannel;
use crate::math::BoundingBox;
use crate::voxel::{ResolutionSnapshot, VoxelGrid};

/// Child offsets of a 2x2x2 block, bit 0 = x, bit 1 = y, bit 2 = z.
const OCTANTS: [(i32, i32, i32); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (0, 1, 0),
    (1, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (0, 1, 1),
    (1, 1, 1),
];

impl VoxelGrid {
    /// Halve every dimension (floor, never below 1).
    ///
    /// Each output voxel samples its 2x2x2 input block: the low corner in
    /// nearest mode, the rounded mean of all 8 corners in smooth mode.
    pub fn scale_down(&self, smooth: bool, channel: &ProgressChannel) -> VoxelGrid {
        let mut task = channel.begin("scaleDown", "scale down start");
        let (sx, sy, sz) = self.dims();
        let (nx, ny, nz) = ((sx >> 1).max(1), (sy >> 1).max(1), (sz >> 1).max(1));
        let src = *self.bounding_box();

        let mut history = self.resolution_stack().clone();
        history.push(ResolutionSnapshot {
            size_x: sx,
            size_y: sy,
            size_z: sz,
            bounds: src,
        });
        let mut out = VoxelGrid::blank(nx, ny, nz, history);

        let bounds = BoundingBox::new(
            src.left >> 1,
            src.right >> 1,
            src.front >> 1,
            src.back >> 1,
            src.bottom >> 1,
            src.top >> 1,
        );
        let bounds = if src.is_empty() {
            BoundingBox::empty_for(nx, ny, nz)
        } else {
            bounds.clamped(nx, ny, nz)
        };

        task.set_work(bounds.volume());
        for (x, y, z) in bounds.iter() {
            let (bx, by, bz) = (x * 2, y * 2, z * 2);
            let value = if smooth {
                let solid = OCTANTS
                    .iter()
                    .filter(|(dx, dy, dz)| self.get_voxel(bx + dx, by + dy, bz + dz))
                    .count();
                solid >= 4
            } else {
                self.get_voxel(bx, by, bz)
            };
            if value {
                out.set_voxel(x, y, z, true);
            }
            task.tick("scaling down...");
        }
        out.set_bounding_box(bounds);

        log::trace!("scaleDown: {:?} -> {:?} (smooth={})", self.dims(), out.dims(), smooth);
        task.end("scaling down finished");
        out
    }

    /// Double every dimension, or restore the shape recorded by the matching
    /// `scale_down`. The box is the recorded one widened to cover every
    /// written child.
    ///
    /// Non-smooth mode replicates each voxel into its 2x2x2 block. Smooth mode
    /// classifies each child against the source voxel's face neighbours: a
    /// child keeps the source value only if the three neighbours facing its
    /// corner agree with it, otherwise it takes the opposite value. `additive`
    /// picks which polarity skips the classification and is replicated flat:
    /// with `additive` false voxels are copied flat (true regions get rounded
    /// corners), without it true voxels are copied flat (false regions do).
    pub fn scale_up(&self, smooth: bool, additive: bool, channel: &ProgressChannel) -> VoxelGrid {
        let mut task = channel.begin("scaleUp", "scale up start");
        let mut history = self.resolution_stack().clone();
        let (mut out, bounds) = match history.pop() {
            Some(snapshot) => (
                VoxelGrid::blank(snapshot.size_x, snapshot.size_y, snapshot.size_z, history),
                snapshot.bounds,
            ),
            None => {
                log::warn!("scaleUp: no resolution snapshot, doubling {:?}", self.dims());
                let (sx, sy, sz) = self.dims();
                let src = *self.bounding_box();
                let doubled = if src.is_empty() {
                    BoundingBox::empty_for(sx * 2, sy * 2, sz * 2)
                } else {
                    BoundingBox::new(
                        src.left * 2,
                        src.right * 2 + 1,
                        src.front * 2,
                        src.back * 2 + 1,
                        src.bottom * 2,
                        src.top * 2 + 1,
                    )
                };
                (VoxelGrid::blank(sx * 2, sy * 2, sz * 2, history), doubled)
            }
        };

        let src = *self.bounding_box();
        task.set_work(src.volume());
        for (x, y, z) in src.iter() {
            let value = self.get_voxel(x, y, z);
            let flat = !smooth || (additive && !value) || (!additive && value);
            if flat {
                if value {
                    for (dx, dy, dz) in OCTANTS {
                        out.set_voxel(x * 2 + dx, y * 2 + dy, z * 2 + dz, true);
                    }
                }
            } else {
                let top = self.get_voxel(x, y, z + 1) == value;
                let bottom = self.get_voxel(x, y, z - 1) == value;
                let north = self.get_voxel(x, y + 1, z) == value;
                let south = self.get_voxel(x, y - 1, z) == value;
                let east = self.get_voxel(x + 1, y, z) == value;
                let west = self.get_voxel(x - 1, y, z) == value;
                for (dx, dy, dz) in OCTANTS {
                    let agree = (if dz == 1 { top } else { bottom })
                        && (if dy == 1 { north } else { south })
                        && (if dx == 1 { east } else { west });
                    let child = if agree { value } else { !value };
                    if child {
                        out.set_voxel(x * 2 + dx, y * 2 + dy, z * 2 + dz, true);
                    }
                }
            }
            task.tick("scaling up...");
        }
        // Passes at the coarse level may have grown past the recorded box
        let grown = bounds.merged(out.bounding_box());
        out.set_bounding_box(grown);

        log::trace!("scaleUp: {:?} -> {:?} (smooth={}, additive={})", self.dims(), out.dims(), smooth, additive);
        task.end("scaling up finished");
        out
    }
}
