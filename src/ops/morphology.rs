//! Erosion and dilation with a 6-connected structuring element.
//!
//! `r` repeated single-voxel passes approximate a radius-`r` Manhattan ball.
//! Each pass reads a stable snapshot and writes a fresh grid, which becomes
//! the next pass's input. With `scale > 0` the passes run on a coarser pyramid
//! level, trading fidelity for roughly `8^scale` less work.

use crate::core::{MorphologyOptions, ProgressChannel, Task};
use crate::voxel::VoxelGrid;

/// Face neighbour offsets grouped by axis.
const X_NEIGHBOURS: [(i32, i32, i32); 2] = [(-1, 0, 0), (1, 0, 0)];
const Y_NEIGHBOURS: [(i32, i32, i32); 2] = [(0, -1, 0), (0, 1, 0)];
const Z_NEIGHBOURS: [(i32, i32, i32); 2] = [(0, 0, -1), (0, 0, 1)];

impl VoxelGrid {
    /// Isotropic erosion: a true voxel survives a pass only if all six face
    /// neighbours are true. Voxels on the grid boundary always erode.
    pub fn erode(&self, radius: u32, scale: u32, smooth: bool, channel: &ProgressChannel) -> VoxelGrid {
        self.erode_axes("erode", [radius; 3], scale, smooth, channel)
    }

    /// Anisotropic erosion. At pass `i` an axis constrains the result only
    /// while its radius exceeds `i`, so each axis shrinks at its own rate.
    pub fn erode_directional(
        &self,
        rx: u32,
        ry: u32,
        rz: u32,
        scale: u32,
        smooth: bool,
        channel: &ProgressChannel,
    ) -> VoxelGrid {
        self.erode_axes("erodeDirectional", [rx, ry, rz], scale, smooth, channel)
    }

    /// Dilation: a voxel becomes true if it or any face neighbour is true.
    pub fn dilate(&self, radius: u32, scale: u32, smooth: bool, channel: &ProgressChannel) -> VoxelGrid {
        let mut task = channel.begin("dilate", "dilate starts...");
        let mut work = self.descend(scale, smooth, &task, channel);

        for i in 0..radius {
            task.pending(cycle_percent(i, radius), "cycles...");
            let mut cycle = channel.begin("dilateCycle", format!("dilate cycle no.{}", i + 1));
            work = dilate_pass(&work, &mut cycle);
            cycle.end(format!("dilate cycle no.{}", i + 1));
        }

        let out = ascend(work, scale, smooth, true, &mut task, channel);
        log::debug!(
            "dilate: r={} scale={} on {:?}: volume {} -> {}",
            radius, scale, self.dims(), self.volume(), out.volume()
        );
        task.end("dilate finished...");
        out
    }

    /// `erode` driven by a parameter block.
    pub fn erode_with(&self, options: &MorphologyOptions, channel: &ProgressChannel) -> VoxelGrid {
        self.erode(options.radius, options.scale, options.smooth, channel)
    }

    /// `dilate` driven by a parameter block.
    pub fn dilate_with(&self, options: &MorphologyOptions, channel: &ProgressChannel) -> VoxelGrid {
        self.dilate(options.radius, options.scale, options.smooth, channel)
    }

    fn erode_axes(
        &self,
        method: &'static str,
        radii: [u32; 3],
        scale: u32,
        smooth: bool,
        channel: &ProgressChannel,
    ) -> VoxelGrid {
        let mut task = channel.begin(method, "erosion starts...");
        let passes = radii.iter().copied().max().unwrap_or(0);
        let mut work = self.descend(scale, smooth, &task, channel);

        for i in 0..passes {
            task.pending(cycle_percent(i, passes), "cycles...");
            let axes = [radii[0] > i, radii[1] > i, radii[2] > i];
            let mut cycle = channel.begin("erodeCycle", format!("erode cycle no.{}", i + 1));
            work = erode_pass(&work, axes, &mut cycle);
            cycle.end(format!("erode cycle no.{}", i + 1));
        }

        let out = ascend(work, scale, smooth, false, &mut task, channel);
        log::debug!(
            "{}: r={:?} scale={} on {:?}: volume {} -> {}",
            method, radii, scale, self.dims(), self.volume(), out.volume()
        );
        task.end("erode finished...");
        out
    }

    /// Working copy at pyramid level `scale`.
    fn descend(&self, scale: u32, smooth: bool, task: &Task<'_>, channel: &ProgressChannel) -> VoxelGrid {
        let mut work = self.clone();
        for _ in 0..scale {
            task.pending(10.0, "scaling down...");
            work = work.scale_down(smooth, channel);
        }
        work
    }
}

/// Undo `scale` pyramid levels and recompute exact bounds.
fn ascend(
    mut work: VoxelGrid,
    scale: u32,
    smooth: bool,
    additive: bool,
    task: &mut Task<'_>,
    channel: &ProgressChannel,
) -> VoxelGrid {
    if scale == 0 {
        return work;
    }
    for _ in 0..scale {
        task.pending(90.0, "scaling up...");
        work = work.scale_up(smooth, additive, channel);
    }
    // Restored snapshot boxes stay loose after erosion
    work.refresh_bounding_box(channel);
    work
}

fn cycle_percent(i: u32, total: u32) -> f32 {
    (i as f32 / total as f32 * 80.0).round() + 10.0
}

/// One erosion pass. `axes[k]` enables the neighbour constraint on axis k.
fn erode_pass(src: &VoxelGrid, axes: [bool; 3], task: &mut Task<'_>) -> VoxelGrid {
    let bounds = *src.bounding_box();
    let mut next = src.blank_like();
    let groups = [X_NEIGHBOURS, Y_NEIGHBOURS, Z_NEIGHBOURS];

    task.set_work(bounds.volume());
    for (x, y, z) in bounds.iter() {
        let inside = src.get_voxel(x, y, z)
            && groups.iter().zip(axes).all(|(group, active)| {
                !active || group.iter().all(|(dx, dy, dz)| src.get_voxel(x + dx, y + dy, z + dz))
            });
        if inside {
            next.set_voxel(x, y, z, true);
        }
        task.tick("eroding...");
    }
    next
}

/// One dilation pass over the source box grown by one voxel.
fn dilate_pass(src: &VoxelGrid, task: &mut Task<'_>) -> VoxelGrid {
    let mut next = src.blank_like();
    if src.bounding_box().is_empty() {
        return next;
    }
    let (sx, sy, sz) = src.dims();
    let bounds = src.bounding_box().expanded(1).clamped(sx, sy, sz);
    let groups = [X_NEIGHBOURS, Y_NEIGHBOURS, Z_NEIGHBOURS];

    task.set_work(bounds.volume());
    for (x, y, z) in bounds.iter() {
        let grown = src.get_voxel(x, y, z)
            || groups
                .iter()
                .flatten()
                .any(|(dx, dy, dz)| src.get_voxel(x + dx, y + dy, z + dz));
        if grown {
            next.set_voxel(x, y, z, true);
        }
        task.tick("dilating...");
    }
    next
}
