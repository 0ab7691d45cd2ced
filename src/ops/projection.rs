//! Axis-aligned height maps.
//!
//! `projection` ray-marches every column of one bounding-box face and turns
//! the first hit into a grayscale depth value. `vertical_map` and
//! `projection_map` run the other way: they read such a map and grow or carve
//! the surface column by column.
//!
//! Pixel addressing is shared by all three operations. For a direction with
//! width axis `w` and height axis `h`, the pixel of column `(w, h)` sits at
//! `row * width + col`, where `row = h` for top/bottom views and
//! `row = height - 1 - h` for side views (so +Z is the top row), and
//! `col = w`, mirrored to `width - 1 - w` for the inverted directions.

use serde::{Deserialize, Serialize};

use crate::core::{Error, ProgressChannel, Result};
use crate::math::BoundingBox;
use crate::voxel::VoxelGrid;

/// Viewing direction. The first word names the side the viewer stands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Looking down -Z
    TopBottom,
    /// Looking up +Z
    BottomTop,
    /// Looking along -X
    LeftRight,
    /// Looking along +X
    RightLeft,
    /// Looking along -Y
    FrontBack,
    /// Looking along +Y
    BackFront,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::TopBottom,
        Direction::BottomTop,
        Direction::LeftRight,
        Direction::RightLeft,
        Direction::FrontBack,
        Direction::BackFront,
    ];

    /// Inverted directions march from the low end of the depth axis.
    pub fn is_inverted(self) -> bool {
        matches!(self, Direction::BottomTop | Direction::RightLeft | Direction::BackFront)
    }

    /// `(width, height, depth)` axes as indices into `(x, y, z)`.
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Direction::TopBottom | Direction::BottomTop => (0, 1, 2),
            Direction::LeftRight | Direction::RightLeft => (1, 2, 0),
            Direction::FrontBack | Direction::BackFront => (0, 2, 1),
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Direction::TopBottom | Direction::BottomTop)
    }

    /// Grid coordinate of `(w, h, d)`.
    fn point(self, w: i32, h: i32, d: i32) -> (i32, i32, i32) {
        match self.axes() {
            (0, 1, _) => (w, h, d),
            (1, 2, _) => (d, w, h),
            _ => (w, d, h),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Direction::TopBottom => "topBottom",
            Direction::BottomTop => "bottomTop",
            Direction::LeftRight => "leftRight",
            Direction::RightLeft => "rightLeft",
            Direction::FrontBack => "frontBack",
            Direction::BackFront => "backFront",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Row-major 8-bit grayscale image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightMap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl HeightMap {
    /// All-zero map.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0; width * height] }
    }

    /// Map filled with one value.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self { width, height, pixels: vec![value; width * height] }
    }

    pub fn get(&self, col: usize, row: usize) -> u8 {
        self.pixels[row * self.width + col]
    }

    /// Pixel index of column `(w, h)` viewed from `direction`.
    fn index_of(&self, direction: Direction, w: i32, h: i32) -> usize {
        let col = if direction.is_inverted() { self.width as i32 - 1 - w } else { w };
        let row = if direction.is_vertical() { h } else { self.height as i32 - 1 - h };
        row as usize * self.width + col as usize
    }
}

fn axis_range(bounds: &BoundingBox, axis: usize) -> (i32, i32) {
    match axis {
        0 => (bounds.left, bounds.right),
        1 => (bounds.front, bounds.back),
        _ => (bounds.bottom, bounds.top),
    }
}

fn dims_array(grid: &VoxelGrid) -> [usize; 3] {
    let (sx, sy, sz) = grid.dims();
    [sx, sy, sz]
}

impl VoxelGrid {
    /// Depth image of the surface seen from `direction`.
    ///
    /// Only columns inside the bounding box are marched, within the box's
    /// depth range. Hits are scaled so the box face nearest the viewer maps
    /// to 255 and the far face to 0; when the box is one voxel deep every hit
    /// is 255. Columns without a hit stay 0.
    pub fn projection(&self, direction: Direction, channel: &ProgressChannel) -> HeightMap {
        let mut task = channel.begin("projection", format!("started projection in direction {}", direction));
        let dims = dims_array(self);
        let (wa, ha, da) = direction.axes();
        let mut map = HeightMap::new(dims[wa], dims[ha]);

        let bounds = *self.bounding_box();
        if bounds.is_empty() {
            task.end("projection generated");
            return map;
        }
        let (min_w, max_w) = axis_range(&bounds, wa);
        let (min_h, max_h) = axis_range(&bounds, ha);
        let (min_d, max_d) = axis_range(&bounds, da);
        let span = (max_d - min_d) as f32;
        let inverted = direction.is_inverted();

        task.set_work(((max_w - min_w + 1) as u64) * ((max_h - min_h + 1) as u64));
        for h in min_h..=max_h {
            for w in min_w..=max_w {
                let hit = if inverted {
                    (min_d..=max_d).find(|&d| self.probe(direction, w, h, d))
                } else {
                    (min_d..=max_d).rev().find(|&d| self.probe(direction, w, h, d))
                };
                if let Some(d) = hit {
                    let value = if span == 0.0 {
                        255
                    } else {
                        let scaled = ((d - min_d) as f32 / span * 255.0).round() as u8;
                        if inverted { 255 - scaled } else { scaled }
                    };
                    let index = map.index_of(direction, w, h);
                    map.pixels[index] = value;
                }
                task.tick("generating projection");
            }
        }

        log::debug!("projection {}: {}x{} from {:?}", direction, map.width, map.height, self.dims());
        task.end("projection generated");
        map
    }

    /// Apply a top-down height map: every column grows above (or is carved
    /// below) its topmost voxel by `round(v / 255 * (max_z - min_z)) + min_z`.
    ///
    /// The grid first gains `max_z` layers of headroom. The map must be
    /// `size_x` by `size_y`.
    pub fn vertical_map(
        &self,
        map: &HeightMap,
        max_z: i32,
        min_z: i32,
        in_box: bool,
        channel: &ProgressChannel,
    ) -> Result<VoxelGrid> {
        self.apply_map("verticalMap", map, max_z, min_z, Direction::TopBottom, in_box, channel)
    }

    /// Apply a height map seen from any direction.
    ///
    /// Thickness is `round(v / 255 * (max_c - min_c)) + min_c`. Positive
    /// values add that many voxels beyond the surface toward the viewer,
    /// negative values remove that many from the surface inward. A column
    /// with no surface grows from the far face. The grid first gains `max_c`
    /// voxels of headroom on the viewer's side of the depth axis.
    ///
    /// With `in_box` only columns inside the bounding box are visited.
    pub fn projection_map(
        &self,
        map: &HeightMap,
        max_c: i32,
        min_c: i32,
        direction: Direction,
        in_box: bool,
        channel: &ProgressChannel,
    ) -> Result<VoxelGrid> {
        self.apply_map("projectionMap", map, max_c, min_c, direction, in_box, channel)
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_map(
        &self,
        method: &'static str,
        map: &HeightMap,
        max_c: i32,
        min_c: i32,
        direction: Direction,
        in_box: bool,
        channel: &ProgressChannel,
    ) -> Result<VoxelGrid> {
        let mut task = channel.begin(method, format!("{} started in direction {}", method, direction));
        let dims = dims_array(self);
        let (wa, ha, da) = direction.axes();

        if map.width != dims[wa] || map.height != dims[ha] || map.pixels.len() != map.width * map.height {
            let message = format!(
                "map is {}x{} ({} pixels), {} face is {}x{}",
                map.width, map.height, map.pixels.len(), direction, dims[wa], dims[ha]
            );
            task.fail(message.clone());
            return Err(Error::DimensionMismatch(message));
        }
        if max_c < min_c {
            let message = format!("max {} is below min {}", max_c, min_c);
            task.fail(message.clone());
            return Err(Error::InvalidParameter(message));
        }

        let inverted = direction.is_inverted();
        let headroom = max_c.max(0) as usize;
        let mut pad = [0usize; 3];
        pad[da] = headroom;
        let base = if inverted {
            self.padded(pad, [0; 3], channel)
        } else {
            self.padded([0; 3], pad, channel)
        };
        task.pending(10.0, "size increased...");

        let depth = dims_array(&base)[da] as i32;
        let bounds = *self.bounding_box();
        let (w_range, h_range) = if in_box && !bounds.is_empty() {
            (axis_range(&bounds, wa), axis_range(&bounds, ha))
        } else if in_box {
            ((0, -1), (0, -1))
        } else {
            ((0, dims[wa] as i32 - 1), (0, dims[ha] as i32 - 1))
        };
        let on_face = |(lo, hi): (i32, i32), size: usize| (lo.max(0), hi.min(size as i32 - 1));
        let (w_range, h_range) = (on_face(w_range, dims[wa]), on_face(h_range, dims[ha]));

        let factor = (max_c - min_c) as f32;
        let step = if inverted { -1 } else { 1 };
        let mut out = base.clone();

        let columns = (w_range.1 - w_range.0 + 1).max(0) as u64 * (h_range.1 - h_range.0 + 1).max(0) as u64;
        task.set_work(columns);
        for h in h_range.0..=h_range.1 {
            for w in w_range.0..=w_range.1 {
                let value = map.pixels[map.index_of(direction, w, h)];
                let thickness = (value as f32 / 255.0 * factor).round() as i32 + min_c;
                if thickness != 0 {
                    carve_column(&base, &mut out, direction, w, h, depth, step, thickness);
                }
                task.tick("applying map projection...");
            }
        }
        out.refresh_bounding_box(channel);

        log::debug!(
            "{} {}: {:?} -> {:?}, volume {} -> {}",
            method, direction, self.dims(), out.dims(), self.volume(), out.volume()
        );
        task.end(format!("{} applied...", method));
        Ok(out)
    }

    #[inline]
    fn probe(&self, direction: Direction, w: i32, h: i32, d: i32) -> bool {
        let (x, y, z) = direction.point(w, h, d);
        self.get_voxel(x, y, z)
    }
}

/// Edit one column of `out`, locating the surface in `base`. `step` points
/// from the surface toward the viewer.
#[allow(clippy::too_many_arguments)]
fn carve_column(
    base: &VoxelGrid,
    out: &mut VoxelGrid,
    direction: Direction,
    w: i32,
    h: i32,
    depth: i32,
    step: i32,
    thickness: i32,
) {
    let surface = if step > 0 {
        (0..depth).rev().find(|&d| base.probe(direction, w, h, d))
    } else {
        (0..depth).find(|&d| base.probe(direction, w, h, d))
    };

    if thickness > 0 {
        // Without a surface, growth starts just outside the far face
        let start = surface.unwrap_or(if step > 0 { -1 } else { depth });
        for i in 1..=thickness {
            let (x, y, z) = direction.point(w, h, start + i * step);
            out.set_voxel(x, y, z, true);
        }
    } else if let Some(start) = surface {
        for i in 0..-thickness {
            let (x, y, z) = direction.point(w, h, start - i * step);
            out.set_voxel(x, y, z, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::vec::BitVec;

    #[test]
    fn test_single_voxel_column_is_bright() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(1, 1, 5, |_, _, z| z == 2).unwrap();
        assert_eq!(grid.bounding_box().bottom, 2);
        assert_eq!(grid.bounding_box().top, 2);
        let map = grid.projection(Direction::TopBottom, &channel);
        assert_eq!((map.width, map.height), (1, 1));
        assert_eq!(map.pixels, vec![255]);
    }

    #[test]
    fn test_projection_staircase_both_ways() {
        let channel = ProgressChannel::silent();
        // One voxel per column at height x
        let grid = VoxelGrid::from_fn(3, 1, 3, |x, _, z| x == z).unwrap();

        let down = grid.projection(Direction::TopBottom, &channel);
        assert_eq!(down.pixels, vec![0, 128, 255]);

        // Seen from below the lowest voxel is brightest, columns mirrored
        let up = grid.projection(Direction::BottomTop, &channel);
        assert_eq!(up.pixels, vec![0, 127, 255]);
    }

    #[test]
    fn test_projection_side_view_rows() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(3, 1, 2, |x, _, z| (x == 2 && z == 1) || (x == 0 && z == 0)).unwrap();
        let side = grid.projection(Direction::LeftRight, &channel);
        assert_eq!((side.width, side.height), (1, 2));
        // Top row is z = 1
        assert_eq!(side.pixels, vec![255, 0]);
    }

    #[test]
    fn test_projection_misses_are_zero() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(2, 2, 3, |x, y, z| x == 1 && y == 1 && z < 2).unwrap();
        let map = grid.projection(Direction::FrontBack, &channel);
        assert_eq!((map.width, map.height), (2, 3));
        assert_eq!(map.get(1, 1), 255);
        assert_eq!(map.get(1, 2), 255);
        assert_eq!(map.get(0, 1), 0);
        assert_eq!(map.get(1, 0), 0);

        let empty = VoxelGrid::empty(2, 2, 2).unwrap();
        for direction in Direction::ALL {
            assert!(empty.projection(direction, &channel).pixels.iter().all(|&p| p == 0));
        }
    }

    #[test]
    fn test_vertical_map_grows_columns() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(2, 1, 2, |_, _, z| z == 0).unwrap();
        let map = HeightMap { width: 2, height: 1, pixels: vec![255, 0] };
        let out = grid.vertical_map(&map, 2, 0, true, &channel).unwrap();
        assert_eq!(out.dims(), (2, 1, 4));
        assert_eq!(out.volume(), 4);
        assert!(out.get_voxel(0, 0, 2));
        assert!(!out.get_voxel(0, 0, 3));
        assert!(!out.get_voxel(1, 0, 1));
        assert_eq!(out.bounding_box().top, 2);
    }

    #[test]
    fn test_vertical_map_carves_with_negative_min() {
        let channel = ProgressChannel::silent();
        let column = VoxelGrid::from_fn(1, 1, 3, |_, _, _| true).unwrap();

        let carved = column.vertical_map(&HeightMap::filled(1, 1, 0), 1, -1, true, &channel).unwrap();
        assert_eq!(carved.volume(), 2);
        assert!(!carved.get_voxel(0, 0, 2));

        let raised = column.vertical_map(&HeightMap::filled(1, 1, 255), 1, -1, true, &channel).unwrap();
        assert_eq!(raised.volume(), 4);
        assert!(raised.get_voxel(0, 0, 3));
    }

    #[test]
    fn test_projection_map_from_below() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(1, 1, 2, |_, _, z| z == 0).unwrap();
        let out = grid
            .projection_map(&HeightMap::filled(1, 1, 255), 2, 0, Direction::BottomTop, true, &channel)
            .unwrap();
        // Headroom is added below, shifting the original voxel up
        assert_eq!(out.dims(), (1, 1, 4));
        assert_eq!(out.volume(), 3);
        assert!(out.get_voxel(0, 0, 0));
        assert!(out.get_voxel(0, 0, 2));
        assert!(!out.get_voxel(0, 0, 3));
    }

    #[test]
    fn test_projection_map_side_keeps_footprint() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(2, 2, 1, |x, _, _| x == 0).unwrap();
        let map = HeightMap::filled(2, 1, 255);
        let out = grid.projection_map(&map, 1, 0, Direction::LeftRight, false, &channel).unwrap();
        assert_eq!(out.dims(), (3, 2, 1));
        assert_eq!(out.volume(), 4);
        assert!(out.get_voxel(1, 0, 0));
        assert!(out.get_voxel(1, 1, 0));
    }

    #[test]
    fn test_map_without_surface_grows_from_far_face() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::empty(1, 1, 2).unwrap();
        let out = grid
            .projection_map(&HeightMap::filled(1, 1, 255), 1, 0, Direction::TopBottom, false, &channel)
            .unwrap();
        assert_eq!(out.volume(), 1);
        assert!(out.get_voxel(0, 0, 0));
    }

    #[test]
    fn test_map_with_oversized_supplied_box() {
        let channel = ProgressChannel::silent();
        let oversized = BoundingBox::new(0, 5, 0, 5, 0, 5);
        let grid = VoxelGrid::new(2, 2, 2, BitVec::repeat(true, 8), Some(oversized), &channel).unwrap();
        let out = grid.vertical_map(&HeightMap::filled(2, 2, 255), 1, 0, true, &channel).unwrap();
        assert_eq!(out.dims(), (2, 2, 3));
        assert_eq!(out.volume(), 12);
    }

    #[test]
    fn test_map_validation() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::empty(2, 2, 2).unwrap();
        let wrong = HeightMap::new(3, 2);
        assert!(matches!(
            grid.vertical_map(&wrong, 1, 0, true, &channel),
            Err(Error::DimensionMismatch(_))
        ));
        let ok = HeightMap::new(2, 2);
        assert!(matches!(
            grid.projection_map(&ok, 0, 1, Direction::TopBottom, true, &channel),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_direction_serde_names() {
        let json = serde_json::to_string(&Direction::BackFront).unwrap();
        assert_eq!(json, "\"backFront\"");
        let parsed: Direction = serde_json::from_str("\"rightLeft\"").unwrap();
        assert_eq!(parsed, Direction::RightLeft);
        assert_eq!(Direction::TopBottom.to_string(), "topBottom");
    }
}
