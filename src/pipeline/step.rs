//! Pipeline step definitions - JSON-tagged unary grid operations

use serde::{Deserialize, Serialize};

use crate::core::{MorphologyOptions, ProgressChannel, Result};
use crate::voxel::{PatternSpec, VoxelGrid};

fn default_true() -> bool {
    true
}

/// One operation applied to the working grid.
///
/// Serialized as `{"op": "erode", "radius": 2, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    /// Isotropic erosion
    Erode(MorphologyOptions),
    /// Per-axis erosion radii
    ErodeDirectional {
        rx: u32,
        ry: u32,
        rz: u32,
        #[serde(default)]
        scale: u32,
        #[serde(default)]
        smooth: bool,
    },
    /// Isotropic dilation
    Dilate(MorphologyOptions),
    /// Halve every dimension
    ScaleDown {
        #[serde(default)]
        smooth: bool,
    },
    /// Undo one `ScaleDown`, or double every dimension
    ScaleUp {
        #[serde(default)]
        smooth: bool,
        #[serde(default = "default_true")]
        additive: bool,
    },
    /// Shift voxels inside the same grid
    Translate {
        #[serde(default)]
        dx: i32,
        #[serde(default)]
        dy: i32,
        #[serde(default)]
        dz: i32,
    },
    /// Quarter turns around Z (only half turns are supported)
    Rotate {
        rotations: i32,
        #[serde(default)]
        clockwise: bool,
    },
    /// Resize the Z axis
    ChangeZ {
        change: i32,
        #[serde(default = "default_true")]
        relative: bool,
    },
    /// Complement every voxel
    Invert,
    /// Keep only voxels inside a built-in pattern
    IntersectPattern { pattern: PatternSpec },
    /// Remove voxels inside a built-in pattern
    DifferencePattern { pattern: PatternSpec },
}

impl Step {
    /// Operation name used in progress events and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Erode(_) => "erode",
            Step::ErodeDirectional { .. } => "erodeDirectional",
            Step::Dilate(_) => "dilate",
            Step::ScaleDown { .. } => "scaleDown",
            Step::ScaleUp { .. } => "scaleUp",
            Step::Translate { .. } => "translate",
            Step::Rotate { .. } => "rotate",
            Step::ChangeZ { .. } => "changeZ",
            Step::Invert => "invert",
            Step::IntersectPattern { .. } => "intersectPattern",
            Step::DifferencePattern { .. } => "differencePattern",
        }
    }

    /// Run this step against `grid`.
    pub fn apply(&self, grid: &VoxelGrid, channel: &ProgressChannel) -> Result<VoxelGrid> {
        match self {
            Step::Erode(options) => Ok(grid.erode_with(options, channel)),
            Step::ErodeDirectional { rx, ry, rz, scale, smooth } => {
                Ok(grid.erode_directional(*rx, *ry, *rz, *scale, *smooth, channel))
            }
            Step::Dilate(options) => Ok(grid.dilate_with(options, channel)),
            Step::ScaleDown { smooth } => Ok(grid.scale_down(*smooth, channel)),
            Step::ScaleUp { smooth, additive } => Ok(grid.scale_up(*smooth, *additive, channel)),
            Step::Translate { dx, dy, dz } => Ok(grid.translate(*dx, *dy, *dz, channel)),
            Step::Rotate { rotations, clockwise } => grid.rotate(*rotations, *clockwise, channel),
            Step::ChangeZ { change, relative } => grid.change_z(*change, *relative, channel),
            Step::Invert => Ok(grid.boolean_inversion(channel)),
            Step::IntersectPattern { pattern } => {
                let pattern = pattern.build()?;
                grid.boolean_intersect(&pattern, channel)
            }
            Step::DifferencePattern { pattern } => {
                let pattern = pattern.build()?;
                grid.boolean_difference(&pattern, channel)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_json_shape() {
        let step: Step = serde_json::from_str(r#"{"op":"erodeDirectional","rx":2,"ry":0,"rz":1}"#).unwrap();
        assert_eq!(step, Step::ErodeDirectional { rx: 2, ry: 0, rz: 1, scale: 0, smooth: false });

        let step: Step = serde_json::from_str(r#"{"op":"dilate","radius":3}"#).unwrap();
        assert_eq!(step, Step::Dilate(MorphologyOptions { radius: 3, ..Default::default() }));

        let step: Step = serde_json::from_str(r#"{"op":"changeZ","change":4}"#).unwrap();
        assert_eq!(step, Step::ChangeZ { change: 4, relative: true });

        let step: Step = serde_json::from_str(r#"{"op":"scaleUp"}"#).unwrap();
        assert_eq!(step, Step::ScaleUp { smooth: false, additive: true });

        let json = serde_json::to_string(&Step::Invert).unwrap();
        assert_eq!(json, r#"{"op":"invert"}"#);
    }

    #[test]
    fn test_pattern_step_json() {
        let step: Step =
            serde_json::from_str(r#"{"op":"intersectPattern","pattern":{"kind":"checker","cell":2}}"#).unwrap();
        assert_eq!(step.name(), "intersectPattern");
        assert_eq!(step, Step::IntersectPattern { pattern: PatternSpec::Checker { cell: 2 } });
    }

    #[test]
    fn test_unknown_op_rejected() {
        assert!(serde_json::from_str::<Step>(r#"{"op":"melt"}"#).is_err());
    }

    #[test]
    fn test_apply_dispatch() {
        let channel = ProgressChannel::silent();
        let grid = VoxelGrid::from_fn(4, 4, 4, |x, y, z| x == 1 && y == 1 && z == 1).unwrap();
        let grown = Step::Dilate(MorphologyOptions::default()).apply(&grid, &channel).unwrap();
        assert_eq!(grown.volume(), 7);

        let inverted = Step::Invert.apply(&grid, &channel).unwrap();
        assert_eq!(inverted.volume(), 63);

        let rotated = Step::Rotate { rotations: 1, clockwise: true }.apply(&grid, &channel);
        assert!(rotated.is_err());
    }
}
