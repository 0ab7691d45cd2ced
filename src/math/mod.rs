//! Integer voxel-space geometry

pub mod bounds;

pub use bounds::BoundingBox;
