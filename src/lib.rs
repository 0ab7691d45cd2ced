//! Voxcube - bit-packed voxel cubes for sliced additive-manufacturing data
//!
//! Grids come from decoded layer files (or are built directly), then flow
//! through CSG, morphology, resampling, projection and transform operations.
//! Every operation returns a new grid and reports through an explicit
//! [`core::ProgressChannel`].

pub mod core;
pub mod math;
pub mod voxel;
pub mod ops;
pub mod layer_file;
pub mod pipeline;
