//! Grid operations. Each one takes `&self` and returns a new grid.
//!
//! Operations run synchronously to completion. The async interface lives in
//! [`pipeline`](crate::pipeline), which yields to the runtime between steps.

pub mod csg;
pub mod morphology;
pub mod projection;
pub mod resample;
pub mod transform;

pub use projection::{Direction, HeightMap};
