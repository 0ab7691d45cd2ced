//! Engine configuration

use serde::{Deserialize, Serialize};

/// Progress reporting cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Number of pending ticks emitted over one operation's traversal.
    /// With 100 ticks a pending event fires roughly every 1% of the work.
    pub ticks_per_operation: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            ticks_per_operation: 100,
        }
    }
}

impl ProgressConfig {
    /// Amount of work between two pending ticks.
    ///
    /// Zero means "too little work to report on", in which case only the
    /// start/end markers are emitted.
    pub fn tick_unit(&self, total_work: u64) -> u64 {
        if self.ticks_per_operation == 0 {
            return 0;
        }
        total_work / self.ticks_per_operation as u64
    }
}

/// Parameters shared by the morphology operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyOptions {
    /// Number of single-voxel passes
    pub radius: u32,
    /// Number of pyramid levels to descend before running the passes
    pub scale: u32,
    /// Average / corner-classify while resampling instead of nearest sampling
    pub smooth: bool,
}

impl Default for MorphologyOptions {
    fn default() -> Self {
        Self {
            radius: 1,
            scale: 0,
            smooth: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_unit() {
        let config = ProgressConfig::default();
        assert_eq!(config.tick_unit(10_000), 100);
        assert_eq!(config.tick_unit(99), 0);
        assert_eq!(config.tick_unit(0), 0);
    }

    #[test]
    fn test_zero_ticks_never_divides() {
        let config = ProgressConfig { ticks_per_operation: 0 };
        assert_eq!(config.tick_unit(1_000_000), 0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts: MorphologyOptions = serde_json::from_str(r#"{"radius": 3}"#).unwrap();
        assert_eq!(opts.radius, 3);
        assert_eq!(opts.scale, 0);
        assert!(!opts.smooth);
    }
}
