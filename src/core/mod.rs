//! Core engine types and utilities

pub mod error;
pub mod logging;
pub mod config;
pub mod progress;

pub use error::{Error, Result};
pub use config::{MorphologyOptions, ProgressConfig};
pub use progress::{
    ChannelSink, LogSink, NullSink, ProgressChannel, ProgressEvent, ProgressSink, ProgressState,
    RecordingSink, Task,
};
