//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable. Calling this more than
/// once is harmless; later calls leave the first logger in place.
///
/// # Example
/// ```
/// voxcube::core::logging::init();
/// log::info!("Engine started");
/// ```
pub fn init() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
