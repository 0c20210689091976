pub mod host;
pub mod log_dirs;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
