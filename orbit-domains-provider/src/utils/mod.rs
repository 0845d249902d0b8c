//! Internal utilities.

pub(crate) mod log_sanitizer;
