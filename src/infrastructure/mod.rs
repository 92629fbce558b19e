//! Environment and filesystem helpers.

pub mod paths;

pub use paths::{data_dir, expand_tilde, platform_data_dir, resolve_data_dir};
