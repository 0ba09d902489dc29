//! Shared helpers for the bundling pipelines.

pub mod fs;
pub mod http;
pub mod tools;
