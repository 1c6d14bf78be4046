//! Shared CLI plumbing.

pub mod logging;
