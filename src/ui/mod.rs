//! Operator-facing output helpers

pub mod progress;
