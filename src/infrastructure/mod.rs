//! Host platform adapters.

pub mod simulated;
