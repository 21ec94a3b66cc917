//! Outer surfaces of the bridge.

pub mod channel;
