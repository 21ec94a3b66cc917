//! Application layer orchestrating a sale transaction.
//!
//! `TransactionBridge` owns the pending map and drives a sale from launch to
//! result. It leans on `ExternalAppLauncher` to start the terminal app and on
//! `ActivityLifecycleTracker` to know whether a host context is available.

pub mod bridge;
pub mod launcher;
pub mod lifecycle;
