//! Test helpers shared across crates.
//!
//! This crate provides working-directory guards, a scratch-directory sandbox
//! for discovery tests, and a capturing `tracing` subscriber for asserting on
//! emitted diagnostics.

pub mod cwd;
pub mod logging;
pub mod sandbox;
