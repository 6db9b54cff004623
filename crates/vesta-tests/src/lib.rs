//! Integration test suite for the Vesta escrow engine.
//!
//! Scenario suites live under `tests/`; this crate only exports the shared
//! harness and mock plugins they use.

pub mod helpers;
