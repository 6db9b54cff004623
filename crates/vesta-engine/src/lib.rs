//! # vesta-engine — the escrow accounting engine.
//!
//! [`EscrowEngine`] owns all escrow state and exposes:
//! - **Conversion**: liquid asset in, escrow token out
//! - **Allocation**: approve → allocate → deallocate delegation to usage plugins
//! - **Redemption**: time-weighted vesting back into the liquid asset, with an
//!   automatic compensation grant to the configured compensation plugin
//! - **Administration**: owner-gated parameter updates
//! - **Views**: read-only queries, callable from inside plugin callbacks
//!
//! Every mutating operation runs inside a transaction that stages bookkeeping,
//! executes external calls, and rolls everything back if any of them fails.

mod admin;
mod allocation;
mod compensation;
pub mod config;
mod engine;
mod guard;
mod redemption;
mod state;
mod txn;
mod views;

pub use config::EngineConfig;
pub use engine::EscrowEngine;
