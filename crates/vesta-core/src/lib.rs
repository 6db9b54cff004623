//! # vesta-core
//! Foundation types, ledgers, and traits for the Vesta escrow engine.
//!
//! All amounts are integers; no floating point is used anywhere in the
//! accounting path.

pub mod clock;
pub mod constants;
pub mod curve;
pub mod directory;
pub mod error;
pub mod events;
pub mod gate;
pub mod ledger;
pub mod liquid;
pub mod redeem;
pub mod traits;
pub mod types;
pub mod usage;
