//! Error types for the Vesta escrow engine.
use thiserror::Error;

use crate::types::{Address, Amount, Timestamp};

/// Zero or out-of-range inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount must be greater than zero")] ZeroAmount,
    #[error("redeem duration {duration}s below minimum {min}s")] DurationTooShort { duration: u64, min: u64 },
    #[error("insufficient escrow balance: have {have}, need {need}")] InsufficientBalance { have: Amount, need: Amount },
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("null address")] NullAddress,
    #[error("no usage plugin registered at {0}")] UnknownPlugin(Address),
}

/// The caller lacks the right to perform the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("insufficient usage approval: have {have}, need {need}")] InsufficientApproval { have: Amount, need: Amount },
    #[error("insufficient usage allocation: have {have}, need {need}")] InsufficientAllocation { have: Amount, need: Amount },
    #[error("insufficient transfer allowance: have {have}, need {need}")] InsufficientAllowance { have: Amount, need: Amount },
    #[error("transfer from {from} to {to} not allowed")] TransferNotAllowed { from: Address, to: Address },
    #[error("caller {0} is not the owner")] NotOwner(Address),
    #[error("caller {0} is not a contract")] NotContract(Address),
}

/// The engine's current state does not permit the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("redeem entry {index} does not exist (count {len})")] RedeemNotFound { index: usize, len: usize },
    #[error("vesting not matured: now {now}, maturity {maturity}")] NotMatured { now: Timestamp, maturity: Timestamp },
    #[error("re-entrant call rejected")] Reentrant,
    #[error("{counter} counter underflow")] CounterUnderflow { counter: &'static str },
    #[error("custody holds {have} liquid units, operation needs {need}")] CustodyShortfall { have: Amount, need: Amount },
}

/// Administrative parameters out of bounds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("min redeem ratio {min} above max {max}")] RatioBoundsInverted { min: u64, max: u64 },
    #[error("redeem ratio {ratio} above {max}")] RatioAboveMax { ratio: u64, max: u64 },
    #[error("min redeem duration {min} not below max {max}")] DurationBoundsInverted { min: u64, max: u64 },
    #[error("compensation adjustment {adjustment} above {max}")] AdjustmentAboveMax { adjustment: u64, max: u64 },
    #[error("deallocation fee {fee_bps} bps above {max_bps}")] FeeTooHigh { fee_bps: u16, max_bps: u16 },
    #[error("custody address cannot leave the transfer allow-list")] CustodyNotRemovable,
    #[error("invalid configuration: {0}")] Invalid(String),
}

/// Failure reported by a usage plugin callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PluginError(pub String);

/// Failure reported by the liquid-asset collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: Amount, need: Amount },
    #[error("insufficient allowance: have {have}, need {need}")] InsufficientAllowance { have: Amount, need: Amount },
    #[error("supply overflow")] Overflow,
}

/// An external collaborator aborted the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalError {
    #[error("plugin {plugin} failed: {source}")] Plugin { plugin: Address, source: PluginError },
    #[error("liquid asset: {0}")] Asset(#[from] AssetError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid length: {0} bytes")] InvalidLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error(transparent)] Authorization(#[from] AuthorizationError),
    #[error(transparent)] State(#[from] StateError),
    #[error(transparent)] Configuration(#[from] ConfigurationError),
    #[error(transparent)] External(#[from] ExternalError),
}

impl From<AssetError> for EscrowError {
    fn from(e: AssetError) -> Self {
        Self::External(ExternalError::Asset(e))
    }
}
