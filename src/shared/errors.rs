//! Error handling for the engine

use thiserror::Error;

use crate::shared::types::{Amount, AssetId, BasisPoints, BlockHeight};

/// Every way a configuration or swap operation can fail.
///
/// Validation failures are raised before any transfer is attempted.
/// `SwapFailed` and `FeeTransferFailed` are the only kinds that can
/// surface after a transfer has been committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("Caller is not authorized")]
    NotAuthorized,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("No price available for {asset_in} -> {asset_out}")]
    NoRoute { asset_in: AssetId, asset_out: AssetId },

    #[error("Slippage exceeded: expected at least {min_out}, got {amount_out}")]
    Slippage { min_out: Amount, amount_out: Amount },

    #[error("Pair not configured: {asset_in} -> {asset_out}")]
    InvalidPair { asset_in: AssetId, asset_out: AssetId },

    #[error("Fee out of range: {0} bps")]
    InvalidFee(BasisPoints),

    #[error("Pair already exists: {asset_in} -> {asset_out}")]
    PairAlreadyExists { asset_in: AssetId, asset_out: AssetId },

    #[error("Pair not found")]
    PairNotFound,

    #[error("Asset not supported: {0}")]
    InvalidToken(AssetId),

    #[error("Asset already supported: {0}")]
    AlreadySupported(AssetId),

    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Path length {len} exceeds maximum {max}")]
    MaxPathLength { len: usize, max: usize },

    #[error("Fee transfer failed")]
    FeeTransferFailed,

    /// Input or output leg refused by the transfer collaborator
    #[error("Transfer of {asset} rejected: {reason}")]
    TransferRejected { asset: AssetId, reason: String },

    #[error("Swap failed")]
    SwapFailed {
        #[source]
        cause: Option<Box<SwapError>>,
    },

    #[error("Minimum output must be greater than zero")]
    InvalidMinOut,

    #[error("Engine is paused")]
    Paused,

    #[error("Invalid admin")]
    InvalidAdmin,

    #[error("Invalid oracle")]
    InvalidOracle,

    #[error("Stale price: quoted at height {quoted_at}, current height {current_height}")]
    StalePrice {
        quoted_at: BlockHeight,
        current_height: BlockHeight,
    },

    #[error("Invalid decimals")]
    InvalidDecimals,

    #[error("Math overflow")]
    MathOverflow,
}

impl SwapError {
    /// Wrap a hop failure. A failure that already is `SwapFailed` is kept as is.
    pub fn swap_failed(cause: SwapError) -> Self {
        match cause {
            SwapError::SwapFailed { .. } => cause,
            other => SwapError::SwapFailed {
                cause: Some(Box::new(other)),
            },
        }
    }

    /// Innermost error, unwrapping `SwapFailed` layers.
    pub fn root_cause(&self) -> &SwapError {
        match self {
            SwapError::SwapFailed { cause: Some(inner) } => inner.root_cause(),
            other => other,
        }
    }
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Bootstrap error: {0}")]
    BootstrapError(String),

    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),

    #[error("Report rendering error: {0}")]
    Render(#[from] serde_json::Error),
}
