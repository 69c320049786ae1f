use anchor_lang::prelude::*;

/// Custom error codes for the Liquidity Ledger program
///
/// Four classes: validation and authorization errors are rejected before any
/// state mutation; resource errors may succeed on retry with a smaller amount
/// or at a later time; `LedgerImbalance` is an internal invariant failure and
/// indicates a bug, never a usage error.
#[error_code]
pub enum LedgerError {
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Risk score must not exceed 100")]
    InvalidRiskScore,

    #[msg("Combined protocol and treasury fees exceed 100%")]
    InvalidFeeConfig,

    #[msg("Deposit sweep factor exceeds 100%")]
    InvalidSweepFactor,

    #[msg("Asset is not active")]
    AssetNotActive,

    #[msg("Protocol already exists in registry")]
    ProtocolAlreadyExists,

    #[msg("Protocol not found in registry")]
    ProtocolNotFound,

    #[msg("Protocol is not active")]
    ProtocolNotActive,

    #[msg("Protocol registry is full - maximum protocols reached")]
    RegistryFull,

    #[msg("Protocol allocation table is full - maximum assets reached")]
    AllocationTableFull,

    #[msg("Invalid token account mint - does not match the asset")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    #[msg("Unauthorized - caller lacks the required capability")]
    Unauthorized,

    #[msg("System is paused")]
    SystemPaused,

    #[msg("Insufficient balance for withdrawal")]
    InsufficientBalance,

    #[msg("Insufficient available liquidity - capital is allocated to protocols")]
    InsufficientLiquidity,

    #[msg("Return amount exceeds the protocol's allocation")]
    InsufficientAllocation,

    #[msg("Allocation would exceed the protocol's maximum capacity")]
    CapacityExceeded,

    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Cannot divide by zero")]
    DivisionByZero,

    #[msg("Ledger imbalance detected - utilized capital exceeds deposits")]
    LedgerImbalance,
}
