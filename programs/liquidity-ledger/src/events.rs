use anchor_lang::prelude::*;

/// Event emitted when the ledger is initialized
#[event]
pub struct LedgerInitialized {
    pub admin: Pubkey,
    pub treasury: Pubkey,
    pub protocol_fee_bps: u16,
    pub treasury_fee_bps: u16,
    pub min_rebalance_interval: i64,
    pub timestamp: i64,
}

/// Event emitted when capabilities are granted or revoked
#[event]
pub struct CapabilitiesChanged {
    pub principal: Pubkey,
    pub capabilities: u8,
    pub timestamp: i64,
}

/// Event emitted when a new asset is added to the ledger
#[event]
pub struct AssetAdded {
    pub asset_mint: Pubkey,
    pub idle_threshold: u64,
    pub timestamp: i64,
}

/// Event emitted when an asset is activated or deactivated
#[event]
pub struct AssetStatusChanged {
    pub asset_mint: Pubkey,
    pub is_active: bool,
    pub timestamp: i64,
}

/// Event emitted when a protocol is registered
#[event]
pub struct ProtocolRegistered {
    pub protocol: Pubkey,
    pub yield_rate_bps: u16,
    pub risk_score: u8,
    pub max_capacity: u64,
    pub timestamp: i64,
}

/// Event emitted when a protocol is activated or deactivated
#[event]
pub struct ProtocolStatusChanged {
    pub protocol: Pubkey,
    pub is_active: bool,
    pub needs_refresh: bool,
    pub timestamp: i64,
}

/// Event emitted when a protocol's yield rate and risk score are refreshed
#[event]
pub struct ProtocolParamsUpdated {
    pub protocol: Pubkey,
    pub yield_rate_bps: u16,
    pub risk_score: u8,
    pub timestamp: i64,
}

/// Event emitted when the global config is updated
#[event]
pub struct ConfigUpdated {
    pub treasury: Pubkey,
    pub protocol_fee_bps: u16,
    pub treasury_fee_bps: u16,
    pub min_rebalance_interval: i64,
    pub deposit_sweep_bps: u16,
    pub timestamp: i64,
}

/// Event emitted when assets are deposited
#[event]
pub struct Deposited {
    pub asset_mint: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub shares_minted: u64,
    pub total_deposited: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when assets are withdrawn
#[event]
pub struct Withdrawn {
    pub asset_mint: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub shares_burned: u64,
    pub total_deposited: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a protocol pulls liquidity on demand
#[event]
pub struct AssetsAccessed {
    pub protocol: Pubkey,
    pub asset_mint: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub total_utilized: u64,
    pub timestamp: i64,
}

/// Event emitted when a protocol returns allocated capital
#[event]
pub struct AssetsReturned {
    pub protocol: Pubkey,
    pub asset_mint: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub yield_amount: u64,
    pub total_utilized: u64,
    pub timestamp: i64,
}

/// Event emitted when returned yield is split and compounded
#[event]
pub struct YieldDistributed {
    pub protocol: Pubkey,
    pub asset_mint: Pubkey,
    pub protocol_fee: u64,
    pub treasury_fee: u64,
    pub depositor_yield: u64,
    pub total_deposited: u64,
    pub timestamp: i64,
}

/// Event emitted when idle capital is moved into a protocol allocation
#[event]
pub struct CapitalReallocated {
    pub asset_mint: Pubkey,
    pub protocol: Pubkey,
    pub amount: u64,
    pub keeper_triggered: bool,
    pub total_utilized: u64,
    pub timestamp: i64,
}

/// Event emitted when the guardian pauses or unpauses the system
#[event]
pub struct PauseSet {
    pub guardian: Pubkey,
    pub paused: bool,
    pub timestamp: i64,
}

/// Event emitted on an admin emergency withdrawal
#[event]
pub struct EmergencyWithdrawal {
    pub asset_mint: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub asset_deactivated: bool,
    pub total_deposited: u64,
    pub timestamp: i64,
}
