// Constants for the Liquidity Ledger program

/// Seed for the global config PDA
pub const CONFIG_SEED: &[u8] = b"config";

/// Seed for per-principal capability grant PDAs
pub const CAPABILITY_SEED: &[u8] = b"capability";

/// Seed for per-asset state PDAs
pub const ASSET_SEED: &[u8] = b"asset";

/// Seed for per-(user, asset) balance PDAs
pub const BALANCE_SEED: &[u8] = b"balance";

/// Seed for the protocol registry PDA
pub const REGISTRY_SEED: &[u8] = b"protocols";

/// Seed for per-asset vault authority PDAs (owns the vault token account)
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Basis-point denominator used for fees and sizing factors
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Risk scores run 0..=100, lower is safer
pub const MAX_RISK_SCORE: u8 = 100;

/// Hard bound on registry size; the allocation engine scans every entry,
/// so the scan length must stay fixed
pub const MAX_PROTOCOLS: usize = 16;

/// Hard bound on distinct assets tracked per protocol entry
pub const MAX_ASSET_ALLOCATIONS: usize = 8;

/// Space for LedgerConfig (8 discriminator + 32 admin + 32 treasury +
/// 2 protocol_fee_bps + 2 treasury_fee_bps + 8 min_rebalance_interval +
/// 2 deposit_sweep_bps + 1 paused + 1 bump + 64 padding)
pub const CONFIG_SIZE: usize = 8 + 32 + 32 + 2 + 2 + 8 + 2 + 1 + 1 + 64;

/// Space for CapabilityGrant (8 discriminator + 32 principal +
/// 1 capabilities + 1 bump)
pub const CAPABILITY_GRANT_SIZE: usize = 8 + 32 + 1 + 1;

/// Space for AssetState (8 discriminator + 32 asset_mint + 8 total_deposited +
/// 8 total_utilized + 8 total_shares + 8 idle_threshold + 8 last_rebalance_ts +
/// 8 treasury_fees + 1 is_active + 1 bump + 1 vault_authority_bump + 64 padding)
pub const ASSET_STATE_SIZE: usize = 8 + 32 + 8 + 8 + 8 + 8 + 8 + 8 + 1 + 1 + 1 + 64;

/// Space for UserBalance (8 discriminator + 32 user + 32 asset_mint +
/// 8 shares + 1 bump)
pub const USER_BALANCE_SIZE: usize = 8 + 32 + 32 + 8 + 1;
