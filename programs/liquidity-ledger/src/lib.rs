// Liquidity Ledger - unified accounting store with automated cross-protocol
// capital allocation on Solana
//
// Architecture: a single closed-system ledger tracks deposits per user and
// asset; registered protocols draw on the pool through virtual allocations
// (bookkeeping only, no custody movement); an allocation engine periodically
// moves idle capital to the best risk-adjusted protocol; returned yield is
// fee-split and compounded into the pool share price.
// Security: capability-gated entry points, checked math throughout,
// checks-effects-interactions ordering on every custody transfer.

use anchor_lang::prelude::*;

pub mod allocation;
pub mod constants;
pub mod distribution;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("5pAuoVtMxDrGdJq2UeppKH2P2tMQ941hqRzbByD2QNGZ");

#[program]
pub mod liquidity_ledger {
    use super::*;

    /// Initialize the ledger: config, protocol registry, and the founding
    /// admin's capability grant
    ///
    /// Security considerations:
    /// - Fee policy and sizing factor validated at configuration time
    /// - The signer becomes the initial admin
    pub fn initialize(
        ctx: Context<Initialize>,
        treasury: Pubkey,
        protocol_fee_bps: u16,
        treasury_fee_bps: u16,
        min_rebalance_interval: i64,
        deposit_sweep_bps: u16,
    ) -> Result<()> {
        instructions::initialize::handler(
            ctx,
            treasury,
            protocol_fee_bps,
            treasury_fee_bps,
            min_rebalance_interval,
            deposit_sweep_bps,
        )
    }

    /// Grant capability bits to a principal (Admin only)
    pub fn grant_capabilities(ctx: Context<GrantCapabilities>, capabilities: u8) -> Result<()> {
        instructions::grant_capabilities::handler(ctx, capabilities)
    }

    /// Revoke capability bits from a principal (Admin only)
    pub fn revoke_capabilities(ctx: Context<RevokeCapabilities>, capabilities: u8) -> Result<()> {
        instructions::revoke_capabilities::handler(ctx, capabilities)
    }

    /// Add a supported asset with its idle threshold (Admin only)
    pub fn add_supported_asset(ctx: Context<AddSupportedAsset>, idle_threshold: u64) -> Result<()> {
        instructions::add_supported_asset::handler(ctx, idle_threshold)
    }

    /// Activate or deactivate a supported asset (Admin only)
    ///
    /// Deactivated assets stay withdrawable and returnable.
    pub fn set_asset_status(ctx: Context<SetAssetStatus>, active: bool) -> Result<()> {
        instructions::set_asset_status::handler(ctx, active)
    }

    /// Register a protocol as an allocation target (Admin only)
    ///
    /// Security considerations:
    /// - Registry is bounded so the selection scan has a fixed worst case
    /// - Risk score validated against the 0..=100 scale
    pub fn register_protocol(
        ctx: Context<RegisterProtocol>,
        protocol: Pubkey,
        yield_rate_bps: u16,
        risk_score: u8,
        max_capacity: u64,
    ) -> Result<()> {
        instructions::register_protocol::handler(ctx, protocol, yield_rate_bps, risk_score, max_capacity)
    }

    /// Activate or deactivate a registered protocol (Admin only)
    ///
    /// Re-activation marks the entry stale until its params are refreshed.
    pub fn set_protocol_status(
        ctx: Context<SetProtocolStatus>,
        protocol: Pubkey,
        active: bool,
    ) -> Result<()> {
        instructions::set_protocol_status::handler(ctx, protocol, active)
    }

    /// Refresh a protocol's yield rate and risk score (Admin or Keeper)
    pub fn update_protocol_params(
        ctx: Context<UpdateProtocolParams>,
        protocol: Pubkey,
        yield_rate_bps: u16,
        risk_score: u8,
    ) -> Result<()> {
        instructions::update_protocol_params::handler(ctx, protocol, yield_rate_bps, risk_score)
    }

    /// Update global config fields; only provided options change (Admin only)
    pub fn update_config(
        ctx: Context<UpdateConfig>,
        new_treasury: Option<Pubkey>,
        new_protocol_fee_bps: Option<u16>,
        new_treasury_fee_bps: Option<u16>,
        new_min_rebalance_interval: Option<i64>,
        new_deposit_sweep_bps: Option<u16>,
    ) -> Result<()> {
        instructions::update_config::handler(
            ctx,
            new_treasury,
            new_protocol_fee_bps,
            new_treasury_fee_bps,
            new_min_rebalance_interval,
            new_deposit_sweep_bps,
        )
    }

    /// Deposit assets on behalf of a user (Protocol capability)
    ///
    /// Security considerations:
    /// - Shares minted at the current pool price with checked math
    /// - Ledger updated before the custody transfer
    /// - May trigger an opportunistic partial rebalance
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        instructions::deposit::handler(ctx, amount)
    }

    /// Withdraw assets on behalf of a user (Protocol capability)
    ///
    /// Security considerations:
    /// - Balance checked before liquidity; allocated capital is not
    ///   withdrawable
    /// - Ledger updated before the custody transfer
    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        instructions::withdraw::handler(ctx, amount)
    }

    /// Let a protocol pull available liquidity on demand (Protocol capability)
    ///
    /// Pure bookkeeping - no custody moves.
    pub fn access_assets(
        ctx: Context<AccessAssets>,
        protocol: Pubkey,
        amount: u64,
        user: Pubkey,
    ) -> Result<()> {
        instructions::access_assets::handler(ctx, protocol, amount, user)
    }

    /// Return allocated capital, optionally with yield (Protocol capability)
    ///
    /// Yield is fee-split and compounded into the pool share price.
    pub fn return_assets(
        ctx: Context<ReturnAssets>,
        protocol: Pubkey,
        amount: u64,
        yield_amount: u64,
        user: Pubkey,
    ) -> Result<()> {
        instructions::return_assets::handler(ctx, protocol, amount, yield_amount, user)
    }

    /// Sweep the full idle capital of an asset into the best-scoring
    /// protocol (Keeper capability)
    ///
    /// Gated by the idle threshold and the rebalance cooldown; a gated-out
    /// call is a no-op, not an error.
    pub fn detect_and_reallocate(ctx: Context<DetectAndReallocate>) -> Result<()> {
        instructions::detect_and_reallocate::handler(ctx)
    }

    /// Pause or unpause all non-emergency mutations (Guardian capability)
    pub fn set_pause(ctx: Context<SetPause>, paused: bool) -> Result<()> {
        instructions::set_pause::handler(ctx, paused)
    }

    /// Crisis recovery transfer out of the vault (Admin only, works while
    /// paused)
    pub fn emergency_withdraw(ctx: Context<EmergencyWithdraw>, amount: u64) -> Result<()> {
        instructions::emergency_withdraw::handler(ctx, amount)
    }
}
