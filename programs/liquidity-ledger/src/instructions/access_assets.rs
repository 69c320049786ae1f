use anchor_lang::prelude::*;

use crate::allocation::access_allocation;
use crate::{constants::*, errors::*, events::*, state::*};

/// Let a protocol pull available liquidity on demand
///
/// Virtual, no-transfer model: the effect is pure bookkeeping - the asset's
/// utilization and the protocol's allocation grow together, and no custody
/// moves. The ledger is the sole source of truth for who may use what.
#[derive(Accounts)]
pub struct AccessAssets<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        seeds = [CAPABILITY_SEED, caller.key().as_ref()],
        bump = caller_grant.bump,
    )]
    pub caller_grant: Account<'info, CapabilityGrant>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, LedgerConfig>,

    #[account(
        mut,
        seeds = [ASSET_SEED, asset_state.asset_mint.as_ref()],
        bump = asset_state.bump,
    )]
    pub asset_state: Account<'info, AssetState>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Account<'info, ProtocolRegistry>,
}

pub fn handler(
    ctx: Context<AccessAssets>,
    protocol: Pubkey,
    amount: u64,
    user: Pubkey,
) -> Result<()> {
    // CHECKS
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.caller_grant,
        &ctx.accounts.caller.key(),
        CAP_PROTOCOL,
    )?;
    require!(amount > 0, LedgerError::ZeroAmount);

    let asset_state = &mut ctx.accounts.asset_state;
    require!(asset_state.is_active, LedgerError::AssetNotActive);

    // EFFECTS: Both sides of the allocation move together
    access_allocation(asset_state, &mut ctx.accounts.registry, &protocol, amount)?;

    emit!(AssetsAccessed {
        protocol,
        asset_mint: ctx.accounts.asset_state.asset_mint,
        user,
        amount,
        total_utilized: ctx.accounts.asset_state.total_utilized,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
