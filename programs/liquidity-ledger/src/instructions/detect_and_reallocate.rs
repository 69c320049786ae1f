use anchor_lang::prelude::*;

use crate::allocation::{apply_allocation, plan_rebalance, RebalanceTrigger};
use crate::{constants::*, errors::*, events::*, state::*};

/// Keeper-triggered rebalance: sweep the full idle capital of an asset
/// into the best-scoring protocol
///
/// A gated-out call - idle at or under the threshold, cooldown still
/// running, or no qualifying protocol - is a no-op, not an error. The
/// cooldown clock is reset only when an allocation is actually applied.
#[derive(Accounts)]
pub struct DetectAndReallocate<'info> {
    #[account(mut)]
    pub keeper: Signer<'info>,

    #[account(
        seeds = [CAPABILITY_SEED, keeper.key().as_ref()],
        bump = keeper_grant.bump,
    )]
    pub keeper_grant: Account<'info, CapabilityGrant>,

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

pub fn handler(ctx: Context<DetectAndReallocate>) -> Result<()> {
    // CHECKS
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.keeper_grant,
        &ctx.accounts.keeper.key(),
        CAP_KEEPER,
    )?;
    require!(ctx.accounts.asset_state.is_active, LedgerError::AssetNotActive);

    let now = Clock::get()?.unix_timestamp;
    let plan = plan_rebalance(
        &ctx.accounts.asset_state,
        &ctx.accounts.registry,
        &ctx.accounts.config,
        now,
        RebalanceTrigger::Keeper,
    )?;

    let Some(plan) = plan else {
        // Gated out; nothing to do
        return Ok(());
    };

    // EFFECTS
    let protocol = ctx.accounts.registry.protocols[plan.protocol_index].id;
    apply_allocation(
        &mut ctx.accounts.asset_state,
        &mut ctx.accounts.registry,
        plan,
    )?;
    ctx.accounts.asset_state.last_rebalance_ts = now;

    emit!(CapitalReallocated {
        asset_mint: ctx.accounts.asset_state.asset_mint,
        protocol,
        amount: plan.amount,
        keeper_triggered: true,
        total_utilized: ctx.accounts.asset_state.total_utilized,
        timestamp: now,
    });

    Ok(())
}
