use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Activate or deactivate a supported asset
///
/// Deactivated assets accept no deposits, accesses, or allocations;
/// withdrawals and returns stay open so positions can unwind.
#[derive(Accounts)]
pub struct SetAssetStatus<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [CAPABILITY_SEED, admin.key().as_ref()],
        bump = admin_grant.bump,
    )]
    pub admin_grant: Account<'info, CapabilityGrant>,

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
}

pub fn handler(ctx: Context<SetAssetStatus>, active: bool) -> Result<()> {
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.admin_grant,
        &ctx.accounts.admin.key(),
        CAP_ADMIN,
    )?;

    let asset_state = &mut ctx.accounts.asset_state;
    asset_state.is_active = active;

    emit!(AssetStatusChanged {
        asset_mint: asset_state.asset_mint,
        is_active: active,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
