use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};
use crate::distribution::validate_fee_config;

/// Update the global config; only the provided fields change
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [CAPABILITY_SEED, admin.key().as_ref()],
        bump = admin_grant.bump,
    )]
    pub admin_grant: Account<'info, CapabilityGrant>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, LedgerConfig>,
}

pub fn handler(
    ctx: Context<UpdateConfig>,
    new_treasury: Option<Pubkey>,
    new_protocol_fee_bps: Option<u16>,
    new_treasury_fee_bps: Option<u16>,
    new_min_rebalance_interval: Option<i64>,
    new_deposit_sweep_bps: Option<u16>,
) -> Result<()> {
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.admin_grant,
        &ctx.accounts.admin.key(),
        CAP_ADMIN,
    )?;

    let config = &mut ctx.accounts.config;

    // CHECKS: The combined fee policy is validated against the values that
    // will actually be in effect
    let protocol_fee_bps = new_protocol_fee_bps.unwrap_or(config.protocol_fee_bps);
    let treasury_fee_bps = new_treasury_fee_bps.unwrap_or(config.treasury_fee_bps);
    validate_fee_config(protocol_fee_bps, treasury_fee_bps)?;

    if let Some(sweep_bps) = new_deposit_sweep_bps {
        require!(
            sweep_bps as u64 <= BPS_DENOMINATOR,
            LedgerError::InvalidSweepFactor
        );
        config.deposit_sweep_bps = sweep_bps;
    }

    if let Some(treasury) = new_treasury {
        config.treasury = treasury;
    }
    config.protocol_fee_bps = protocol_fee_bps;
    config.treasury_fee_bps = treasury_fee_bps;
    if let Some(interval) = new_min_rebalance_interval {
        config.min_rebalance_interval = interval;
    }

    emit!(ConfigUpdated {
        treasury: config.treasury,
        protocol_fee_bps: config.protocol_fee_bps,
        treasury_fee_bps: config.treasury_fee_bps,
        min_rebalance_interval: config.min_rebalance_interval,
        deposit_sweep_bps: config.deposit_sweep_bps,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
