use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Refresh a protocol's reported yield rate and risk score
///
/// Admin or Keeper capability. Clears the stale flag set by re-activation,
/// letting the entry rejoin selection.
#[derive(Accounts)]
pub struct UpdateProtocolParams<'info> {
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
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Account<'info, ProtocolRegistry>,
}

pub fn handler(
    ctx: Context<UpdateProtocolParams>,
    protocol: Pubkey,
    yield_rate_bps: u16,
    risk_score: u8,
) -> Result<()> {
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.caller_grant,
        &ctx.accounts.caller.key(),
        CAP_ADMIN | CAP_KEEPER,
    )?;

    require!(risk_score <= MAX_RISK_SCORE, LedgerError::InvalidRiskScore);

    let registry = &mut ctx.accounts.registry;
    let entry = registry
        .find_mut(&protocol)
        .ok_or(error!(LedgerError::ProtocolNotFound))?;

    entry.yield_rate_bps = yield_rate_bps;
    entry.risk_score = risk_score;
    entry.needs_refresh = false;

    emit!(ProtocolParamsUpdated {
        protocol,
        yield_rate_bps,
        risk_score,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
