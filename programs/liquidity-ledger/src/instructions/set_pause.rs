use anchor_lang::prelude::*;

use crate::{constants::*, events::*, state::*};

/// Guardian circuit breaker
///
/// While paused, every mutating operation except emergency recovery fails
/// with `SystemPaused`. Unpausing goes through the same instruction, so it
/// carries no pause gate itself.
#[derive(Accounts)]
pub struct SetPause<'info> {
    #[account(mut)]
    pub guardian: Signer<'info>,

    #[account(
        seeds = [CAPABILITY_SEED, guardian.key().as_ref()],
        bump = guardian_grant.bump,
    )]
    pub guardian_grant: Account<'info, CapabilityGrant>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, LedgerConfig>,
}

pub fn handler(ctx: Context<SetPause>, paused: bool) -> Result<()> {
    require_capability(
        &ctx.accounts.guardian_grant,
        &ctx.accounts.guardian.key(),
        CAP_GUARDIAN,
    )?;

    ctx.accounts.config.paused = paused;

    emit!(PauseSet {
        guardian: ctx.accounts.guardian.key(),
        paused,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
