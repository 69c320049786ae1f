use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Revoke capability bits from a principal
#[derive(Accounts)]
pub struct RevokeCapabilities<'info> {
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

    /// The principal's grant; must already exist
    #[account(
        mut,
        seeds = [CAPABILITY_SEED, grant.principal.as_ref()],
        bump = grant.bump,
    )]
    pub grant: Account<'info, CapabilityGrant>,
}

pub fn handler(ctx: Context<RevokeCapabilities>, capabilities: u8) -> Result<()> {
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.admin_grant,
        &ctx.accounts.admin.key(),
        CAP_ADMIN,
    )?;

    let grant = &mut ctx.accounts.grant;
    grant.capabilities &= !capabilities;

    emit!(CapabilitiesChanged {
        principal: grant.principal,
        capabilities: grant.capabilities,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
