use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Grant capability bits to a principal
///
/// Security considerations:
/// - Admin capability required
/// - Grant accounts are created on demand and never closed, so the grant
///   table stays auditable
#[derive(Accounts)]
pub struct GrantCapabilities<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    /// The admin's own grant, proving the Admin capability
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

    /// Principal receiving the capabilities
    /// CHECK: identity only, used as a PDA seed
    pub principal: UncheckedAccount<'info>,

    /// The principal's grant, created on first use
    #[account(
        init_if_needed,
        payer = admin,
        space = CAPABILITY_GRANT_SIZE,
        seeds = [CAPABILITY_SEED, principal.key().as_ref()],
        bump
    )]
    pub grant: Account<'info, CapabilityGrant>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<GrantCapabilities>, capabilities: u8) -> Result<()> {
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.admin_grant,
        &ctx.accounts.admin.key(),
        CAP_ADMIN,
    )?;

    let grant = &mut ctx.accounts.grant;
    if grant.principal == Pubkey::default() {
        grant.principal = ctx.accounts.principal.key();
        grant.bump = ctx.bumps.grant;
    }
    grant.capabilities |= capabilities;

    emit!(CapabilitiesChanged {
        principal: grant.principal,
        capabilities: grant.capabilities,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
