use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Activate or deactivate a registered protocol
///
/// Deactivation excludes the protocol from selection and from on-demand
/// access; its historical allocations remain returnable. Re-activation
/// marks the entry stale - its yield rate and risk score must be refreshed
/// before it participates in selection again.
#[derive(Accounts)]
pub struct SetProtocolStatus<'info> {
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
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Account<'info, ProtocolRegistry>,
}

pub fn handler(ctx: Context<SetProtocolStatus>, protocol: Pubkey, active: bool) -> Result<()> {
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.admin_grant,
        &ctx.accounts.admin.key(),
        CAP_ADMIN,
    )?;

    let registry = &mut ctx.accounts.registry;
    let entry = registry
        .find_mut(&protocol)
        .ok_or(error!(LedgerError::ProtocolNotFound))?;

    if active && !entry.is_active {
        entry.needs_refresh = true;
    }
    entry.is_active = active;
    let needs_refresh = entry.needs_refresh;

    emit!(ProtocolStatusChanged {
        protocol,
        is_active: active,
        needs_refresh,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
