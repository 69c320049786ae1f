use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Register a protocol as an allocation target
///
/// Security considerations:
/// - Admin capability required
/// - Registry is bounded; the allocation engine scans every entry
/// - Risk score validated against the 0..=100 scale
#[derive(Accounts)]
pub struct RegisterProtocol<'info> {
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

pub fn handler(
    ctx: Context<RegisterProtocol>,
    protocol: Pubkey,
    yield_rate_bps: u16,
    risk_score: u8,
    max_capacity: u64,
) -> Result<()> {
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.admin_grant,
        &ctx.accounts.admin.key(),
        CAP_ADMIN,
    )?;

    require!(risk_score <= MAX_RISK_SCORE, LedgerError::InvalidRiskScore);
    require!(max_capacity > 0, LedgerError::ZeroAmount);

    let registry = &mut ctx.accounts.registry;
    require!(
        registry.find(&protocol).is_none(),
        LedgerError::ProtocolAlreadyExists
    );
    require!(
        registry.protocols.len() < MAX_PROTOCOLS,
        LedgerError::RegistryFull
    );

    registry.protocols.push(ProtocolEntry {
        id: protocol,
        is_active: true,
        needs_refresh: false,
        yield_rate_bps,
        risk_score,
        max_capacity,
        allocations: Vec::new(),
    });

    emit!(ProtocolRegistered {
        protocol,
        yield_rate_bps,
        risk_score,
        max_capacity,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
