use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};
use crate::distribution::validate_fee_config;

/// Initialize the ledger: global config, protocol registry, and the
/// founding admin's capability grant
///
/// Security considerations:
/// - The signer becomes the initial admin; all later authority flows
///   through the capability grant table
/// - Fee policy and sizing factor are validated here, never at
///   distribution time
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Founding admin, pays for the singleton accounts
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Global config PDA
    #[account(
        init,
        payer = admin,
        space = CONFIG_SIZE,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, LedgerConfig>,

    /// Protocol registry PDA, sized for the maximum protocol count
    #[account(
        init,
        payer = admin,
        space = ProtocolRegistry::SPACE,
        seeds = [REGISTRY_SEED],
        bump
    )]
    pub registry: Account<'info, ProtocolRegistry>,

    /// The admin's capability grant
    #[account(
        init,
        payer = admin,
        space = CAPABILITY_GRANT_SIZE,
        seeds = [CAPABILITY_SEED, admin.key().as_ref()],
        bump
    )]
    pub admin_grant: Account<'info, CapabilityGrant>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<Initialize>,
    treasury: Pubkey,
    protocol_fee_bps: u16,
    treasury_fee_bps: u16,
    min_rebalance_interval: i64,
    deposit_sweep_bps: u16,
) -> Result<()> {
    // CHECKS: Validate the fee and sizing policy up front
    validate_fee_config(protocol_fee_bps, treasury_fee_bps)?;
    require!(
        deposit_sweep_bps as u64 <= BPS_DENOMINATOR,
        LedgerError::InvalidSweepFactor
    );

    // EFFECTS: Initialize config
    let config = &mut ctx.accounts.config;
    config.admin = ctx.accounts.admin.key();
    config.treasury = treasury;
    config.protocol_fee_bps = protocol_fee_bps;
    config.treasury_fee_bps = treasury_fee_bps;
    config.min_rebalance_interval = min_rebalance_interval;
    config.deposit_sweep_bps = deposit_sweep_bps;
    config.paused = false;
    config.bump = ctx.bumps.config;
    config._reserved = [0; 64];

    let registry = &mut ctx.accounts.registry;
    registry.protocols = Vec::new();
    registry.bump = ctx.bumps.registry;

    let grant = &mut ctx.accounts.admin_grant;
    grant.principal = ctx.accounts.admin.key();
    grant.capabilities = CAP_ADMIN;
    grant.bump = ctx.bumps.admin_grant;

    emit!(LedgerInitialized {
        admin: config.admin,
        treasury: config.treasury,
        protocol_fee_bps,
        treasury_fee_bps,
        min_rebalance_interval,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
