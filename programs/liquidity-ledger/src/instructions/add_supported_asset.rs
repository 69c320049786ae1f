use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, state::*};

/// Add a new supported asset to the ledger
///
/// Security considerations:
/// - Admin capability required
/// - One AssetState per mint; re-adding a mint fails at account creation
/// - The vault token account is owned by a per-asset authority PDA
#[derive(Accounts)]
pub struct AddSupportedAsset<'info> {
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

    /// Mint of the asset being added
    pub asset_mint: Account<'info, Mint>,

    /// Per-asset ledger state PDA
    #[account(
        init,
        payer = admin,
        space = ASSET_STATE_SIZE,
        seeds = [ASSET_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub asset_state: Account<'info, AssetState>,

    /// Vault authority PDA for this asset
    /// CHECK: PDA used as token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault token account holding the asset's custody
    #[account(
        init,
        payer = admin,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<AddSupportedAsset>, idle_threshold: u64) -> Result<()> {
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.admin_grant,
        &ctx.accounts.admin.key(),
        CAP_ADMIN,
    )?;

    let asset_state = &mut ctx.accounts.asset_state;
    asset_state.asset_mint = ctx.accounts.asset_mint.key();
    asset_state.total_deposited = 0;
    asset_state.total_utilized = 0;
    asset_state.total_shares = 0;
    asset_state.idle_threshold = idle_threshold;
    asset_state.last_rebalance_ts = 0;
    asset_state.treasury_fees = 0;
    asset_state.is_active = true;
    asset_state.bump = ctx.bumps.asset_state;
    asset_state.vault_authority_bump = ctx.bumps.vault_authority;
    asset_state._reserved = [0; 64];

    emit!(AssetAdded {
        asset_mint: asset_state.asset_mint,
        idle_threshold,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
