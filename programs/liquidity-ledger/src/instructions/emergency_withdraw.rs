use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

/// Admin crisis recovery: pull assets out of the vault, bypassing normal
/// accounting
///
/// Works while paused. Withdrawing past the available bucket strands the
/// outstanding protocol allocations, so the asset is deactivated and
/// `total_deposited` stops at the utilized floor - the solvency invariant
/// is preserved and the shortfall is recorded through the event and the
/// deactivation.
#[derive(Accounts)]
pub struct EmergencyWithdraw<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [CAPABILITY_SEED, admin.key().as_ref()],
        bump = admin_grant.bump,
    )]
    pub admin_grant: Account<'info, CapabilityGrant>,

    #[account(
        mut,
        seeds = [ASSET_SEED, asset_state.asset_mint.as_ref()],
        bump = asset_state.bump,
    )]
    pub asset_state: Account<'info, AssetState>,

    /// Vault authority PDA
    /// CHECK: PDA used as token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, asset_state.asset_mint.as_ref()],
        bump = asset_state.vault_authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's token account
    #[account(
        mut,
        constraint = vault_token_account.mint == asset_state.asset_mint @ LedgerError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ LedgerError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    /// Recovery destination
    #[account(
        mut,
        constraint = recovery_account.mint == asset_state.asset_mint @ LedgerError::InvalidMint,
    )]
    pub recovery_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<EmergencyWithdraw>, amount: u64) -> Result<()> {
    // CHECKS: No pause gate - this is the recovery path
    require_capability(
        &ctx.accounts.admin_grant,
        &ctx.accounts.admin.key(),
        CAP_ADMIN,
    )?;
    require!(amount > 0, LedgerError::ZeroAmount);

    // EFFECTS: Deposits shrink by at most the available bucket; draining
    // deeper deactivates the asset and leaves the utilized floor intact
    let asset_state = &mut ctx.accounts.asset_state;
    let deactivate = asset_state.emergency_debit(amount)?;

    // INTERACTIONS: Move the full amount to the recovery destination
    let asset_mint_key = asset_state.asset_mint;
    let authority_bump = asset_state.vault_authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    let transfer_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.vault_token_account.to_account_info(),
            to: ctx.accounts.recovery_account.to_account_info(),
            authority: ctx.accounts.vault_authority.to_account_info(),
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, amount)?;

    emit!(EmergencyWithdrawal {
        asset_mint: asset_mint_key,
        to: ctx.accounts.recovery_account.key(),
        amount,
        asset_deactivated: deactivate,
        total_deposited: ctx.accounts.asset_state.total_deposited,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
