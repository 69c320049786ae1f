use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

/// Withdraw assets from the ledger on behalf of a user
///
/// Security checklist:
/// - Caller must hold the Protocol capability
/// - Balance checked before liquidity: a sufficient balance still fails
///   when the capital is allocated to protocols
/// - Shares burned round up so rounding dust favors the pool
/// - Ledger state fully updated before the custody transfer
/// - Allowed on deactivated assets so positions can always unwind
#[derive(Accounts)]
pub struct Withdraw<'info> {
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
        seeds = [ASSET_SEED, asset_state.asset_mint.as_ref()],
        bump = asset_state.bump,
    )]
    pub asset_state: Account<'info, AssetState>,

    /// Depositor identity the balance is debited from
    /// CHECK: identity only, used as a PDA seed
    pub user: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [BALANCE_SEED, user.key().as_ref(), asset_state.asset_mint.as_ref()],
        bump = user_balance.bump,
    )]
    pub user_balance: Account<'info, UserBalance>,

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

    /// Destination for the withdrawn assets
    #[account(
        mut,
        constraint = recipient_account.mint == asset_state.asset_mint @ LedgerError::InvalidMint,
    )]
    pub recipient_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
    // CHECKS
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.caller_grant,
        &ctx.accounts.caller.key(),
        CAP_PROTOCOL,
    )?;
    require!(amount > 0, LedgerError::ZeroAmount);

    // EFFECTS: Update the ledger before any external call
    let asset_state = &mut ctx.accounts.asset_state;
    let user_balance = &mut ctx.accounts.user_balance;
    let shares_to_burn = asset_state.withdraw_checked(&mut user_balance.shares, amount)?;

    // INTERACTIONS: Pay out from the vault
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
            to: ctx.accounts.recipient_account.to_account_info(),
            authority: ctx.accounts.vault_authority.to_account_info(),
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, amount)?;

    emit!(Withdrawn {
        asset_mint: asset_mint_key,
        user: ctx.accounts.user.key(),
        amount,
        shares_burned: shares_to_burn,
        total_deposited: ctx.accounts.asset_state.total_deposited,
        total_shares: ctx.accounts.asset_state.total_shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
