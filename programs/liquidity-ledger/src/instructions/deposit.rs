use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::allocation::{apply_allocation, plan_rebalance, RebalanceTrigger};
use crate::{constants::*, errors::*, events::*, state::*};

/// Deposit assets into the ledger on behalf of a user
///
/// Security checklist:
/// - Caller must hold the Protocol capability
/// - Asset must be active, amount non-zero
/// - Shares minted at the current pool price with checked math
/// - Ledger state fully updated before the custody transfer (checks-
///   effects-interactions)
/// - May run an opportunistic partial rebalance; the cooldown clock is
///   never reset on this path
#[derive(Accounts)]
pub struct Deposit<'info> {
    /// Capability-holding gateway; funds the deposit and pays for the
    /// user's balance account on first use
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

    /// Consulted (and possibly mutated) by the opportunistic rebalance
    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Account<'info, ProtocolRegistry>,

    /// Depositor identity the balance is credited to
    /// CHECK: identity only, used as a PDA seed
    pub user: UncheckedAccount<'info>,

    /// The user's position, created lazily on first deposit
    #[account(
        init_if_needed,
        payer = caller,
        space = USER_BALANCE_SIZE,
        seeds = [BALANCE_SEED, user.key().as_ref(), asset_state.asset_mint.as_ref()],
        bump
    )]
    pub user_balance: Account<'info, UserBalance>,

    /// Caller's token account funding the deposit
    #[account(
        mut,
        constraint = funding_account.mint == asset_state.asset_mint @ LedgerError::InvalidMint,
        constraint = funding_account.owner == caller.key() @ LedgerError::InvalidOwner,
    )]
    pub funding_account: Account<'info, TokenAccount>,

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

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    // CHECKS
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.caller_grant,
        &ctx.accounts.caller.key(),
        CAP_PROTOCOL,
    )?;
    require!(amount > 0, LedgerError::ZeroAmount);
    require!(ctx.accounts.asset_state.is_active, LedgerError::AssetNotActive);

    // EFFECTS: Update the ledger before any external call
    let asset_state = &mut ctx.accounts.asset_state;
    let shares = asset_state.credit_deposit(amount)?;

    let user_balance = &mut ctx.accounts.user_balance;
    if user_balance.user == Pubkey::default() {
        user_balance.user = ctx.accounts.user.key();
        user_balance.asset_mint = asset_state.asset_mint;
        user_balance.bump = ctx.bumps.user_balance;
    }
    user_balance.shares = user_balance
        .shares
        .checked_add(shares)
        .ok_or(LedgerError::MathOverflow)?;

    // Opportunistic rebalance: commits a configured fraction of idle
    // capital, gated by the same threshold and cooldown as the keeper path
    let now = Clock::get()?.unix_timestamp;
    let plan = plan_rebalance(
        &ctx.accounts.asset_state,
        &ctx.accounts.registry,
        &ctx.accounts.config,
        now,
        RebalanceTrigger::Deposit,
    )?;
    if let Some(plan) = plan {
        let protocol = ctx.accounts.registry.protocols[plan.protocol_index].id;
        apply_allocation(
            &mut ctx.accounts.asset_state,
            &mut ctx.accounts.registry,
            plan,
        )?;

        emit!(CapitalReallocated {
            asset_mint: ctx.accounts.asset_state.asset_mint,
            protocol,
            amount: plan.amount,
            keeper_triggered: false,
            total_utilized: ctx.accounts.asset_state.total_utilized,
            timestamp: now,
        });
    }

    // INTERACTIONS: Pull the deposit into the vault
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.funding_account.to_account_info(),
            to: ctx.accounts.vault_token_account.to_account_info(),
            authority: ctx.accounts.caller.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, amount)?;

    emit!(Deposited {
        asset_mint: ctx.accounts.asset_state.asset_mint,
        user: ctx.accounts.user.key(),
        amount,
        shares_minted: shares,
        total_deposited: ctx.accounts.asset_state.total_deposited,
        total_shares: ctx.accounts.asset_state.total_shares,
        timestamp: now,
    });

    Ok(())
}
