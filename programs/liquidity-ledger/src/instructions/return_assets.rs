use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::allocation::release_allocation;
use crate::distribution::distribute_yield;
use crate::{constants::*, errors::*, events::*, state::*};

/// Return allocated capital, optionally with earned yield
///
/// The principal leg is pure bookkeeping (mirror of access). Yield is
/// split into protocol fee, treasury fee, and the depositor share, which
/// compounds into the pool and raises the share price; the yield tokens
/// themselves are pulled into the vault after all ledger mutation.
/// Returns are always allowed - deactivated protocols and assets must
/// still be able to unwind.
#[derive(Accounts)]
pub struct ReturnAssets<'info> {
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

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Account<'info, ProtocolRegistry>,

    /// Caller's token account funding the returned yield
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
}

pub fn handler(
    ctx: Context<ReturnAssets>,
    protocol: Pubkey,
    amount: u64,
    yield_amount: u64,
    user: Pubkey,
) -> Result<()> {
    // CHECKS
    require!(!ctx.accounts.config.paused, LedgerError::SystemPaused);
    require_capability(
        &ctx.accounts.caller_grant,
        &ctx.accounts.caller.key(),
        CAP_PROTOCOL,
    )?;
    require!(amount > 0, LedgerError::ZeroAmount);

    let protocol_fee_bps = ctx.accounts.config.protocol_fee_bps;
    let treasury_fee_bps = ctx.accounts.config.treasury_fee_bps;
    let asset_mint = ctx.accounts.asset_state.asset_mint;

    // EFFECTS: Unwind the allocation
    release_allocation(
        &mut ctx.accounts.asset_state,
        &mut ctx.accounts.registry,
        &protocol,
        amount,
    )?;

    // Split and book the yield before any token movement
    let now = Clock::get()?.unix_timestamp;
    if yield_amount > 0 {
        let split = distribute_yield(
            &mut ctx.accounts.asset_state,
            &mut ctx.accounts.registry,
            &protocol,
            yield_amount,
            protocol_fee_bps,
            treasury_fee_bps,
        )?;

        emit!(YieldDistributed {
            protocol,
            asset_mint,
            protocol_fee: split.protocol_fee,
            treasury_fee: split.treasury_fee,
            depositor_yield: split.depositor_yield,
            total_deposited: ctx.accounts.asset_state.total_deposited,
            timestamp: now,
        });
    }

    // INTERACTIONS: Pull the yield into the vault
    if yield_amount > 0 {
        let transfer_ctx = CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.funding_account.to_account_info(),
                to: ctx.accounts.vault_token_account.to_account_info(),
                authority: ctx.accounts.caller.to_account_info(),
            },
        );
        token::transfer(transfer_ctx, yield_amount)?;
    }

    emit!(AssetsReturned {
        protocol,
        asset_mint,
        user,
        amount,
        yield_amount,
        total_utilized: ctx.accounts.asset_state.total_utilized,
        timestamp: now,
    });

    Ok(())
}
