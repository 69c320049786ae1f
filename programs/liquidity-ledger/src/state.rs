use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::LedgerError;

/// Capability bits held by a principal
///
/// Every mutating entry point declares the minimum capability required;
/// the grant table below is the single source of truth for authorization.
pub const CAP_ADMIN: u8 = 1 << 0;
pub const CAP_KEEPER: u8 = 1 << 1;
pub const CAP_PROTOCOL: u8 = 1 << 2;
pub const CAP_GUARDIAN: u8 = 1 << 3;

/// Global ledger configuration
///
/// Security considerations:
/// - Admin stored in state (not instruction args)
/// - Fee policy validated at configuration time, never at distribution time
/// - Pause flag gates every mutating operation except emergency recovery
#[account]
pub struct LedgerConfig {
    /// Initial admin; capability grants are the authoritative record
    pub admin: Pubkey,

    /// Account credited with the treasury share of distributed yield
    pub treasury: Pubkey,

    /// Protocol fee on returned yield, in bps
    pub protocol_fee_bps: u16,

    /// Treasury fee on returned yield, in bps
    pub treasury_fee_bps: u16,

    /// Minimum seconds between two keeper-triggered rebalances of one asset
    pub min_rebalance_interval: i64,

    /// Fraction of idle capital (bps) committed by the opportunistic
    /// rebalance that runs on the deposit path
    pub deposit_sweep_bps: u16,

    /// Circuit breaker
    pub paused: bool,

    /// Bump seed for the config PDA
    pub bump: u8,

    // Padding for future upgrades
    pub _reserved: [u8; 64],
}

/// Per-principal capability grant
///
/// Replaces ad hoc authority flags with an explicit, auditable grant table.
/// A principal with no grant account holds no capabilities.
#[account]
pub struct CapabilityGrant {
    /// The principal this grant belongs to
    pub principal: Pubkey,

    /// Bitmask over CAP_ADMIN | CAP_KEEPER | CAP_PROTOCOL | CAP_GUARDIAN
    pub capabilities: u8,

    /// Bump seed for the grant PDA
    pub bump: u8,
}

impl CapabilityGrant {
    /// True if the grant holds at least one of the capabilities in `mask`
    pub fn holds(&self, mask: u8) -> bool {
        self.capabilities & mask != 0
    }
}

/// Authorization guard called at the top of every mutating operation
///
/// Fails closed with `Unauthorized` before any state is touched. The grant
/// PDA seeds already bind it to the signer; the principal field is checked
/// again so the guard stands on its own.
pub fn require_capability(
    grant: &CapabilityGrant,
    principal: &Pubkey,
    mask: u8,
) -> Result<()> {
    require_keys_eq!(grant.principal, *principal, LedgerError::Unauthorized);
    require!(grant.holds(mask), LedgerError::Unauthorized);
    Ok(())
}

/// Per-asset aggregate ledger state
///
/// Security considerations:
/// - `total_utilized <= total_deposited` is the solvency invariant; it is
///   re-checked after every mutation and a violation is fatal
/// - Balances are shares at a 1:1 initial price; yield compounds into
///   `total_deposited`, raising the pool-wide share price
#[account]
pub struct AssetState {
    /// Mint of the underlying asset token
    pub asset_mint: Pubkey,

    /// Total deposited units, including compounded yield
    pub total_deposited: u64,

    /// Units currently allocated to protocols (virtual, no custody moved)
    pub total_utilized: u64,

    /// Total shares issued to depositors
    pub total_shares: u64,

    /// Idle capital must exceed this before a rebalance is considered
    pub idle_threshold: u64,

    /// Last keeper-triggered rebalance; the opportunistic path never
    /// resets this clock
    pub last_rebalance_ts: i64,

    /// Treasury fee units accrued from distributed yield
    pub treasury_fees: u64,

    /// Deactivated assets accept no deposits or new allocations but stay
    /// withdrawable and returnable
    pub is_active: bool,

    /// Bump seed for the asset state PDA
    pub bump: u8,

    /// Bump seed for the vault authority PDA
    pub vault_authority_bump: u8,

    // Padding for future upgrades
    pub _reserved: [u8; 64],
}

impl AssetState {
    /// Deposited capital not currently allocated to any protocol
    pub fn available_liquidity(&self) -> Result<u64> {
        self.total_deposited
            .checked_sub(self.total_utilized)
            .ok_or(error!(LedgerError::LedgerImbalance))
    }

    /// Idle capital is exactly the available bucket
    pub fn idle_capital(&self) -> Result<u64> {
        self.available_liquidity()
    }

    /// Solvency invariant; unreachable given correct arithmetic
    pub fn check_solvency(&self) -> Result<()> {
        require!(
            self.total_utilized <= self.total_deposited,
            LedgerError::LedgerImbalance
        );
        Ok(())
    }

    /// Shares minted for a deposit of `assets`
    ///
    /// First deposit is 1:1; afterwards shares = assets * total_shares /
    /// total_deposited, floored. Uses u128 intermediates against overflow.
    pub fn shares_for_deposit(&self, assets: u64) -> Result<u64> {
        if self.total_shares == 0 || self.total_deposited == 0 {
            return Ok(assets);
        }

        let shares = (assets as u128)
            .checked_mul(self.total_shares as u128)
            .ok_or(error!(LedgerError::MathOverflow))?
            .checked_div(self.total_deposited as u128)
            .ok_or(error!(LedgerError::DivisionByZero))?;

        u64::try_from(shares).map_err(|_| error!(LedgerError::MathOverflow))
    }

    /// Asset value of `shares` at the current share price, floored
    pub fn assets_for_shares(&self, shares: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }

        let assets = (shares as u128)
            .checked_mul(self.total_deposited as u128)
            .ok_or(error!(LedgerError::MathOverflow))?
            .checked_div(self.total_shares as u128)
            .ok_or(error!(LedgerError::DivisionByZero))?;

        u64::try_from(assets).map_err(|_| error!(LedgerError::MathOverflow))
    }

    /// Shares that must be burned to withdraw `assets`
    ///
    /// Rounds up so rounding dust always favors the pool.
    pub fn shares_for_withdrawal(&self, assets: u64) -> Result<u64> {
        require!(self.total_deposited > 0, LedgerError::DivisionByZero);

        let numerator = (assets as u128)
            .checked_mul(self.total_shares as u128)
            .ok_or(error!(LedgerError::MathOverflow))?;
        let denominator = self.total_deposited as u128;
        let shares = numerator
            .checked_add(denominator - 1)
            .ok_or(error!(LedgerError::MathOverflow))?
            / denominator;

        u64::try_from(shares).map_err(|_| error!(LedgerError::MathOverflow))
    }

    /// Apply a deposit: mint shares and grow the pool. Returns shares minted.
    pub fn credit_deposit(&mut self, amount: u64) -> Result<u64> {
        let shares = self.shares_for_deposit(amount)?;

        self.total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(error!(LedgerError::MathOverflow))?;
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(error!(LedgerError::MathOverflow))?;

        self.check_solvency()?;
        Ok(shares)
    }

    /// Withdraw `amount` against a user's share balance. Returns the shares
    /// burned.
    ///
    /// Balance is checked before liquidity: a sufficient balance still
    /// fails with `InsufficientLiquidity` when the capital is allocated
    /// to protocols.
    pub fn withdraw_checked(&mut self, user_shares: &mut u64, amount: u64) -> Result<u64> {
        let balance_value = self.assets_for_shares(*user_shares)?;
        require!(amount <= balance_value, LedgerError::InsufficientBalance);
        require!(
            amount <= self.available_liquidity()?,
            LedgerError::InsufficientLiquidity
        );

        let shares = self.shares_for_withdrawal(amount)?;
        require!(shares <= *user_shares, LedgerError::InsufficientBalance);

        *user_shares -= shares;
        self.debit_withdrawal(amount, shares)?;
        Ok(shares)
    }

    /// Apply a withdrawal of `amount` worth `shares`
    pub fn debit_withdrawal(&mut self, amount: u64, shares: u64) -> Result<()> {
        self.total_deposited = self
            .total_deposited
            .checked_sub(amount)
            .ok_or(error!(LedgerError::MathOverflow))?;
        self.total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(error!(LedgerError::MathOverflow))?;

        self.check_solvency()
    }

    /// Move `amount` from the available bucket into utilization
    pub fn utilize(&mut self, amount: u64) -> Result<()> {
        self.total_utilized = self
            .total_utilized
            .checked_add(amount)
            .ok_or(error!(LedgerError::MathOverflow))?;
        self.check_solvency()
    }

    /// Release `amount` of utilized capital back to the available bucket
    pub fn release(&mut self, amount: u64) -> Result<()> {
        self.total_utilized = self
            .total_utilized
            .checked_sub(amount)
            .ok_or(error!(LedgerError::LedgerImbalance))?;
        self.check_solvency()
    }

    /// Crisis-path debit, bypassing balance accounting. Returns true when
    /// the asset was deactivated.
    ///
    /// Deposits shrink by at most the available bucket; draining deeper
    /// strands the outstanding allocations, so the asset is deactivated
    /// and `total_deposited` stops at the utilized floor.
    pub fn emergency_debit(&mut self, amount: u64) -> Result<bool> {
        require!(
            amount <= self.total_deposited,
            LedgerError::InsufficientLiquidity
        );

        let available = self.available_liquidity()?;
        let deactivate = amount > available;
        self.total_deposited -= amount.min(available);
        if deactivate {
            self.is_active = false;
        }

        self.check_solvency()?;
        Ok(deactivate)
    }

    /// Compound depositor yield into the pool, raising the share price
    pub fn compound_yield(&mut self, amount: u64) -> Result<()> {
        self.total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(error!(LedgerError::MathOverflow))?;
        self.check_solvency()
    }
}

/// Per-(user, asset) position, created lazily on first deposit and kept for
/// the lifetime of the system
#[account]
pub struct UserBalance {
    pub user: Pubkey,
    pub asset_mint: Pubkey,

    /// Share count; equals deposited units while no yield has compounded
    pub shares: u64,

    pub bump: u8,
}

/// Registry of protocols eligible to draw on pooled liquidity
///
/// A single bounded table so the selection scan in the allocation engine
/// has a fixed worst case. Entries are never removed, only deactivated,
/// so historical allocations always have an owner.
#[account]
pub struct ProtocolRegistry {
    pub protocols: Vec<ProtocolEntry>,

    /// Bump seed for the registry PDA
    pub bump: u8,
}

/// Individual registered protocol
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct ProtocolEntry {
    /// Stable protocol identifier
    pub id: Pubkey,

    /// Whether this protocol may receive new allocations
    pub is_active: bool,

    /// Set on re-activation; the entry rejoins selection only after its
    /// yield rate and risk score are refreshed explicitly
    pub needs_refresh: bool,

    /// Reported yield rate in bps
    pub yield_rate_bps: u16,

    /// Risk score 0..=100, lower is safer
    pub risk_score: u8,

    /// Hard cap on this protocol's allocation per asset
    pub max_capacity: u64,

    /// Per-asset virtual allocations and accrued protocol fees
    pub allocations: Vec<AssetAllocation>,
}

/// Per-asset allocation entry inside a protocol
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct AssetAllocation {
    pub asset_mint: Pubkey,

    /// Units of the asset currently assigned to the protocol
    pub amount: u64,

    /// Protocol fee units accrued from distributed yield
    pub fees_accrued: u64,
}

impl ProtocolEntry {
    /// Risk-adjusted score: yield discounted by the risk penalty.
    /// A protocol with risk 0 keeps full weight; risk 100 keeps 1%.
    /// Bounded inputs (bps <= u16::MAX, score <= 100) cannot overflow u64.
    pub fn risk_adjusted_score(&self) -> u64 {
        (self.yield_rate_bps as u64) * (101 - self.risk_score as u64) / 100
    }

    /// True if the entry may be picked by the allocation engine
    pub fn is_selectable(&self) -> bool {
        self.is_active && !self.needs_refresh
    }

    /// Current allocation of `asset_mint` to this protocol
    pub fn allocation_for(&self, asset_mint: &Pubkey) -> u64 {
        self.allocations
            .iter()
            .find(|a| a.asset_mint == *asset_mint)
            .map(|a| a.amount)
            .unwrap_or(0)
    }

    /// Capacity left for `asset_mint`; zero when the allocation table is
    /// full and the asset has no slot yet
    pub fn remaining_capacity(&self, asset_mint: &Pubkey) -> u64 {
        match self.allocations.iter().find(|a| a.asset_mint == *asset_mint) {
            Some(a) => self.max_capacity.saturating_sub(a.amount),
            None if self.allocations.len() >= MAX_ASSET_ALLOCATIONS => 0,
            None => self.max_capacity,
        }
    }

    /// Grow the allocation of `asset_mint`, enforcing the capacity cap
    pub fn add_allocation(&mut self, asset_mint: &Pubkey, amount: u64) -> Result<()> {
        let index = match self.allocations.iter().position(|a| a.asset_mint == *asset_mint) {
            Some(index) => index,
            None => {
                require!(
                    self.allocations.len() < MAX_ASSET_ALLOCATIONS,
                    LedgerError::AllocationTableFull
                );
                self.allocations.push(AssetAllocation {
                    asset_mint: *asset_mint,
                    amount: 0,
                    fees_accrued: 0,
                });
                self.allocations.len() - 1
            }
        };

        let max_capacity = self.max_capacity;
        let slot = &mut self.allocations[index];
        slot.amount = slot
            .amount
            .checked_add(amount)
            .ok_or(error!(LedgerError::MathOverflow))?;
        require!(slot.amount <= max_capacity, LedgerError::CapacityExceeded);
        Ok(())
    }

    /// Shrink the allocation of `asset_mint`
    pub fn reduce_allocation(&mut self, asset_mint: &Pubkey, amount: u64) -> Result<()> {
        let slot = self
            .allocations
            .iter_mut()
            .find(|a| a.asset_mint == *asset_mint)
            .ok_or(error!(LedgerError::InsufficientAllocation))?;

        slot.amount = slot
            .amount
            .checked_sub(amount)
            .ok_or(error!(LedgerError::InsufficientAllocation))?;
        Ok(())
    }

    /// Accrue protocol fee units against an existing allocation slot
    pub fn accrue_fees(&mut self, asset_mint: &Pubkey, fee: u64) -> Result<()> {
        let slot = self
            .allocations
            .iter_mut()
            .find(|a| a.asset_mint == *asset_mint)
            .ok_or(error!(LedgerError::InsufficientAllocation))?;

        slot.fees_accrued = slot
            .fees_accrued
            .checked_add(fee)
            .ok_or(error!(LedgerError::MathOverflow))?;
        Ok(())
    }
}

impl ProtocolRegistry {
    /// Space calculation: 8 (discriminator) + 4 (vec len) + fixed-size
    /// entries + 1 (bump) + 64 (padding). Each entry: 32 id + 1 active +
    /// 1 refresh + 2 rate + 1 score + 8 capacity + 4 (vec len) +
    /// allocations of (32 mint + 8 amount + 8 fees).
    pub const ENTRY_SPACE: usize = 32 + 1 + 1 + 2 + 1 + 8 + 4 + MAX_ASSET_ALLOCATIONS * 48;
    pub const SPACE: usize = 8 + 4 + MAX_PROTOCOLS * Self::ENTRY_SPACE + 1 + 64;

    pub fn find(&self, id: &Pubkey) -> Option<&ProtocolEntry> {
        self.protocols.iter().find(|p| p.id == *id)
    }

    pub fn find_mut(&mut self, id: &Pubkey) -> Option<&mut ProtocolEntry> {
        self.protocols.iter_mut().find(|p| p.id == *id)
    }

    /// Sum of all protocol allocations of one asset; must equal the asset's
    /// `total_utilized` at all times
    pub fn total_allocated_for(&self, asset_mint: &Pubkey) -> u64 {
        self.protocols
            .iter()
            .map(|p| p.allocation_for(asset_mint))
            .sum()
    }

    /// Pick the protocol with the strictly highest risk-adjusted score that
    /// is selectable and has spare capacity for `asset_mint`.
    ///
    /// Ties resolve to the earliest-registered entry; the scan order is the
    /// registration order and must stay deterministic.
    pub fn best_protocol_for(&self, asset_mint: &Pubkey) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (index, entry) in self.protocols.iter().enumerate() {
            if !entry.is_selectable() || entry.remaining_capacity(asset_mint) == 0 {
                continue;
            }
            let score = entry.risk_adjusted_score();
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }
}
