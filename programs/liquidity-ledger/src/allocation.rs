use anchor_lang::prelude::*;

use crate::constants::BPS_DENOMINATOR;
use crate::errors::LedgerError;
use crate::state::{AssetState, LedgerConfig, ProtocolRegistry};

/// What caused a rebalance attempt
///
/// The two triggers size differently: the deposit path commits only a
/// configured fraction of idle capital so recent depositors retain
/// withdrawable liquidity, while the keeper path sweeps the full idle
/// amount. Only the keeper path resets the cooldown clock, so a partial
/// opportunistic commit never blocks the full sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebalanceTrigger {
    Deposit,
    Keeper,
}

/// A planned movement of idle capital into one protocol's allocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebalancePlan {
    /// Registry index of the selected protocol
    pub protocol_index: usize,
    pub amount: u64,
}

/// Decide whether a rebalance should happen and how much to move.
///
/// Returns `None` whenever the attempt is gated out: idle capital at or
/// under the threshold, cooldown still running, no selectable protocol
/// with spare capacity, or a sizing result of zero. A gated-out attempt
/// is a no-op for the caller, never an error.
pub fn plan_rebalance(
    asset: &AssetState,
    registry: &ProtocolRegistry,
    config: &LedgerConfig,
    now: i64,
    trigger: RebalanceTrigger,
) -> Result<Option<RebalancePlan>> {
    let idle = asset.idle_capital()?;
    if idle <= asset.idle_threshold {
        return Ok(None);
    }
    if now.saturating_sub(asset.last_rebalance_ts) < config.min_rebalance_interval {
        return Ok(None);
    }

    let protocol_index = match registry.best_protocol_for(&asset.asset_mint) {
        Some(index) => index,
        None => return Ok(None),
    };

    let requested = match trigger {
        RebalanceTrigger::Deposit => apply_bps(idle, config.deposit_sweep_bps)?,
        RebalanceTrigger::Keeper => idle,
    };

    let remaining = registry.protocols[protocol_index].remaining_capacity(&asset.asset_mint);
    let amount = requested.min(idle).min(remaining);
    if amount == 0 {
        return Ok(None);
    }

    Ok(Some(RebalancePlan { protocol_index, amount }))
}

/// Apply a plan: grow utilization and the protocol's allocation together.
///
/// The two mutations must never be split; the allocation-sum invariant
/// (`sum of allocations == total_utilized`) depends on it.
pub fn apply_allocation(
    asset: &mut AssetState,
    registry: &mut ProtocolRegistry,
    plan: RebalancePlan,
) -> Result<()> {
    let asset_mint = asset.asset_mint;
    registry.protocols[plan.protocol_index].add_allocation(&asset_mint, plan.amount)?;
    asset.utilize(plan.amount)
}

/// Caller-initiated access: identical in shape to an engine allocation,
/// but pulled on demand by a protocol instead of planned by the engine
pub fn access_allocation(
    asset: &mut AssetState,
    registry: &mut ProtocolRegistry,
    protocol: &Pubkey,
    amount: u64,
) -> Result<()> {
    let entry = registry
        .find_mut(protocol)
        .ok_or(error!(LedgerError::ProtocolNotFound))?;
    require!(entry.is_active, LedgerError::ProtocolNotActive);
    require!(
        amount <= asset.available_liquidity()?,
        LedgerError::InsufficientLiquidity
    );

    let asset_mint = asset.asset_mint;
    entry.add_allocation(&asset_mint, amount)?;
    asset.utilize(amount)
}

/// Unwind `amount` of a protocol's allocation
///
/// Carries no active-status checks: deactivated protocols and assets must
/// still be able to return capital.
pub fn release_allocation(
    asset: &mut AssetState,
    registry: &mut ProtocolRegistry,
    protocol: &Pubkey,
    amount: u64,
) -> Result<()> {
    let entry = registry
        .find_mut(protocol)
        .ok_or(error!(LedgerError::ProtocolNotFound))?;

    let asset_mint = asset.asset_mint;
    entry.reduce_allocation(&asset_mint, amount)?;
    asset.release(amount)
}

fn apply_bps(amount: u64, bps: u16) -> Result<u64> {
    let scaled = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(error!(LedgerError::MathOverflow))?
        / BPS_DENOMINATOR as u128;
    u64::try_from(scaled).map_err(|_| error!(LedgerError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ProtocolEntry;

    fn mock_config(min_rebalance_interval: i64, deposit_sweep_bps: u16) -> LedgerConfig {
        LedgerConfig {
            admin: Pubkey::default(),
            treasury: Pubkey::default(),
            protocol_fee_bps: 0,
            treasury_fee_bps: 0,
            min_rebalance_interval,
            deposit_sweep_bps,
            paused: false,
            bump: 0,
            _reserved: [0; 64],
        }
    }

    fn mock_asset(total_deposited: u64, idle_threshold: u64) -> AssetState {
        AssetState {
            asset_mint: Pubkey::new_unique(),
            total_deposited,
            total_utilized: 0,
            total_shares: total_deposited,
            idle_threshold,
            last_rebalance_ts: 0,
            treasury_fees: 0,
            is_active: true,
            bump: 0,
            vault_authority_bump: 0,
            _reserved: [0; 64],
        }
    }

    fn registry_with(entries: Vec<ProtocolEntry>) -> ProtocolRegistry {
        ProtocolRegistry { protocols: entries, bump: 0 }
    }

    fn mock_protocol(yield_rate_bps: u16, risk_score: u8, max_capacity: u64) -> ProtocolEntry {
        ProtocolEntry {
            id: Pubkey::new_unique(),
            is_active: true,
            needs_refresh: false,
            yield_rate_bps,
            risk_score,
            max_capacity,
            allocations: Vec::new(),
        }
    }

    #[test]
    fn test_keeper_sweeps_full_idle() {
        let asset = mock_asset(1000, 100);
        let registry = registry_with(vec![mock_protocol(500, 20, 10_000)]);
        let config = mock_config(3600, 5_000);

        let plan = plan_rebalance(&asset, &registry, &config, 3600, RebalanceTrigger::Keeper)
            .unwrap()
            .unwrap();
        assert_eq!(plan.protocol_index, 0);
        assert_eq!(plan.amount, 1000);
    }

    #[test]
    fn test_deposit_trigger_commits_configured_fraction() {
        let asset = mock_asset(1000, 100);
        let registry = registry_with(vec![mock_protocol(500, 20, 10_000)]);
        let config = mock_config(3600, 5_000);

        let plan = plan_rebalance(&asset, &registry, &config, 3600, RebalanceTrigger::Deposit)
            .unwrap()
            .unwrap();
        assert_eq!(plan.amount, 500);

        // A different policy factor scales the commitment
        let config = mock_config(3600, 2_500);
        let plan = plan_rebalance(&asset, &registry, &config, 3600, RebalanceTrigger::Deposit)
            .unwrap()
            .unwrap();
        assert_eq!(plan.amount, 250);
    }

    #[test]
    fn test_idle_at_threshold_is_gated() {
        // Gate requires idle strictly above the threshold
        let asset = mock_asset(1000, 1000);
        let registry = registry_with(vec![mock_protocol(500, 20, 10_000)]);
        let config = mock_config(0, 5_000);

        let plan = plan_rebalance(&asset, &registry, &config, 100, RebalanceTrigger::Keeper).unwrap();
        assert_eq!(plan, None);
    }

    #[test]
    fn test_cooldown_gates_until_elapsed() {
        let mut asset = mock_asset(1000, 100);
        asset.last_rebalance_ts = 1_000;
        let registry = registry_with(vec![mock_protocol(500, 20, 10_000)]);
        let config = mock_config(600, 5_000);

        let gated =
            plan_rebalance(&asset, &registry, &config, 1_599, RebalanceTrigger::Keeper).unwrap();
        assert_eq!(gated, None);

        let open =
            plan_rebalance(&asset, &registry, &config, 1_600, RebalanceTrigger::Keeper).unwrap();
        assert!(open.is_some());
    }

    #[test]
    fn test_amount_capped_by_remaining_capacity() {
        let asset = mock_asset(1000, 100);
        let mut protocol = mock_protocol(500, 20, 600);
        protocol.add_allocation(&asset.asset_mint, 200).unwrap();
        let registry = registry_with(vec![protocol]);
        let config = mock_config(0, 5_000);

        let plan = plan_rebalance(&asset, &registry, &config, 100, RebalanceTrigger::Keeper)
            .unwrap()
            .unwrap();
        assert_eq!(plan.amount, 400);
    }

    #[test]
    fn test_no_qualifying_protocol_is_noop() {
        let asset = mock_asset(1000, 100);
        let mut protocol = mock_protocol(500, 20, 10_000);
        protocol.is_active = false;
        let registry = registry_with(vec![protocol]);
        let config = mock_config(0, 5_000);

        let plan = plan_rebalance(&asset, &registry, &config, 100, RebalanceTrigger::Keeper).unwrap();
        assert_eq!(plan, None);
    }

    #[test]
    fn test_apply_allocation_moves_both_sides() {
        let mut asset = mock_asset(1000, 100);
        let mut registry = registry_with(vec![mock_protocol(500, 20, 10_000)]);
        let config = mock_config(0, 5_000);

        let plan = plan_rebalance(&asset, &registry, &config, 100, RebalanceTrigger::Keeper)
            .unwrap()
            .unwrap();
        apply_allocation(&mut asset, &mut registry, plan).unwrap();

        assert_eq!(asset.total_utilized, 1000);
        assert_eq!(registry.protocols[0].allocation_for(&asset.asset_mint), 1000);
        assert_eq!(
            registry.total_allocated_for(&asset.asset_mint),
            asset.total_utilized
        );
    }

    #[test]
    fn test_worked_selection_example() {
        // Two protocols: 500 bps at risk 20 scores 405, 800 bps at risk 40
        // scores 488; the second wins and takes the full 1000 idle.
        let asset = mock_asset(1000, 0);
        let registry = registry_with(vec![
            mock_protocol(500, 20, 10_000),
            mock_protocol(800, 40, 10_000),
        ]);
        let config = mock_config(0, 5_000);

        let plan = plan_rebalance(&asset, &registry, &config, 100, RebalanceTrigger::Keeper)
            .unwrap()
            .unwrap();
        assert_eq!(plan.protocol_index, 1);
        assert_eq!(plan.amount, 1000);
    }
}
