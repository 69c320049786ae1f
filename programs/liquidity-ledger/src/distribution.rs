use anchor_lang::prelude::*;

use crate::constants::BPS_DENOMINATOR;
use crate::errors::LedgerError;
use crate::state::{AssetState, ProtocolRegistry};

/// Split of a returned yield amount
///
/// The three parts always sum to the input: fees are floored bps cuts and
/// the depositor share is the exact remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YieldSplit {
    pub protocol_fee: u64,
    pub treasury_fee: u64,
    pub depositor_yield: u64,
}

/// Fee policy gate, applied when fees are configured - never at
/// distribution time
pub fn validate_fee_config(protocol_fee_bps: u16, treasury_fee_bps: u16) -> Result<()> {
    require!(
        protocol_fee_bps as u64 + treasury_fee_bps as u64 <= BPS_DENOMINATOR,
        LedgerError::InvalidFeeConfig
    );
    Ok(())
}

/// Split `amount` of yield into protocol fee, treasury fee, and the
/// depositor share that compounds back into the pool
pub fn split_yield(amount: u64, protocol_fee_bps: u16, treasury_fee_bps: u16) -> Result<YieldSplit> {
    let protocol_fee = bps_cut(amount, protocol_fee_bps)?;
    let treasury_fee = bps_cut(amount, treasury_fee_bps)?;

    let depositor_yield = amount
        .checked_sub(protocol_fee)
        .and_then(|rest| rest.checked_sub(treasury_fee))
        .ok_or(error!(LedgerError::MathOverflow))?;

    Ok(YieldSplit {
        protocol_fee,
        treasury_fee,
        depositor_yield,
    })
}

/// Split returned yield and book every part: protocol fee accrues on the
/// returning protocol's allocation slot, treasury fee on the asset, and
/// the depositor share compounds into the pool
pub fn distribute_yield(
    asset: &mut AssetState,
    registry: &mut ProtocolRegistry,
    protocol: &Pubkey,
    amount: u64,
    protocol_fee_bps: u16,
    treasury_fee_bps: u16,
) -> Result<YieldSplit> {
    let split = split_yield(amount, protocol_fee_bps, treasury_fee_bps)?;

    let asset_mint = asset.asset_mint;
    let entry = registry
        .find_mut(protocol)
        .ok_or(error!(LedgerError::ProtocolNotFound))?;
    entry.accrue_fees(&asset_mint, split.protocol_fee)?;

    asset.treasury_fees = asset
        .treasury_fees
        .checked_add(split.treasury_fee)
        .ok_or(error!(LedgerError::MathOverflow))?;
    asset.compound_yield(split.depositor_yield)?;

    Ok(split)
}

fn bps_cut(amount: u64, bps: u16) -> Result<u64> {
    let cut = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(error!(LedgerError::MathOverflow))?
        / BPS_DENOMINATOR as u128;
    u64::try_from(cut).map_err(|_| error!(LedgerError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_parts_sum_to_input() {
        let split = split_yield(50, 1_000, 500).unwrap();
        // 10% protocol, 5% treasury, remainder to depositors
        assert_eq!(split.protocol_fee, 5);
        assert_eq!(split.treasury_fee, 2);
        assert_eq!(split.depositor_yield, 43);
        assert_eq!(
            split.protocol_fee + split.treasury_fee + split.depositor_yield,
            50
        );
    }

    #[test]
    fn test_split_with_zero_fees() {
        let split = split_yield(1_000, 0, 0).unwrap();
        assert_eq!(split.protocol_fee, 0);
        assert_eq!(split.treasury_fee, 0);
        assert_eq!(split.depositor_yield, 1_000);
    }

    #[test]
    fn test_split_with_full_fees_leaves_nothing() {
        let split = split_yield(1_000, 6_000, 4_000).unwrap();
        assert_eq!(split.depositor_yield, 0);
        assert_eq!(split.protocol_fee + split.treasury_fee, 1_000);
    }

    #[test]
    fn test_rounding_dust_goes_to_depositors() {
        // 33 bps of 101 = 0.3333 -> 0; the dust stays in the depositor share
        let split = split_yield(101, 33, 33).unwrap();
        assert_eq!(split.protocol_fee, 0);
        assert_eq!(split.treasury_fee, 0);
        assert_eq!(split.depositor_yield, 101);
    }

    #[test]
    fn test_fee_config_validation() {
        assert!(validate_fee_config(1_000, 500).is_ok());
        assert!(validate_fee_config(5_000, 5_000).is_ok());
        assert!(validate_fee_config(5_001, 5_000).is_err());
        assert!(validate_fee_config(10_001, 0).is_err());
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let split = split_yield(u64::MAX, 1_000, 500).unwrap();
        assert_eq!(
            split.protocol_fee + split.treasury_fee + split.depositor_yield,
            u64::MAX
        );
    }
}
