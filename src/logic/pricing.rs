use crate::errors::{RouterError, RouterResult};
use crate::logic::venues::VenueId;
use crate::utils::constants::FEE_DENOMINATOR_BPS;
use alloy_primitives::U256;

/// Constant-product pricing for a single pool, with the fee taken from the input leg.
///
/// All functions are pure over the reserve pair they are given.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PricingOracle {
    venue: VenueId,
    fee_bps: u32,
}

impl PricingOracle {
    pub fn new(venue: VenueId, fee_bps: u32) -> Self {
        Self { venue, fee_bps }
    }

    pub fn venue(&self) -> VenueId {
        self.venue
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    fn fee_multiplier(&self) -> RouterResult<U256> {
        FEE_DENOMINATOR_BPS.checked_sub(self.fee_bps).map(U256::from).ok_or(RouterError::ArithmeticOverflow)
    }

    /// `amount_out = amount_in_with_fee * reserve_out / (reserve_in * 10000 + amount_in_with_fee)`
    pub fn amount_out(&self, reserve_in: U256, reserve_out: U256, amount_in: U256) -> RouterResult<U256> {
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(RouterError::InvalidReserves);
        }
        if amount_in.is_zero() {
            return Ok(U256::ZERO);
        }

        let amount_in_with_fee = mul(amount_in, self.fee_multiplier()?)?;
        let numerator = mul(amount_in_with_fee, reserve_out)?;
        let denominator = mul(reserve_in, U256::from(FEE_DENOMINATOR_BPS))?
            .checked_add(amount_in_with_fee)
            .ok_or(RouterError::ArithmeticOverflow)?;

        Ok(numerator / denominator)
    }

    /// Inverse of [`Self::amount_out`]. Rounded up so that swapping the returned amount
    /// yields at least `amount_out`.
    pub fn amount_in(&self, reserve_in: U256, reserve_out: U256, amount_out: U256) -> RouterResult<U256> {
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(RouterError::InvalidReserves);
        }
        if amount_out >= reserve_out {
            return Err(RouterError::InsufficientLiquidity { venue: self.venue, requested: amount_out, reserve: reserve_out });
        }
        if amount_out.is_zero() {
            return Ok(U256::ZERO);
        }

        let numerator = mul(mul(reserve_in, amount_out)?, U256::from(FEE_DENOMINATOR_BPS))?;
        let denominator = mul(reserve_out - amount_out, self.fee_multiplier()?)?;
        if denominator.is_zero() {
            return Err(RouterError::ArithmeticOverflow);
        }

        Ok(numerator / denominator + U256::from(1))
    }
}

fn mul(a: U256, b: U256) -> RouterResult<U256> {
    a.checked_mul(b).ok_or(RouterError::ArithmeticOverflow)
}
