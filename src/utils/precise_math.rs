use crate::errors::{RouterError, RouterResult};
use crate::utils::constants::PRECISE_UNIT;
use alloy_primitives::U256;

/// `a * b / 1e18`, rounded down.
pub fn precise_mul(a: U256, b: U256) -> RouterResult<U256> {
    Ok(a.checked_mul(b).ok_or(RouterError::ArithmeticOverflow)? / PRECISE_UNIT)
}

/// `a * b / 1e18`, rounded up.
pub fn precise_mul_ceil(a: U256, b: U256) -> RouterResult<U256> {
    if a.is_zero() || b.is_zero() {
        return Ok(U256::ZERO);
    }
    let product = a.checked_mul(b).ok_or(RouterError::ArithmeticOverflow)?;
    Ok((product - U256::from(1)) / PRECISE_UNIT + U256::from(1))
}

/// `a * 1e18 / b`, rounded down.
pub fn precise_div(a: U256, b: U256) -> RouterResult<U256> {
    if b.is_zero() {
        return Err(RouterError::ArithmeticOverflow);
    }
    Ok(a.checked_mul(PRECISE_UNIT).ok_or(RouterError::ArithmeticOverflow)? / b)
}
