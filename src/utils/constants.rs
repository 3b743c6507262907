use alloy_primitives::{Address, U256, address};

pub const WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

pub const NATIVE: Address = Address::ZERO;

/// 1e18, the fixed-point scale of basket unit quantities and set units.
pub const PRECISE_UNIT: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

pub const FEE_DENOMINATOR_BPS: u32 = 10_000;

/// 0.3%, the constant-product default.
pub const DEFAULT_FEE_BPS: u32 = 30;
