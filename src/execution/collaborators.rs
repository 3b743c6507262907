use crate::utils::Asset;
use alloy_primitives::{Address, U256};
use eyre::Result;

/// Moves request funds between a caller and the router.
pub trait FundsCustody: Send + Sync {
    /// Takes `amount` of `asset` from `from` into the router. For [`Asset::Native`] this is the
    /// value attached to the request.
    fn pull(&self, from: Address, asset: Asset, amount: U256) -> Result<()>;

    /// Sends `amount` of `asset` held by the router to `to`.
    fn push(&self, to: Address, asset: Asset, amount: U256) -> Result<()>;
}

/// Converts between native currency and the wrapped-native token, 1:1, on the router's balance.
pub trait WrappedNativeAdapter: Send + Sync {
    fn wrap(&self, amount: U256) -> Result<()>;

    fn unwrap(&self, amount: U256) -> Result<()>;
}
