//! In-memory stand-ins for every external collaborator: a token ledger, constant-product pools
//! for each venue, the wrapped-native contract and the issuance module.
use crate::data_sync::{BasketComponent, IssuanceModule};
use crate::execution::{FundsCustody, WrappedNativeAdapter};
use crate::logic::pricing::PricingOracle;
use crate::logic::venues::{Venue, VenueId};
use crate::utils::{Asset, precise_mul, precise_mul_ceil};
use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use eyre::{Result, eyre};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Address the router holds its in-flight balances under.
pub const ROUTER: Address = Address::repeat_byte(0x42);

#[derive(Clone, Debug)]
struct MockBasket {
    components: Vec<BasketComponent>,
    eligible: bool,
}

pub struct InMemoryChain {
    wrapped_native: Address,
    balances: DashMap<(Address, Asset), U256>,
    /// (venue, lower address, higher address) -> (reserve of lower, reserve of higher)
    pools: DashMap<(VenueId, Address, Address), (U256, U256)>,
    baskets: DashMap<Address, MockBasket>,
    reserve_reads: AtomicUsize,
}

impl InMemoryChain {
    pub fn new(wrapped_native: Address) -> Self {
        Self {
            wrapped_native,
            balances: DashMap::new(),
            pools: DashMap::new(),
            baskets: DashMap::new(),
            reserve_reads: AtomicUsize::new(0),
        }
    }

    pub fn fund(&self, holder: Address, asset: Asset, amount: U256) {
        *self.balances.entry((holder, asset)).or_default() += amount;
    }

    pub fn balance_of(&self, holder: Address, asset: Asset) -> U256 {
        self.balances.get(&(holder, asset)).map(|balance| *balance).unwrap_or_default()
    }

    fn credit(&self, holder: Address, asset: Asset, amount: U256) {
        self.fund(holder, asset, amount)
    }

    fn debit(&self, holder: Address, asset: Asset, amount: U256) -> Result<()> {
        let mut balance = self.balances.entry((holder, asset)).or_default();
        if *balance < amount {
            return Err(eyre!("{} holds {} of {}, needs {}", holder, *balance, asset, amount));
        }
        *balance -= amount;
        Ok(())
    }

    pub fn add_liquidity(&self, venue: VenueId, token_a: Address, token_b: Address, reserve_a: U256, reserve_b: U256) {
        let (key, value) = Self::pool_key(venue, token_a, token_b, reserve_a, reserve_b);
        let mut pool = self.pools.entry(key).or_default();
        pool.0 += value.0;
        pool.1 += value.1;
    }

    /// `(reserve_in, reserve_out)` for the direction `asset_in -> asset_out`.
    pub fn pool_reserves(&self, venue: VenueId, asset_in: Address, asset_out: Address) -> Option<(U256, U256)> {
        if asset_in < asset_out {
            self.pools.get(&(venue, asset_in, asset_out)).map(|pool| *pool)
        } else {
            self.pools.get(&(venue, asset_out, asset_in)).map(|pool| (pool.1, pool.0))
        }
    }

    fn set_pool_reserves(&self, venue: VenueId, asset_in: Address, asset_out: Address, reserve_in: U256, reserve_out: U256) {
        let (key, value) = Self::pool_key(venue, asset_in, asset_out, reserve_in, reserve_out);
        self.pools.insert(key, value);
    }

    fn pool_key(
        venue: VenueId,
        token_a: Address,
        token_b: Address,
        reserve_a: U256,
        reserve_b: U256,
    ) -> ((VenueId, Address, Address), (U256, U256)) {
        if token_a < token_b {
            ((venue, token_a, token_b), (reserve_a, reserve_b))
        } else {
            ((venue, token_b, token_a), (reserve_b, reserve_a))
        }
    }

    pub fn register_basket(&self, id: Address, components: Vec<BasketComponent>) {
        self.baskets.insert(id, MockBasket { components, eligible: true });
    }

    /// Marks the basket as holding a position that cannot be moved by a plain transfer.
    pub fn flag_external_position(&self, id: Address) {
        if let Some(mut basket) = self.baskets.get_mut(&id) {
            basket.eligible = false;
        }
    }

    /// Number of venue reserve reads served so far.
    pub fn reserve_reads(&self) -> usize {
        self.reserve_reads.load(Ordering::Relaxed)
    }

    pub fn venue(self: &Arc<Self>, id: VenueId, fee_bps: u32) -> InMemoryVenue {
        InMemoryVenue { chain: self.clone(), id, name: id.to_string().to_lowercase(), fee_bps }
    }

    fn components(&self, basket: Address) -> Result<Vec<BasketComponent>> {
        self.baskets.get(&basket).map(|basket| basket.components.clone()).ok_or_else(|| eyre!("unknown basket {}", basket))
    }
}

impl IssuanceModule for InMemoryChain {
    fn get_components(&self, basket: Address) -> Result<Vec<BasketComponent>> {
        Ok(self.baskets.get(&basket).map(|basket| basket.components.clone()).unwrap_or_default())
    }

    fn is_eligible(&self, basket: Address) -> Result<bool> {
        Ok(self.baskets.get(&basket).map(|basket| basket.eligible).unwrap_or(false))
    }

    fn mint(&self, basket: Address, units: U256, recipient: Address) -> Result<()> {
        for component in self.components(basket)? {
            self.debit(ROUTER, Asset::token(component.asset), precise_mul_ceil(component.unit_quantity, units)?)?;
        }
        self.credit(recipient, Asset::token(basket), units);
        Ok(())
    }

    fn burn(&self, basket: Address, units: U256, owner: Address) -> Result<()> {
        let components = self.components(basket)?;
        self.debit(owner, Asset::token(basket), units)?;
        for component in components {
            self.credit(ROUTER, Asset::token(component.asset), precise_mul(component.unit_quantity, units)?);
        }
        Ok(())
    }
}

impl FundsCustody for InMemoryChain {
    fn pull(&self, from: Address, asset: Asset, amount: U256) -> Result<()> {
        self.debit(from, asset, amount)?;
        self.credit(ROUTER, asset, amount);
        Ok(())
    }

    fn push(&self, to: Address, asset: Asset, amount: U256) -> Result<()> {
        self.debit(ROUTER, asset, amount)?;
        self.credit(to, asset, amount);
        Ok(())
    }
}

impl WrappedNativeAdapter for InMemoryChain {
    fn wrap(&self, amount: U256) -> Result<()> {
        self.debit(ROUTER, Asset::Native, amount)?;
        self.credit(ROUTER, Asset::Token(self.wrapped_native), amount);
        Ok(())
    }

    fn unwrap(&self, amount: U256) -> Result<()> {
        self.debit(ROUTER, Asset::Token(self.wrapped_native), amount)?;
        self.credit(ROUTER, Asset::Native, amount);
        Ok(())
    }
}

/// A constant-product venue whose pools live in an [`InMemoryChain`]. Swaps trade against the
/// router's balance.
pub struct InMemoryVenue {
    chain: Arc<InMemoryChain>,
    id: VenueId,
    name: String,
    fee_bps: u32,
}

impl InMemoryVenue {
    fn oracle(&self) -> PricingOracle {
        PricingOracle::new(self.id, self.fee_bps)
    }

    fn settle_swap(&self, asset_in: Address, asset_out: Address, amount_in: U256, amount_out: U256) -> Result<()> {
        let (reserve_in, reserve_out) =
            self.chain.pool_reserves(self.id, asset_in, asset_out).ok_or_else(|| eyre!("no pool for {} -> {}", asset_in, asset_out))?;
        self.chain.debit(ROUTER, Asset::token(asset_in), amount_in)?;
        self.chain.credit(ROUTER, Asset::token(asset_out), amount_out);
        self.chain.set_pool_reserves(self.id, asset_in, asset_out, reserve_in + amount_in, reserve_out - amount_out);
        Ok(())
    }

    fn reserves(&self, asset_in: Address, asset_out: Address) -> Result<(U256, U256)> {
        self.chain.pool_reserves(self.id, asset_in, asset_out).ok_or_else(|| eyre!("no pool for {} -> {}", asset_in, asset_out))
    }
}

impl Venue for InMemoryVenue {
    fn get_id(&self) -> VenueId {
        self.id
    }

    fn get_name(&self) -> String {
        self.name.clone()
    }

    fn get_fee_bps(&self) -> u32 {
        self.fee_bps
    }

    fn get_reserves(&self, asset_in: Address, asset_out: Address) -> Result<Option<(U256, U256)>> {
        self.chain.reserve_reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.chain.pool_reserves(self.id, asset_in, asset_out))
    }

    fn swap_exact_in(&self, asset_in: Address, asset_out: Address, amount_in: U256, min_amount_out: U256) -> Result<U256> {
        let (reserve_in, reserve_out) = self.reserves(asset_in, asset_out)?;
        let amount_out = self.oracle().amount_out(reserve_in, reserve_out, amount_in)?;
        if amount_out < min_amount_out {
            return Err(eyre!("INSUFFICIENT_OUTPUT_AMOUNT"));
        }
        self.settle_swap(asset_in, asset_out, amount_in, amount_out)?;
        Ok(amount_out)
    }

    fn swap_exact_out(&self, asset_in: Address, asset_out: Address, amount_out: U256, max_amount_in: U256) -> Result<U256> {
        let (reserve_in, reserve_out) = self.reserves(asset_in, asset_out)?;
        let amount_in = self.oracle().amount_in(reserve_in, reserve_out, amount_out)?;
        if amount_in > max_amount_in {
            return Err(eyre!("EXCESSIVE_INPUT_AMOUNT"));
        }
        self.settle_swap(asset_in, asset_out, amount_in, amount_out)?;
        Ok(amount_in)
    }
}
