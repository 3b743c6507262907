use super::pricing::PricingOracle;
use super::venues::VenueId;
use crate::errors::{RouterError, RouterResult};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

/// Which side of a swap is fixed.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    ExactInput,
    ExactOutput,
}

/// The priced result of one swap leg on one venue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub venue: VenueId,
    pub direction: Direction,
    pub asset_in: Address,
    pub asset_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
}

/// How a component is obtained from (or turned into) the hub asset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegRoute {
    /// The component is the hub asset itself.
    Hub,
    /// The component is the request's own input (issue) or output (redeem) token and is
    /// moved to or from the caller without a swap.
    Passthrough,
    Swap(Quote),
}

impl LegRoute {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            LegRoute::Swap(quote) => Some(quote),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLeg {
    pub component: Address,
    pub unit_quantity: U256,
    /// Component amount bought (issue) or sold (redeem).
    pub component_amount: U256,
    /// Hub amount spent (issue) or received (redeem). Zero for [`LegRoute::Passthrough`].
    pub hub_amount: U256,
    /// Component amount left over after minting, returned to the caller.
    pub residual: U256,
    pub route: LegRoute,
}

/// Everything one request will settle, priced against a single [`ReserveSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPlan {
    pub basket: Address,
    pub hub: Address,
    pub set_units: U256,
    /// Input -> hub (issue) or hub -> output (redeem). `None` when that side is the hub itself.
    pub hub_leg: Option<Quote>,
    pub legs: Vec<ComponentLeg>,
    /// Hub amount routed through the component legs.
    pub hub_total: U256,
    /// Hub rounding dust not assigned to any leg, returned to the caller.
    pub hub_residual: U256,
    pub total_input: U256,
    pub total_output: U256,
}

impl RoutingPlan {
    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.legs.iter().filter_map(|leg| leg.route.quote())
    }
}

/// Venue reserves for every pair a request touches, captured once per request.
#[derive(Debug, Clone, Default)]
pub struct ReserveSnapshot {
    /// One oracle per venue, in tie-break order
    oracles: Vec<PricingOracle>,
    /// (venue, lower address, higher address) -> (reserve of lower, reserve of higher)
    pool_reserves: HashMap<(VenueId, Address, Address), (U256, U256)>,
}

impl ReserveSnapshot {
    pub fn new(mut oracles: Vec<PricingOracle>) -> Self {
        oracles.sort_by_key(|oracle| oracle.venue());
        Self { oracles, pool_reserves: HashMap::new() }
    }

    pub fn oracles(&self) -> &[PricingOracle] {
        &self.oracles
    }

    pub fn set_pool_reserves(&mut self, venue: VenueId, asset_in: Address, asset_out: Address, reserve_in: U256, reserve_out: U256) {
        if asset_in < asset_out {
            self.pool_reserves.insert((venue, asset_in, asset_out), (reserve_in, reserve_out));
        } else {
            self.pool_reserves.insert((venue, asset_out, asset_in), (reserve_out, reserve_in));
        }
    }

    /// `(reserve_in, reserve_out)` for the direction `asset_in -> asset_out`.
    pub fn get_pool_reserves(&self, venue: VenueId, asset_in: Address, asset_out: Address) -> Option<(U256, U256)> {
        if asset_in < asset_out {
            self.pool_reserves.get(&(venue, asset_in, asset_out)).copied()
        } else {
            self.pool_reserves.get(&(venue, asset_out, asset_in)).map(|(lower, higher)| (*higher, *lower))
        }
    }

    pub fn has_pool(&self, asset_in: Address, asset_out: Address) -> bool {
        self.oracles.iter().any(|oracle| self.get_pool_reserves(oracle.venue(), asset_in, asset_out).is_some())
    }

    pub fn pools_count(&self) -> usize {
        self.pool_reserves.len()
    }

    /// Move the reserves of the quoted pool as the swap would, so later legs of the
    /// same request are priced against the state settlement will see.
    pub fn apply_quote(&mut self, quote: &Quote) -> RouterResult<()> {
        let (reserve_in, reserve_out) = self
            .get_pool_reserves(quote.venue, quote.asset_in, quote.asset_out)
            .ok_or(RouterError::NoLiquidityPath { asset_in: quote.asset_in, asset_out: quote.asset_out })?;

        let reserve_in = reserve_in.checked_add(quote.amount_in).ok_or(RouterError::ArithmeticOverflow)?;
        let reserve_out = reserve_out.checked_sub(quote.amount_out).ok_or(RouterError::InsufficientLiquidity {
            venue: quote.venue,
            requested: quote.amount_out,
            reserve: reserve_out,
        })?;

        self.set_pool_reserves(quote.venue, quote.asset_in, quote.asset_out, reserve_in, reserve_out);
        Ok(())
    }
}
