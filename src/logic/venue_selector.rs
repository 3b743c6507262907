use super::pricing::PricingOracle;
use super::types::{Direction, Quote, ReserveSnapshot};
use crate::errors::{RouterError, RouterResult};
use alloy_primitives::{Address, U256};
use tracing::{debug, warn};

/// Picks, for one leg, the venue that is strictly better for the caller.
///
/// `ExactInput` prefers the larger output, `ExactOutput` the smaller input. Ties keep the
/// venue that comes first in the snapshot, i.e. the primary venue. Venues without a pool for
/// the pair are not considered. A venue whose pool is too shallow for an exact-output leg is
/// skipped as long as another venue can fill it.
pub struct VenueSelector<'a> {
    snapshot: &'a ReserveSnapshot,
}

impl<'a> VenueSelector<'a> {
    pub fn new(snapshot: &'a ReserveSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn quote_on(
        &self,
        oracle: &PricingOracle,
        asset_in: Address,
        asset_out: Address,
        amount: U256,
        direction: Direction,
    ) -> RouterResult<Option<Quote>> {
        let Some((reserve_in, reserve_out)) = self.snapshot.get_pool_reserves(oracle.venue(), asset_in, asset_out) else {
            return Ok(None);
        };

        let (amount_in, amount_out) = match direction {
            Direction::ExactInput => (amount, oracle.amount_out(reserve_in, reserve_out, amount)?),
            Direction::ExactOutput => (oracle.amount_in(reserve_in, reserve_out, amount)?, amount),
        };

        Ok(Some(Quote { venue: oracle.venue(), direction, asset_in, asset_out, amount_in, amount_out }))
    }

    pub fn best_quote(&self, asset_in: Address, asset_out: Address, amount: U256, direction: Direction) -> RouterResult<Quote> {
        let mut best: Option<Quote> = None;
        let mut shallow: Option<RouterError> = None;

        for oracle in self.snapshot.oracles() {
            let quote = match self.quote_on(oracle, asset_in, asset_out, amount, direction) {
                Ok(Some(quote)) => quote,
                Ok(None) => continue,
                Err(err @ RouterError::InsufficientLiquidity { .. }) => {
                    warn!("Skipping {} for {} -> {}: {}", oracle.venue(), asset_in, asset_out, err);
                    shallow = Some(err);
                    continue;
                }
                Err(err) => return Err(err),
            };

            let better = match (&best, direction) {
                (None, _) => true,
                (Some(current), Direction::ExactInput) => quote.amount_out > current.amount_out,
                (Some(current), Direction::ExactOutput) => quote.amount_in < current.amount_in,
            };
            if better {
                best = Some(quote);
            }
        }

        match best {
            Some(quote) => {
                debug!(
                    "Selected {} for {} -> {} ({}): in={} out={}",
                    quote.venue, asset_in, asset_out, direction, quote.amount_in, quote.amount_out
                );
                Ok(quote)
            }
            None => Err(shallow.unwrap_or(RouterError::NoLiquidityPath { asset_in, asset_out })),
        }
    }
}
