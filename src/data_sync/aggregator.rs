use crate::errors::{RouterError, RouterResult};
use crate::logic::pricing::PricingOracle;
use crate::logic::types::ReserveSnapshot;
use crate::logic::venues::VenueRegistry;
use alloy_primitives::Address;
use std::time::Instant;
use tracing::debug;

/// Reads the reserves of every requested pair from every venue into one [`ReserveSnapshot`].
pub struct ReserveAggregator<'a> {
    venues: &'a VenueRegistry,
}

impl<'a> ReserveAggregator<'a> {
    pub fn new(venues: &'a VenueRegistry) -> Self {
        Self { venues }
    }

    /// Each pair is read once per venue. Pools with an empty side are left out, and a pair no
    /// venue can trade fails with `NoLiquidityPath` before anything is priced.
    pub fn capture(&self, pairs: &[(Address, Address)]) -> RouterResult<ReserveSnapshot> {
        let start_time = Instant::now();

        let oracles = self.venues.iter().map(|venue| PricingOracle::new(venue.get_id(), venue.get_fee_bps())).collect();
        let mut snapshot = ReserveSnapshot::new(oracles);

        for (asset_in, asset_out) in pairs {
            if snapshot.has_pool(*asset_in, *asset_out) {
                continue;
            }
            for venue in self.venues.iter() {
                match venue.get_reserves(*asset_in, *asset_out)? {
                    Some((reserve_in, reserve_out)) if !reserve_in.is_zero() && !reserve_out.is_zero() => {
                        snapshot.set_pool_reserves(venue.get_id(), *asset_in, *asset_out, reserve_in, reserve_out);
                    }
                    _ => debug!("{} has no pool for {} -> {}", venue.get_id(), asset_in, asset_out),
                }
            }
            if !snapshot.has_pool(*asset_in, *asset_out) {
                return Err(RouterError::NoLiquidityPath { asset_in: *asset_in, asset_out: *asset_out });
            }
        }

        debug!("Captured {} pools for {} pairs in {:?}", snapshot.pools_count(), pairs.len(), start_time.elapsed());
        Ok(snapshot)
    }
}
