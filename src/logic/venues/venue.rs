use crate::utils::constants::DEFAULT_FEE_BPS;
use alloy_primitives::{Address, U256};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;
use strum_macros::{Display, EnumIter, EnumString, VariantNames};

/// The AMM venues a request can route through. Declaration order is the tie-break order.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, VariantNames, EnumIter, Deserialize, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueId {
    Primary,
    Secondary,
}

/// A constant-product AMM venue. Reserves are read-only inputs to pricing, the swap calls
/// are only issued by settlement.
pub trait Venue: Sync + Send {
    fn get_id(&self) -> VenueId;

    fn get_name(&self) -> String {
        self.get_id().to_string()
    }

    /// Trading fee deducted from the input leg, in basis points.
    fn get_fee_bps(&self) -> u32 {
        DEFAULT_FEE_BPS
    }

    /// `(reserve_in, reserve_out)` of the pool for the pair, `None` if the venue has no such pool.
    fn get_reserves(&self, asset_in: Address, asset_out: Address) -> Result<Option<(U256, U256)>>;

    /// Swaps exactly `amount_in`, returning the amount received. Fails below `min_amount_out`.
    fn swap_exact_in(&self, asset_in: Address, asset_out: Address, amount_in: U256, min_amount_out: U256) -> Result<U256>;

    /// Receives exactly `amount_out`, returning the amount spent. Fails above `max_amount_in`.
    fn swap_exact_out(&self, asset_in: Address, asset_out: Address, amount_out: U256, max_amount_in: U256) -> Result<U256>;
}

#[derive(Clone)]
pub struct VenueWrapper {
    pub venue: Arc<dyn Venue>,
}

impl VenueWrapper {
    pub fn new(venue: Arc<dyn Venue>) -> Self {
        VenueWrapper { venue }
    }
}

impl<T: 'static + Venue> From<T> for VenueWrapper {
    fn from(venue: T) -> Self {
        Self { venue: Arc::new(venue) }
    }
}

impl Deref for VenueWrapper {
    type Target = dyn Venue;

    fn deref(&self) -> &Self::Target {
        self.venue.deref()
    }
}

impl Display for VenueWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(fee={})@{}", self.get_name(), self.get_fee_bps(), self.get_id())
    }
}

impl Debug for VenueWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(fee={})@{}", self.get_name(), self.get_fee_bps(), self.get_id())
    }
}

impl PartialEq for VenueWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.get_id() == other.get_id()
    }
}

impl Eq for VenueWrapper {}

impl PartialOrd for VenueWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VenueWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get_id().cmp(&other.get_id())
    }
}

impl Hash for VenueWrapper {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get_id().hash(state)
    }
}

/// Venues kept in [`VenueId`] order so that iteration order is the tie-break order.
#[derive(Clone, Debug, Default)]
pub struct VenueRegistry {
    venues: Vec<VenueWrapper>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a venue. Returns an error if a venue with the same id is already registered.
    pub fn add_venue<T: Into<VenueWrapper>>(&mut self, venue: T) -> Result<()> {
        let venue = venue.into();
        match self.venues.binary_search(&venue) {
            Ok(_) => Err(eyre!("venue {} already registered", venue.get_id())),
            Err(idx) => {
                self.venues.insert(idx, venue);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: VenueId) -> Option<&VenueWrapper> {
        self.venues.iter().find(|venue| venue.get_id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VenueWrapper> {
        self.venues.iter()
    }

    pub fn ids(&self) -> Vec<VenueId> {
        self.venues.iter().map(|venue| venue.get_id()).collect()
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}
