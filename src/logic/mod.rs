/// Logic Layer - Routing and Quantity Computation
///
/// This layer is responsible for:
/// - Constant-product pricing per venue
/// - Best-venue selection for every swap leg
/// - Turning a basket request into a fully priced routing plan
///
/// Everything here is pure over a captured reserve snapshot. Nothing in this layer moves funds.
pub mod pricing;
pub mod quantity_engine;
pub mod types;
pub mod venue_selector;
pub mod venues;

#[cfg(test)]
mod tests;

// Re-export key components from the logic layer
pub use pricing::PricingOracle;
pub use quantity_engine::QuantityEngine;
pub use types::{ComponentLeg, Direction, LegRoute, Quote, ReserveSnapshot, RoutingPlan};
pub use venue_selector::VenueSelector;
pub use venues::{Venue, VenueId, VenueRegistry, VenueWrapper};
