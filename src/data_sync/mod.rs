/// Data Layer
///
/// Everything a request reads before it is priced:
/// - router configuration (TOML + environment)
/// - basket resolution and eligibility against the issuance module
/// - one consistent reserve snapshot across all venues

pub mod aggregator;
pub mod basket;
pub mod config;

pub use aggregator::ReserveAggregator;
pub use basket::{Basket, BasketComponent, BasketResolver, IssuanceModule};
pub use config::{RouterConfig, RouterConfigRoot, VenueConfig};
