// Three-Layer Architecture
pub mod data_sync; // Data Layer: configuration, basket resolution, reserve capture
pub mod execution; // Execution Layer: public operations, settlement, refunds
pub mod logic; // Logic Layer: pricing, venue selection, quantity computation

// Common utilities and types
pub mod errors;
pub mod mocks;
pub mod utils;

// Re-export key components from each layer
pub use data_sync::{Basket, BasketComponent, BasketResolver, IssuanceModule, ReserveAggregator, RouterConfig, VenueConfig};
pub use errors::{RouterError, RouterResult};
pub use execution::{
    ExchangeEvent, ExchangeIssuance, ExchangeIssuanceBuilder, FundsCustody, Instruction, RefundRecord, Settlement,
    SettlementReceipt, WrappedNativeAdapter,
};
pub use logic::{
    ComponentLeg, Direction, LegRoute, PricingOracle, QuantityEngine, Quote, ReserveSnapshot, RoutingPlan, Venue, VenueId,
    VenueRegistry, VenueSelector, VenueWrapper,
};
pub use utils::Asset;
