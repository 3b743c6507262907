/// Execution Layer
///
/// This layer is responsible for:
/// - The public issue / redeem / estimate operations
/// - Turning a routing plan into ordered settlement instructions
/// - Driving the external custody, wrapped-native and issuance collaborators
/// - Refund accounting and the emitted exchange events
pub mod collaborators;
pub mod exchange_issuance;
pub mod settlement;

// Re-export key components from the execution layer
pub use collaborators::{FundsCustody, WrappedNativeAdapter};
pub use exchange_issuance::{ExchangeIssuance, ExchangeIssuanceBuilder};
pub use settlement::{ExchangeEvent, Instruction, RefundRecord, Settlement, SettlementReceipt, Settler, SwapKind};
