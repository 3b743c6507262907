use crate::logic::venues::VenueId;
use alloy_primitives::{Address, U256};
use eyre::Report;

/// Every failure aborts the whole request. Nothing is retried inside the router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("invalid inputs: {0}")]
    InvalidInputs(&'static str),
    #[error("basket {0} contains a component with an external position")]
    IneligibleComponent(Address),
    #[error("unknown basket {0}")]
    UnknownBasket(Address),
    #[error("no venue has a pool for {asset_in} -> {asset_out}")]
    NoLiquidityPath { asset_in: Address, asset_out: Address },
    #[error("insufficient liquidity on {venue}: requested {requested}, reserve {reserve}")]
    InsufficientLiquidity { venue: VenueId, requested: U256, reserve: U256 },
    #[error("invalid reserves")]
    InvalidReserves,
    #[error("excessive input required: {required} > {max}")]
    ExcessiveInputRequired { required: U256, max: U256 },
    #[error("slippage exceeded: {actual} < {min}")]
    SlippageExceeded { actual: U256, min: U256 },
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("config error: {0}")]
    Config(String),
    #[error("collaborator failed: {0}")]
    Collaborator(Report),
}

impl From<Report> for RouterError {
    fn from(report: Report) -> Self {
        RouterError::Collaborator(report)
    }
}

pub type RouterResult<T> = Result<T, RouterError>;
