use crate::errors::{RouterError, RouterResult};
use alloy_primitives::{Address, U256};
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketComponent {
    pub asset: Address,
    /// Amount of the component per 1e18 set units.
    pub unit_quantity: U256,
}

impl BasketComponent {
    pub fn new(asset: Address, unit_quantity: U256) -> Self {
        Self { asset, unit_quantity }
    }
}

/// Ordered components of one set token. Immutable for the duration of a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    pub id: Address,
    pub components: Vec<BasketComponent>,
}

impl Basket {
    pub fn new(id: Address, components: Vec<BasketComponent>) -> Self {
        Self { id, components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// The external issuance module: owns the basket registry and the set-token ledger.
pub trait IssuanceModule: Send + Sync {
    /// Ordered components and unit quantities. Empty if the basket is unknown.
    fn get_components(&self, basket: Address) -> Result<Vec<BasketComponent>>;

    /// `false` when any component carries a position that cannot be moved by a plain transfer.
    fn is_eligible(&self, basket: Address) -> Result<bool>;

    /// Pulls `ceil(unit_quantity * units)` of every component from the router and mints `units` to `recipient`.
    fn mint(&self, basket: Address, units: U256, recipient: Address) -> Result<()>;

    /// Burns `units` from `owner` and releases `floor(unit_quantity * units)` of every component to the router.
    fn burn(&self, basket: Address, units: U256, owner: Address) -> Result<()>;
}

/// Fetches a basket once per request and checks that the router may trade it.
#[derive(Clone)]
pub struct BasketResolver {
    issuance_module: Arc<dyn IssuanceModule>,
}

impl BasketResolver {
    pub fn new(issuance_module: Arc<dyn IssuanceModule>) -> Self {
        Self { issuance_module }
    }

    pub fn issuance_module(&self) -> &Arc<dyn IssuanceModule> {
        &self.issuance_module
    }

    pub fn resolve(&self, basket_id: Address) -> RouterResult<Basket> {
        let components = self.issuance_module.get_components(basket_id)?;
        if components.is_empty() {
            return Err(RouterError::UnknownBasket(basket_id));
        }
        if !self.issuance_module.is_eligible(basket_id)? {
            return Err(RouterError::IneligibleComponent(basket_id));
        }
        if components.iter().any(|component| component.unit_quantity.is_zero()) {
            return Err(RouterError::InvalidInputs("zero unit quantity in basket"));
        }

        debug!("Resolved basket {} with {} components", basket_id, components.len());
        Ok(Basket::new(basket_id, components))
    }
}
