use super::collaborators::{FundsCustody, WrappedNativeAdapter};
use super::settlement::{ExchangeEvent, RefundRecord, Settlement, SettlementReceipt, Settler};
use crate::data_sync::{Basket, BasketResolver, IssuanceModule, ReserveAggregator, RouterConfig};
use crate::errors::{RouterError, RouterResult};
use crate::logic::types::{ReserveSnapshot, RoutingPlan};
use crate::logic::venues::{VenueRegistry, VenueWrapper};
use crate::logic::QuantityEngine;
use crate::utils::Asset;
use alloy_primitives::{Address, U256};
use eyre::{Result, eyre};
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point for issuing and redeeming basket set tokens against a single input or output asset.
///
/// Every request runs `validate -> resolve basket -> capture reserves -> plan -> check bounds ->
/// settle -> emit`. Nothing is settled until the whole plan is priced and within the caller's
/// bounds. The estimate variants stop after planning and share the exact same path.
pub struct ExchangeIssuance {
    config: RouterConfig,
    venues: VenueRegistry,
    resolver: BasketResolver,
    engine: QuantityEngine,
    custody: Arc<dyn FundsCustody>,
    wrapped_native_adapter: Arc<dyn WrappedNativeAdapter>,
}

impl ExchangeIssuance {
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn venues(&self) -> &VenueRegistry {
        &self.venues
    }

    /// Spends exactly `amount_in` of `input` and mints as many set units as it buys.
    pub fn issue_set_for_exact_input(
        &self,
        caller: Address,
        basket: Address,
        input: Asset,
        amount_in: U256,
        min_set_receive: U256,
    ) -> RouterResult<SettlementReceipt> {
        let plan = self.quote_issue_from_exact_input(basket, input, amount_in)?;
        if plan.set_units.is_zero() || plan.set_units < min_set_receive {
            return Err(RouterError::SlippageExceeded { actual: plan.set_units, min: min_set_receive.max(U256::from(1)) });
        }

        let settlement = Settlement::for_issue(&plan, caller, input, amount_in)?;
        self.settle(&settlement)?;

        let events = vec![ExchangeEvent::ExchangeIssue {
            recipient: caller,
            basket,
            input_asset: input,
            amount_in,
            set_units: plan.set_units,
        }];
        let set_units = plan.set_units;
        Ok(self.receipt(plan, amount_in, set_units, None, events))
    }

    /// Mints exactly `set_units`. Native input pre-funds `max_input` and gets the unused part
    /// back; token input is pulled for exactly the amount spent.
    pub fn issue_exact_set(
        &self,
        caller: Address,
        basket: Address,
        input: Asset,
        set_units: U256,
        max_input: U256,
    ) -> RouterResult<SettlementReceipt> {
        if max_input.is_zero() {
            return Err(RouterError::InvalidInputs("zero max input amount"));
        }
        let plan = self.quote_issue_exact_set(basket, input, set_units)?;
        if plan.total_input > max_input {
            return Err(RouterError::ExcessiveInputRequired { required: plan.total_input, max: max_input });
        }

        let pulled = if input.is_native() { max_input } else { plan.total_input };
        let settlement = Settlement::for_issue(&plan, caller, input, pulled)?;
        self.settle(&settlement)?;

        let amount_spent = plan.total_input;
        let mut events = vec![ExchangeEvent::ExchangeIssue {
            recipient: caller,
            basket,
            input_asset: input,
            amount_in: amount_spent,
            set_units: plan.set_units,
        }];
        let refund_amount = pulled.saturating_sub(amount_spent);
        let refund = if refund_amount.is_zero() {
            None
        } else {
            events.push(ExchangeEvent::Refund { recipient: caller, amount: refund_amount });
            Some(RefundRecord { recipient: caller, amount: refund_amount })
        };
        let set_units = plan.set_units;
        Ok(self.receipt(plan, amount_spent, set_units, refund, events))
    }

    /// Burns exactly `set_units` and pays the proceeds out in `output`.
    pub fn redeem_exact_set(
        &self,
        caller: Address,
        basket: Address,
        output: Asset,
        set_units: U256,
        min_output: U256,
    ) -> RouterResult<SettlementReceipt> {
        let plan = self.quote_redeem_exact_set(basket, output, set_units)?;
        if plan.total_output < min_output {
            return Err(RouterError::SlippageExceeded { actual: plan.total_output, min: min_output });
        }

        let settlement = Settlement::for_redeem(&plan, caller, output);
        self.settle(&settlement)?;

        let events = vec![ExchangeEvent::ExchangeRedeem {
            recipient: caller,
            basket,
            output_asset: output,
            set_units,
            amount_out: plan.total_output,
        }];
        let amount_out = plan.total_output;
        Ok(self.receipt(plan, set_units, amount_out, None, events))
    }

    /// Set units `issue_set_for_exact_input` would mint right now.
    pub fn get_estimated_issue_amount(&self, basket: Address, input: Asset, amount_in: U256) -> RouterResult<U256> {
        Ok(self.quote_issue_from_exact_input(basket, input, amount_in)?.set_units)
    }

    /// Input `issue_exact_set` would spend right now.
    pub fn get_amount_in_to_issue_exact(&self, basket: Address, input: Asset, set_units: U256) -> RouterResult<U256> {
        Ok(self.quote_issue_exact_set(basket, input, set_units)?.total_input)
    }

    /// Output `redeem_exact_set` would pay right now.
    pub fn get_amount_out_on_redeem(&self, basket: Address, output: Asset, set_units: U256) -> RouterResult<U256> {
        Ok(self.quote_redeem_exact_set(basket, output, set_units)?.total_output)
    }

    pub fn quote_issue_from_exact_input(&self, basket: Address, input: Asset, amount_in: U256) -> RouterResult<RoutingPlan> {
        if amount_in.is_zero() {
            return Err(RouterError::InvalidInputs("zero input amount"));
        }
        let (basket, mut snapshot) = self.prepare(basket, input)?;
        self.engine.plan_issue_from_exact_input(&basket, input, amount_in, &mut snapshot)
    }

    pub fn quote_issue_exact_set(&self, basket: Address, input: Asset, set_units: U256) -> RouterResult<RoutingPlan> {
        if set_units.is_zero() {
            return Err(RouterError::InvalidInputs("zero set units"));
        }
        let (basket, mut snapshot) = self.prepare(basket, input)?;
        self.engine.plan_issue_exact_set(&basket, input, set_units, &mut snapshot)
    }

    pub fn quote_redeem_exact_set(&self, basket: Address, output: Asset, set_units: U256) -> RouterResult<RoutingPlan> {
        if set_units.is_zero() {
            return Err(RouterError::InvalidInputs("zero set units"));
        }
        let (basket, mut snapshot) = self.prepare(basket, output)?;
        self.engine.plan_redeem_exact_set(&basket, output, set_units, &mut snapshot)
    }

    fn prepare(&self, basket: Address, asset: Asset) -> RouterResult<(Basket, ReserveSnapshot)> {
        let basket = self.resolver.resolve(basket)?;
        let pairs = self.engine.pairs_for(&basket, asset);
        let snapshot = ReserveAggregator::new(&self.venues).capture(&pairs)?;
        Ok((basket, snapshot))
    }

    fn settle(&self, settlement: &Settlement) -> RouterResult<()> {
        Settler {
            venues: &self.venues,
            issuance_module: self.resolver.issuance_module().as_ref(),
            custody: self.custody.as_ref(),
            wrapped_native: self.wrapped_native_adapter.as_ref(),
        }
        .execute(settlement)
    }

    fn receipt(
        &self,
        plan: RoutingPlan,
        amount_in: U256,
        amount_out: U256,
        refund: Option<RefundRecord>,
        events: Vec<ExchangeEvent>,
    ) -> SettlementReceipt {
        for event in events.iter() {
            info!("{:?}", event);
        }
        SettlementReceipt { plan, amount_in, amount_out, refund, events }
    }
}

/// Builder for [`ExchangeIssuance`]. Every collaborator is required.
pub struct ExchangeIssuanceBuilder {
    config: RouterConfig,
    venues: Vec<VenueWrapper>,
    issuance_module: Option<Arc<dyn IssuanceModule>>,
    custody: Option<Arc<dyn FundsCustody>>,
    wrapped_native_adapter: Option<Arc<dyn WrappedNativeAdapter>>,
}

impl ExchangeIssuanceBuilder {
    pub fn new() -> Self {
        Self {
            config: RouterConfig::default(),
            venues: Vec::new(),
            issuance_module: None,
            custody: None,
            wrapped_native_adapter: None,
        }
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_wrapped_native(mut self, wrapped_native: Address) -> Self {
        self.config.wrapped_native = wrapped_native;
        self
    }

    pub fn with_venue<T: Into<VenueWrapper>>(mut self, venue: T) -> Self {
        self.venues.push(venue.into());
        self
    }

    pub fn with_issuance_module(mut self, issuance_module: Arc<dyn IssuanceModule>) -> Self {
        self.issuance_module = Some(issuance_module);
        self
    }

    pub fn with_custody(mut self, custody: Arc<dyn FundsCustody>) -> Self {
        self.custody = Some(custody);
        self
    }

    pub fn with_wrapped_native_adapter(mut self, adapter: Arc<dyn WrappedNativeAdapter>) -> Self {
        self.wrapped_native_adapter = Some(adapter);
        self
    }

    pub fn build(self) -> Result<ExchangeIssuance> {
        self.config.validate()?;

        let mut venues = VenueRegistry::new();
        for venue in self.venues {
            let Some(configured) = self.config.venue(venue.get_id()) else {
                return Err(RouterError::Config(format!("venue {} is not configured", venue.get_id())).into());
            };
            if configured.fee_bps != venue.get_fee_bps() {
                warn!("{} charges {} bps, configured {} bps", venue, venue.get_fee_bps(), configured.fee_bps);
            }
            venues.add_venue(venue)?;
        }
        if venues.is_empty() {
            return Err(eyre!("at least one venue is required"));
        }

        let issuance_module = self.issuance_module.ok_or_else(|| eyre!("issuance module is required"))?;
        let custody = self.custody.ok_or_else(|| eyre!("custody is required"))?;
        let wrapped_native_adapter = self.wrapped_native_adapter.ok_or_else(|| eyre!("wrapped native adapter is required"))?;

        info!("Exchange issuance ready with {} venues, hub {}", venues.len(), self.config.wrapped_native);

        Ok(ExchangeIssuance {
            engine: QuantityEngine::new(self.config.wrapped_native),
            config: self.config,
            venues,
            resolver: BasketResolver::new(issuance_module),
            custody,
            wrapped_native_adapter,
        })
    }
}

impl Default for ExchangeIssuanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
