use super::collaborators::{FundsCustody, WrappedNativeAdapter};
use crate::data_sync::IssuanceModule;
use crate::errors::{RouterError, RouterResult};
use crate::logic::types::{Direction, LegRoute, Quote, RoutingPlan};
use crate::logic::venues::{VenueId, VenueRegistry};
use crate::utils::Asset;
use alloy_primitives::{Address, U256};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapKind {
    ExactIn { min_amount_out: U256 },
    ExactOut { max_amount_in: U256 },
}

/// One externally visible step of a settlement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    Pull { from: Address, asset: Asset, amount: U256 },
    Wrap { amount: U256 },
    Unwrap { amount: U256 },
    Swap { venue: VenueId, asset_in: Address, asset_out: Address, amount: U256, kind: SwapKind },
    Mint { basket: Address, units: U256, recipient: Address },
    Burn { basket: Address, units: U256, owner: Address },
    Push { to: Address, asset: Asset, amount: U256 },
}

impl Instruction {
    fn is_empty(&self) -> bool {
        match self {
            Instruction::Pull { amount, .. }
            | Instruction::Wrap { amount }
            | Instruction::Unwrap { amount }
            | Instruction::Swap { amount, .. }
            | Instruction::Push { amount, .. } => amount.is_zero(),
            Instruction::Mint { units, .. } | Instruction::Burn { units, .. } => units.is_zero(),
        }
    }
}

impl From<&Quote> for Instruction {
    fn from(quote: &Quote) -> Self {
        match quote.direction {
            Direction::ExactInput => Instruction::Swap {
                venue: quote.venue,
                asset_in: quote.asset_in,
                asset_out: quote.asset_out,
                amount: quote.amount_in,
                kind: SwapKind::ExactIn { min_amount_out: quote.amount_out },
            },
            Direction::ExactOutput => Instruction::Swap {
                venue: quote.venue,
                asset_in: quote.asset_in,
                asset_out: quote.asset_out,
                amount: quote.amount_out,
                kind: SwapKind::ExactOut { max_amount_in: quote.amount_in },
            },
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRecord {
    pub recipient: Address,
    pub amount: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ExchangeEvent {
    ExchangeIssue { recipient: Address, basket: Address, input_asset: Asset, amount_in: U256, set_units: U256 },
    ExchangeRedeem { recipient: Address, basket: Address, output_asset: Asset, set_units: U256, amount_out: U256 },
    Refund { recipient: Address, amount: U256 },
}

/// What a settled request did, as seen by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub plan: RoutingPlan,
    pub amount_in: U256,
    pub amount_out: U256,
    pub refund: Option<RefundRecord>,
    pub events: Vec<ExchangeEvent>,
}

/// Ordered instruction list for one request. Zero-amount steps are never recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    instructions: Vec<Instruction>,
}

impl Settlement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        if !instruction.is_empty() {
            self.instructions.push(instruction);
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// `pulled` is what the caller pays in; anything above `plan.total_input` is refunded in kind.
    pub fn for_issue(plan: &RoutingPlan, caller: Address, input: Asset, pulled: U256) -> RouterResult<Self> {
        let mut settlement = Self::new();
        settlement.push(Instruction::Pull { from: caller, asset: input, amount: pulled });
        if input.is_native() {
            settlement.push(Instruction::Wrap { amount: pulled });
        }
        if let Some(quote) = plan.hub_leg.as_ref() {
            settlement.push(quote.into());
        }
        for quote in plan.quotes() {
            settlement.push(quote.into());
        }
        settlement.push(Instruction::Mint { basket: plan.basket, units: plan.set_units, recipient: caller });

        for leg in plan.legs.iter() {
            match leg.route {
                LegRoute::Hub => settlement.push_hub(caller, input, plan.hub, leg.residual),
                _ => settlement.push(Instruction::Push { to: caller, asset: Asset::token(leg.component), amount: leg.residual }),
            }
        }
        let refund = pulled.checked_sub(plan.total_input).ok_or(RouterError::ArithmeticOverflow)?;
        settlement.push_hub(caller, input, plan.hub, plan.hub_residual);
        if input.is_native() {
            settlement.push(Instruction::Unwrap { amount: refund });
        }
        settlement.push(Instruction::Push { to: caller, asset: input, amount: refund });
        Ok(settlement)
    }

    pub fn for_redeem(plan: &RoutingPlan, caller: Address, output: Asset) -> Self {
        let mut settlement = Self::new();
        settlement.push(Instruction::Burn { basket: plan.basket, units: plan.set_units, owner: caller });
        for quote in plan.quotes() {
            settlement.push(quote.into());
        }
        if let Some(quote) = plan.hub_leg.as_ref() {
            settlement.push(quote.into());
        }
        if output.is_native() {
            settlement.push(Instruction::Unwrap { amount: plan.total_output });
        }
        settlement.push(Instruction::Push { to: caller, asset: output, amount: plan.total_output });
        settlement
    }

    /// Hub-denominated dust goes back as native when the caller paid in native.
    fn push_hub(&mut self, to: Address, input: Asset, hub: Address, amount: U256) {
        if input.is_native() {
            self.push(Instruction::Unwrap { amount });
            self.push(Instruction::Push { to, asset: Asset::Native, amount });
        } else {
            self.push(Instruction::Push { to, asset: Asset::Token(hub), amount });
        }
    }
}

/// Runs a [`Settlement`] in order against the external collaborators. The first failure stops
/// execution and is returned; undoing earlier steps is up to the environment.
pub struct Settler<'a> {
    pub venues: &'a VenueRegistry,
    pub issuance_module: &'a dyn IssuanceModule,
    pub custody: &'a dyn FundsCustody,
    pub wrapped_native: &'a dyn WrappedNativeAdapter,
}

impl Settler<'_> {
    pub fn execute(&self, settlement: &Settlement) -> RouterResult<()> {
        for instruction in settlement.instructions() {
            debug!("Settling {:?}", instruction);
            self.execute_one(instruction)?;
        }
        info!("Settled {} instructions", settlement.len());
        Ok(())
    }

    fn execute_one(&self, instruction: &Instruction) -> RouterResult<()> {
        match *instruction {
            Instruction::Pull { from, asset, amount } => self.custody.pull(from, asset, amount)?,
            Instruction::Wrap { amount } => self.wrapped_native.wrap(amount)?,
            Instruction::Unwrap { amount } => self.wrapped_native.unwrap(amount)?,
            Instruction::Swap { venue, asset_in, asset_out, amount, kind } => {
                let venue = self.venues.get(venue).ok_or_else(|| eyre!("venue {} is not registered", venue))?;
                match kind {
                    SwapKind::ExactIn { min_amount_out } => {
                        let received = venue.swap_exact_in(asset_in, asset_out, amount, min_amount_out)?;
                        if received < min_amount_out {
                            return Err(RouterError::SlippageExceeded { actual: received, min: min_amount_out });
                        }
                    }
                    SwapKind::ExactOut { max_amount_in } => {
                        let spent = venue.swap_exact_out(asset_in, asset_out, amount, max_amount_in)?;
                        if spent > max_amount_in {
                            return Err(RouterError::ExcessiveInputRequired { required: spent, max: max_amount_in });
                        }
                    }
                }
            }
            Instruction::Mint { basket, units, recipient } => self.issuance_module.mint(basket, units, recipient)?,
            Instruction::Burn { basket, units, owner } => self.issuance_module.burn(basket, units, owner)?,
            Instruction::Push { to, asset, amount } => self.custody.push(to, asset, amount)?,
        }
        Ok(())
    }
}
