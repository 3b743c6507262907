use super::types::{ComponentLeg, Direction, LegRoute, Quote, ReserveSnapshot, RoutingPlan};
use super::venue_selector::VenueSelector;
use crate::data_sync::Basket;
use crate::errors::{RouterError, RouterResult};
use crate::utils::{Asset, precise_div, precise_mul, precise_mul_ceil};
use alloy_primitives::{Address, U256};
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Hub,
    Passthrough,
    Swap,
}

/// Builds routing plans for the three request kinds.
///
/// Every route goes through the wrapped-native hub: input -> hub -> component on issue and
/// component -> hub -> output on redeem. Each committed quote is applied to the snapshot
/// before the next one is priced, so a plan describes exactly what sequential settlement
/// against the captured reserves would produce.
#[derive(Copy, Clone, Debug)]
pub struct QuantityEngine {
    wrapped_native: Address,
}

impl QuantityEngine {
    pub fn new(wrapped_native: Address) -> Self {
        Self { wrapped_native }
    }

    /// Pairs a request for `basket` paid in (or paid out as) `asset` will price.
    pub fn pairs_for(&self, basket: &Basket, asset: Asset) -> Vec<(Address, Address)> {
        let pivot = asset.normalize(self.wrapped_native);
        let mut pairs = Vec::new();
        if pivot != self.wrapped_native {
            pairs.push((pivot, self.wrapped_native));
        }
        for component in basket.components.iter() {
            if self.side(component.asset, pivot) == Side::Swap && !pairs.contains(&(self.wrapped_native, component.asset)) {
                pairs.push((self.wrapped_native, component.asset));
            }
        }
        pairs
    }

    fn side(&self, component: Address, pivot: Address) -> Side {
        if component == self.wrapped_native {
            Side::Hub
        } else if component == pivot {
            Side::Passthrough
        } else {
            Side::Swap
        }
    }

    /// Spends exactly `amount_in` of `input`, splitting it across components in proportion to
    /// their per-unit hub cost, and mints as many set units as the scarcest component allows.
    pub fn plan_issue_from_exact_input(
        &self,
        basket: &Basket,
        input: Asset,
        amount_in: U256,
        snapshot: &mut ReserveSnapshot,
    ) -> RouterResult<RoutingPlan> {
        let hub = self.wrapped_native;
        let pivot = input.normalize(hub);

        // per-unit hub cost of each component, priced but not committed
        let mut costs = Vec::with_capacity(basket.len());
        {
            let selector = VenueSelector::new(snapshot);
            for component in basket.components.iter() {
                let cost = match self.side(component.asset, pivot) {
                    Side::Hub => component.unit_quantity,
                    Side::Swap => {
                        selector.best_quote(hub, component.asset, component.unit_quantity, Direction::ExactOutput)?.amount_in
                    }
                    Side::Passthrough => {
                        selector.best_quote(pivot, hub, component.unit_quantity, Direction::ExactInput)?.amount_out
                    }
                };
                costs.push(cost);
            }
        }
        let cost_total = checked_sum(costs.iter())?;
        if cost_total.is_zero() {
            return Err(RouterError::SlippageExceeded { actual: U256::ZERO, min: U256::from(1) });
        }

        let sides: Vec<Side> = basket.components.iter().map(|c| self.side(c.asset, pivot)).collect();
        let hub_side_cost = checked_sum(costs.iter().zip(sides.iter()).filter(|(_, side)| **side != Side::Passthrough).map(|(c, _)| c))?;

        // input kept as-is for passthrough components
        let mut passthrough_amounts = vec![U256::ZERO; basket.len()];
        let mut passthrough_total = U256::ZERO;
        for (index, side) in sides.iter().enumerate() {
            if *side == Side::Passthrough {
                let share = mul_div(amount_in, costs[index], cost_total)?;
                passthrough_amounts[index] = share;
                passthrough_total = add(passthrough_total, share)?;
            }
        }
        let mut swap_budget = amount_in.checked_sub(passthrough_total).ok_or(RouterError::ArithmeticOverflow)?;
        if hub_side_cost.is_zero() {
            // nothing to buy with hub, the dust stays with the passthrough leg
            if let Some(index) = sides.iter().rposition(|side| *side == Side::Passthrough) {
                passthrough_amounts[index] = add(passthrough_amounts[index], swap_budget)?;
            }
            swap_budget = U256::ZERO;
        }

        let mut hub_leg = None;
        let hub_budget = if pivot == hub || swap_budget.is_zero() {
            swap_budget
        } else {
            let quote = self.commit(snapshot, pivot, hub, swap_budget, Direction::ExactInput)?;
            hub_leg = Some(quote);
            quote.amount_out
        };

        let mut legs = Vec::with_capacity(basket.len());
        let mut hub_total = U256::ZERO;
        for (index, component) in basket.components.iter().enumerate() {
            let (hub_amount, component_amount, route) = match sides[index] {
                Side::Passthrough => (U256::ZERO, passthrough_amounts[index], LegRoute::Passthrough),
                Side::Hub => {
                    let share = mul_div(hub_budget, costs[index], hub_side_cost)?;
                    (share, share, LegRoute::Hub)
                }
                Side::Swap => {
                    let share = mul_div(hub_budget, costs[index], hub_side_cost)?;
                    let quote = self.commit(snapshot, hub, component.asset, share, Direction::ExactInput)?;
                    (share, quote.amount_out, LegRoute::Swap(quote))
                }
            };
            hub_total = add(hub_total, hub_amount)?;
            legs.push(ComponentLeg {
                component: component.asset,
                unit_quantity: component.unit_quantity,
                component_amount,
                hub_amount,
                residual: U256::ZERO,
                route,
            });
        }

        let mut set_units: Option<U256> = None;
        for leg in legs.iter() {
            let fundable = precise_div(leg.component_amount, leg.unit_quantity)?;
            set_units = Some(set_units.map_or(fundable, |units| units.min(fundable)));
        }
        let set_units = set_units.unwrap_or_default();

        for leg in legs.iter_mut() {
            let required = precise_mul_ceil(leg.unit_quantity, set_units)?;
            leg.residual = leg.component_amount.checked_sub(required).ok_or(RouterError::ArithmeticOverflow)?;
        }
        let hub_residual = hub_budget.checked_sub(hub_total).ok_or(RouterError::ArithmeticOverflow)?;

        debug!("Issue {} from {} {}: {} set units, hub budget {}", basket.id, amount_in, input, set_units, hub_budget);

        Ok(RoutingPlan {
            basket: basket.id,
            hub,
            set_units,
            hub_leg,
            legs,
            hub_total,
            hub_residual,
            total_input: amount_in,
            total_output: set_units,
        })
    }

    /// Buys `ceil(unit_quantity * set_units)` of every component, then prices the hub that
    /// costs in `input`. `total_input` is the amount the caller has to provide.
    pub fn plan_issue_exact_set(
        &self,
        basket: &Basket,
        input: Asset,
        set_units: U256,
        snapshot: &mut ReserveSnapshot,
    ) -> RouterResult<RoutingPlan> {
        let hub = self.wrapped_native;
        let pivot = input.normalize(hub);

        let mut legs = Vec::with_capacity(basket.len());
        let mut hub_total = U256::ZERO;
        let mut passthrough_total = U256::ZERO;
        for component in basket.components.iter() {
            let required = precise_mul_ceil(component.unit_quantity, set_units)?;
            let (hub_amount, route) = match self.side(component.asset, pivot) {
                Side::Hub => (required, LegRoute::Hub),
                Side::Passthrough => {
                    passthrough_total = add(passthrough_total, required)?;
                    (U256::ZERO, LegRoute::Passthrough)
                }
                Side::Swap => {
                    let quote = self.commit(snapshot, hub, component.asset, required, Direction::ExactOutput)?;
                    (quote.amount_in, LegRoute::Swap(quote))
                }
            };
            hub_total = add(hub_total, hub_amount)?;
            legs.push(ComponentLeg {
                component: component.asset,
                unit_quantity: component.unit_quantity,
                component_amount: required,
                hub_amount,
                residual: U256::ZERO,
                route,
            });
        }

        let mut hub_leg = None;
        let input_for_hub = if pivot == hub || hub_total.is_zero() {
            hub_total
        } else {
            let quote = self.commit(snapshot, pivot, hub, hub_total, Direction::ExactOutput)?;
            hub_leg = Some(quote);
            quote.amount_in
        };
        let total_input = add(input_for_hub, passthrough_total)?;

        debug!("Issue {} set units of {} costs {} {}", set_units, basket.id, total_input, input);

        Ok(RoutingPlan {
            basket: basket.id,
            hub,
            set_units,
            hub_leg,
            legs,
            hub_total,
            hub_residual: U256::ZERO,
            total_input,
            total_output: set_units,
        })
    }

    /// Sells `floor(unit_quantity * set_units)` of every component for hub, then the hub for
    /// `output`. `total_output` is the amount the caller receives.
    pub fn plan_redeem_exact_set(
        &self,
        basket: &Basket,
        output: Asset,
        set_units: U256,
        snapshot: &mut ReserveSnapshot,
    ) -> RouterResult<RoutingPlan> {
        let hub = self.wrapped_native;
        let pivot = output.normalize(hub);

        let mut legs = Vec::with_capacity(basket.len());
        let mut hub_total = U256::ZERO;
        let mut passthrough_total = U256::ZERO;
        for component in basket.components.iter() {
            let released = precise_mul(component.unit_quantity, set_units)?;
            let (hub_amount, route) = match self.side(component.asset, pivot) {
                Side::Hub => (released, LegRoute::Hub),
                Side::Passthrough => {
                    passthrough_total = add(passthrough_total, released)?;
                    (U256::ZERO, LegRoute::Passthrough)
                }
                Side::Swap => {
                    let quote = self.commit(snapshot, component.asset, hub, released, Direction::ExactInput)?;
                    (quote.amount_out, LegRoute::Swap(quote))
                }
            };
            hub_total = add(hub_total, hub_amount)?;
            legs.push(ComponentLeg {
                component: component.asset,
                unit_quantity: component.unit_quantity,
                component_amount: released,
                hub_amount,
                residual: U256::ZERO,
                route,
            });
        }

        let mut hub_leg = None;
        let output_from_hub = if pivot == hub || hub_total.is_zero() {
            hub_total
        } else {
            let quote = self.commit(snapshot, hub, pivot, hub_total, Direction::ExactInput)?;
            hub_leg = Some(quote);
            quote.amount_out
        };
        let total_output = add(output_from_hub, passthrough_total)?;

        debug!("Redeem {} set units of {} yields {} {}", set_units, basket.id, total_output, output);

        Ok(RoutingPlan {
            basket: basket.id,
            hub,
            set_units,
            hub_leg,
            legs,
            hub_total,
            hub_residual: U256::ZERO,
            total_input: set_units,
            total_output,
        })
    }

    fn commit(
        &self,
        snapshot: &mut ReserveSnapshot,
        asset_in: Address,
        asset_out: Address,
        amount: U256,
        direction: Direction,
    ) -> RouterResult<Quote> {
        let quote = VenueSelector::new(snapshot).best_quote(asset_in, asset_out, amount, direction)?;
        snapshot.apply_quote(&quote)?;
        Ok(quote)
    }
}

fn add(a: U256, b: U256) -> RouterResult<U256> {
    a.checked_add(b).ok_or(RouterError::ArithmeticOverflow)
}

fn checked_sum<'a>(values: impl Iterator<Item = &'a U256>) -> RouterResult<U256> {
    values.into_iter().try_fold(U256::ZERO, |acc, value| add(acc, *value))
}

fn mul_div(a: U256, b: U256, denominator: U256) -> RouterResult<U256> {
    if denominator.is_zero() {
        return Err(RouterError::ArithmeticOverflow);
    }
    Ok(a.checked_mul(b).ok_or(RouterError::ArithmeticOverflow)? / denominator)
}
