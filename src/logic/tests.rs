/// Scenario tests for the full request flow
///
/// Every test runs against an in-memory chain seeded with the same pools: WETH/WBTC 100:1,
/// WETH/DAI 10:100000 and WETH/USDC 100:100000 on the primary venue, and pools of the same
/// prices but different depth on the secondary venue.

#[cfg(test)]
mod scenario_tests {
    use crate::data_sync::BasketComponent;
    use crate::errors::{RouterError, RouterResult};
    use crate::execution::{ExchangeEvent, ExchangeIssuance, ExchangeIssuanceBuilder};
    use crate::logic::types::LegRoute;
    use crate::logic::venues::VenueId;
    use crate::mocks::{InMemoryChain, ROUTER};
    use crate::utils::constants::{DEFAULT_FEE_BPS, PRECISE_UNIT, WETH};
    use crate::utils::{Asset, precise_div};
    use alloy_primitives::{Address, U256};
    use eyre::Result;
    use std::sync::Arc;

    const DAI: Address = Address::repeat_byte(0xda);
    const WBTC: Address = Address::repeat_byte(0xb7);
    const USDC: Address = Address::repeat_byte(0xc0);
    const ILLIQUID: Address = Address::repeat_byte(0x11);

    const SET: Address = Address::repeat_byte(0x5e);
    const SET_WITH_WETH: Address = Address::repeat_byte(0x5f);
    const SET_ILLIQUID: Address = Address::repeat_byte(0x60);

    const USER: Address = Address::repeat_byte(0xa1);

    fn ether(amount: u64) -> U256 {
        U256::from(amount) * PRECISE_UNIT
    }

    fn usdc(amount: u64) -> U256 {
        U256::from(amount) * U256::from(1_000_000u64)
    }

    struct Fixture {
        chain: Arc<InMemoryChain>,
        exchange: ExchangeIssuance,
    }

    fn fixture() -> Result<Fixture> {
        let chain = Arc::new(InMemoryChain::new(WETH));
        let half = PRECISE_UNIT / U256::from(2);

        chain.add_liquidity(VenueId::Primary, WETH, WBTC, ether(100), ether(1));
        chain.add_liquidity(VenueId::Primary, WETH, DAI, ether(10), ether(100_000));
        chain.add_liquidity(VenueId::Primary, WETH, USDC, ether(100), usdc(100_000));
        // same prices, a deeper DAI pool, a shallower WBTC pool and no USDC pool
        chain.add_liquidity(VenueId::Secondary, WETH, DAI, ether(20), ether(200_000));
        chain.add_liquidity(VenueId::Secondary, WETH, WBTC, ether(50), ether(1) / U256::from(2));

        chain.register_basket(
            SET,
            vec![BasketComponent::new(DAI, half), BasketComponent::new(WBTC, U256::from(100_000_000u64))],
        );
        chain.register_basket(SET_WITH_WETH, vec![BasketComponent::new(DAI, half), BasketComponent::new(WETH, half)]);
        chain.register_basket(SET_ILLIQUID, vec![BasketComponent::new(DAI, half), BasketComponent::new(ILLIQUID, half)]);

        chain.fund(USER, Asset::Native, ether(1_000));
        chain.fund(USER, Asset::Token(USDC), usdc(10_000));
        chain.fund(USER, Asset::Token(DAI), ether(1_000));

        let exchange = ExchangeIssuanceBuilder::new()
            .with_wrapped_native(WETH)
            .with_venue(chain.venue(VenueId::Primary, DEFAULT_FEE_BPS))
            .with_venue(chain.venue(VenueId::Secondary, DEFAULT_FEE_BPS))
            .with_issuance_module(chain.clone())
            .with_custody(chain.clone())
            .with_wrapped_native_adapter(chain.clone())
            .build()?;

        Ok(Fixture { chain, exchange })
    }

    fn assert_router_empty(chain: &InMemoryChain) {
        for asset in [Asset::Native, Asset::Token(WETH), Asset::Token(DAI), Asset::Token(WBTC), Asset::Token(USDC)] {
            assert_eq!(chain.balance_of(ROUTER, asset), U256::ZERO, "router keeps {asset}");
        }
    }

    #[test]
    fn test_issue_for_exact_usdc_mints_scarcest_component_units() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        let amount = usdc(1_000);

        let estimate = exchange.get_estimated_issue_amount(SET, Asset::Token(USDC), amount)?;
        assert_eq!(estimate, exchange.get_estimated_issue_amount(SET, Asset::Token(USDC), amount)?);

        let plan = exchange.quote_issue_from_exact_input(SET, Asset::Token(USDC), amount)?;
        let fundable =
            plan.legs.iter().map(|leg| precise_div(leg.component_amount, leg.unit_quantity)).collect::<RouterResult<Vec<_>>>()?;
        assert_eq!(fundable.iter().min(), Some(&plan.set_units));
        assert_eq!(plan.set_units, estimate);
        assert!(!estimate.is_zero());

        let receipt = exchange.issue_set_for_exact_input(USER, SET, Asset::Token(USDC), amount, U256::ZERO)?;
        assert_eq!(receipt.amount_out, estimate);
        assert_eq!(receipt.plan, plan);
        assert_eq!(chain.balance_of(USER, Asset::Token(SET)), estimate);
        assert_eq!(chain.balance_of(USER, Asset::Token(USDC)), usdc(9_000));
        assert_eq!(
            receipt.events,
            vec![ExchangeEvent::ExchangeIssue {
                recipient: USER,
                basket: SET,
                input_asset: Asset::Token(USDC),
                amount_in: amount,
                set_units: estimate,
            }]
        );
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_each_leg_uses_better_venue() -> Result<()> {
        let Fixture { exchange, .. } = fixture()?;
        let plan = exchange.quote_issue_exact_set(SET, Asset::Token(USDC), ether(10))?;

        assert_eq!(plan.hub_leg.map(|quote| quote.venue), Some(VenueId::Primary));
        assert_eq!(plan.legs[0].route.quote().map(|quote| quote.venue), Some(VenueId::Secondary));
        assert_eq!(plan.legs[1].route.quote().map(|quote| quote.venue), Some(VenueId::Primary));
        Ok(())
    }

    #[test]
    fn test_issue_exact_set_with_token_pulls_exact_cost() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        let set_units = ether(10);

        let cost = exchange.get_amount_in_to_issue_exact(SET, Asset::Token(USDC), set_units)?;
        let receipt = exchange.issue_exact_set(USER, SET, Asset::Token(USDC), set_units, cost * U256::from(2))?;

        assert_eq!(receipt.amount_in, cost);
        assert_eq!(receipt.refund, None);
        assert!(!receipt.events.iter().any(|event| matches!(event, ExchangeEvent::Refund { .. })));
        assert_eq!(chain.balance_of(USER, Asset::Token(USDC)), usdc(10_000) - cost);
        assert_eq!(chain.balance_of(USER, Asset::Token(SET)), set_units);
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_issue_exact_set_with_native_refunds_overpayment() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        let set_units = ether(10);
        let max_input = ether(1);

        let cost = exchange.get_amount_in_to_issue_exact(SET, Asset::Native, set_units)?;
        assert!(cost < max_input);

        let receipt = exchange.issue_exact_set(USER, SET, Asset::Native, set_units, max_input)?;
        let refund = receipt.refund.expect("overpaid");
        assert_eq!(refund.amount, max_input - cost);
        assert_eq!(refund.recipient, USER);
        assert_eq!(receipt.amount_in, cost);
        assert_eq!(receipt.events.last(), Some(&ExchangeEvent::Refund { recipient: USER, amount: max_input - cost }));

        assert_eq!(chain.balance_of(USER, Asset::Native), ether(1_000) - cost);
        assert_eq!(chain.balance_of(USER, Asset::Token(SET)), set_units);
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_estimate_does_not_move_reserves() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        let before = chain.pool_reserves(VenueId::Secondary, WETH, DAI);

        let first = exchange.get_amount_in_to_issue_exact(SET, Asset::Native, ether(100))?;
        let second = exchange.get_amount_in_to_issue_exact(SET, Asset::Native, ether(100))?;
        assert_eq!(first, second);
        assert_eq!(chain.pool_reserves(VenueId::Secondary, WETH, DAI), before);

        let receipt = exchange.issue_exact_set(USER, SET, Asset::Native, ether(100), first)?;
        assert_eq!(receipt.amount_in, first);
        assert_ne!(chain.pool_reserves(VenueId::Secondary, WETH, DAI), before);
        Ok(())
    }

    #[test]
    fn test_round_trip_returns_at_most_spent() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        let set_units = ether(10);

        let cost = exchange.get_amount_in_to_issue_exact(SET, Asset::Native, set_units)?;
        let proceeds = exchange.get_amount_out_on_redeem(SET, Asset::Native, set_units)?;
        assert!(proceeds <= cost);

        let spent = exchange.issue_exact_set(USER, SET, Asset::Native, set_units, ether(1))?.amount_in;
        let native_before = chain.balance_of(USER, Asset::Native);
        let receipt = exchange.redeem_exact_set(USER, SET, Asset::Native, set_units, U256::ZERO)?;

        assert!(receipt.amount_out <= spent);
        assert_eq!(chain.balance_of(USER, Asset::Native), native_before + receipt.amount_out);
        assert_eq!(chain.balance_of(USER, Asset::Token(SET)), U256::ZERO);
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_redeem_to_token() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        exchange.issue_exact_set(USER, SET, Asset::Native, ether(10), ether(1))?;

        let estimate = exchange.get_amount_out_on_redeem(SET, Asset::Token(USDC), ether(4))?;
        let receipt = exchange.redeem_exact_set(USER, SET, Asset::Token(USDC), ether(4), estimate)?;

        assert_eq!(receipt.amount_out, estimate);
        assert_eq!(
            receipt.events,
            vec![ExchangeEvent::ExchangeRedeem {
                recipient: USER,
                basket: SET,
                output_asset: Asset::Token(USDC),
                set_units: ether(4),
                amount_out: estimate,
            }]
        );
        assert_eq!(chain.balance_of(USER, Asset::Token(USDC)), usdc(10_000) + estimate);
        assert_eq!(chain.balance_of(USER, Asset::Token(SET)), ether(6));
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_basket_with_weth() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;

        let plan = exchange.quote_issue_exact_set(SET_WITH_WETH, Asset::Native, ether(1))?;
        assert_eq!(plan.legs[1].route, LegRoute::Hub);
        assert_eq!(plan.legs[1].hub_amount, ether(1) / U256::from(2));

        exchange.issue_exact_set(USER, SET_WITH_WETH, Asset::Native, ether(1), ether(2))?;
        exchange.redeem_exact_set(USER, SET_WITH_WETH, Asset::Token(USDC), ether(1), U256::ZERO)?;
        assert_eq!(chain.balance_of(USER, Asset::Token(SET_WITH_WETH)), U256::ZERO);
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_issue_for_exact_native_returns_dust_as_native() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        let amount = ether(1);

        let plan = exchange.quote_issue_from_exact_input(SET, Asset::Native, amount)?;
        assert!(plan.hub_leg.is_none());
        let receipt = exchange.issue_set_for_exact_input(USER, SET, Asset::Native, amount, plan.set_units)?;

        assert_eq!(receipt.amount_out, plan.set_units);
        assert_eq!(chain.balance_of(USER, Asset::Token(SET)), plan.set_units);
        assert_eq!(chain.balance_of(USER, Asset::Native), ether(1_000) - amount + plan.hub_residual);
        assert_eq!(chain.balance_of(USER, Asset::Token(WETH)), U256::ZERO);
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_native_issue_of_basket_with_weth_returns_no_weth() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;

        let receipt = exchange.issue_set_for_exact_input(USER, SET_WITH_WETH, Asset::Native, ether(1), U256::ZERO)?;
        let weth_leg = &receipt.plan.legs[1];
        assert_eq!(weth_leg.route, LegRoute::Hub);

        assert_eq!(chain.balance_of(USER, Asset::Token(WETH)), U256::ZERO);
        assert_eq!(
            chain.balance_of(USER, Asset::Native),
            ether(1_000) - ether(1) + weth_leg.residual + receipt.plan.hub_residual
        );
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_redeem_to_token_that_is_a_component() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        exchange.issue_exact_set(USER, SET, Asset::Native, ether(10), ether(1))?;

        let plan = exchange.quote_redeem_exact_set(SET, Asset::Token(DAI), ether(10))?;
        assert_eq!(plan.legs[0].route, LegRoute::Passthrough);
        assert_eq!(plan.legs[0].component_amount, ether(5));
        assert_eq!(plan.hub_leg.map(|quote| quote.asset_out), Some(DAI));

        let receipt = exchange.redeem_exact_set(USER, SET, Asset::Token(DAI), ether(10), plan.total_output)?;
        assert_eq!(receipt.amount_out, plan.total_output);
        assert!(receipt.amount_out > ether(5));
        assert_eq!(chain.balance_of(USER, Asset::Token(DAI)), ether(1_000) + receipt.amount_out);
        assert_eq!(chain.balance_of(USER, Asset::Token(SET)), U256::ZERO);
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_input_token_that_is_a_component() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;

        let cost = exchange.get_amount_in_to_issue_exact(SET, Asset::Token(DAI), ether(10))?;
        let receipt = exchange.issue_exact_set(USER, SET, Asset::Token(DAI), ether(10), cost)?;
        assert_eq!(receipt.plan.legs[0].route, LegRoute::Passthrough);
        assert_eq!(chain.balance_of(USER, Asset::Token(DAI)), ether(1_000) - cost);

        let receipt = exchange.issue_set_for_exact_input(USER, SET, Asset::Token(DAI), ether(100), U256::from(1))?;
        assert!(!receipt.amount_out.is_zero());
        assert_router_empty(&chain);
        Ok(())
    }

    #[test]
    fn test_zero_amounts_are_invalid() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        let native = chain.balance_of(USER, Asset::Native);

        let results = [
            exchange.issue_set_for_exact_input(USER, SET, Asset::Native, U256::ZERO, U256::ZERO).map(|_| ()),
            exchange.issue_exact_set(USER, SET, Asset::Native, U256::ZERO, ether(1)).map(|_| ()),
            exchange.issue_exact_set(USER, SET, Asset::Native, ether(1), U256::ZERO).map(|_| ()),
            exchange.redeem_exact_set(USER, SET, Asset::Native, U256::ZERO, U256::ZERO).map(|_| ()),
            exchange.get_estimated_issue_amount(SET, Asset::Native, U256::ZERO).map(|_| ()),
            exchange.get_amount_in_to_issue_exact(SET, Asset::Native, U256::ZERO).map(|_| ()),
            exchange.get_amount_out_on_redeem(SET, Asset::Native, U256::ZERO).map(|_| ()),
        ];
        for result in results {
            assert!(matches!(result, Err(RouterError::InvalidInputs(_))));
        }

        assert_eq!(chain.reserve_reads(), 0);
        assert_eq!(chain.balance_of(USER, Asset::Native), native);
        Ok(())
    }

    #[test]
    fn test_ineligible_basket_fails_before_any_venue_query() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        chain.flag_external_position(SET);

        let results = [
            exchange.issue_set_for_exact_input(USER, SET, Asset::Native, ether(1), U256::ZERO).map(|_| ()),
            exchange.issue_exact_set(USER, SET, Asset::Native, ether(1), ether(1)).map(|_| ()),
            exchange.redeem_exact_set(USER, SET, Asset::Native, ether(1), U256::ZERO).map(|_| ()),
            exchange.get_estimated_issue_amount(SET, Asset::Native, ether(1)).map(|_| ()),
            exchange.get_amount_out_on_redeem(SET, Asset::Token(USDC), ether(1)).map(|_| ()),
        ];
        for result in results {
            assert!(matches!(result, Err(RouterError::IneligibleComponent(basket)) if basket == SET));
        }
        assert_eq!(chain.reserve_reads(), 0);
        Ok(())
    }

    #[test]
    fn test_unknown_basket() -> Result<()> {
        let Fixture { exchange, .. } = fixture()?;
        let result = exchange.get_amount_in_to_issue_exact(Address::repeat_byte(0x99), Asset::Native, ether(1));
        assert!(matches!(result, Err(RouterError::UnknownBasket(_))));
        Ok(())
    }

    #[test]
    fn test_illiquid_component() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;
        let result = exchange.issue_exact_set(USER, SET_ILLIQUID, Asset::Native, ether(1), ether(1));
        assert!(matches!(result, Err(RouterError::NoLiquidityPath { asset_out, .. }) if asset_out == ILLIQUID));
        assert_eq!(chain.balance_of(USER, Asset::Native), ether(1_000));
        Ok(())
    }

    #[test]
    fn test_oversized_leg_is_insufficient_liquidity() -> Result<()> {
        let Fixture { exchange, .. } = fixture()?;
        // more DAI and WBTC than any pool holds
        let result = exchange.get_amount_in_to_issue_exact(SET, Asset::Native, ether(10_000_000_000));
        assert!(matches!(result, Err(RouterError::InsufficientLiquidity { .. })));
        Ok(())
    }

    #[test]
    fn test_bounds_are_enforced_before_settlement() -> Result<()> {
        let Fixture { chain, exchange } = fixture()?;

        let cost = exchange.get_amount_in_to_issue_exact(SET, Asset::Native, ether(10))?;
        let result = exchange.issue_exact_set(USER, SET, Asset::Native, ether(10), cost - U256::from(1));
        assert!(matches!(result, Err(RouterError::ExcessiveInputRequired { required, .. }) if required == cost));

        let estimate = exchange.get_estimated_issue_amount(SET, Asset::Token(USDC), usdc(100))?;
        let result = exchange.issue_set_for_exact_input(USER, SET, Asset::Token(USDC), usdc(100), estimate + U256::from(1));
        assert!(matches!(result, Err(RouterError::SlippageExceeded { actual, .. }) if actual == estimate));

        // a budget too small to buy a single unit
        let result = exchange.issue_set_for_exact_input(USER, SET, Asset::Native, U256::from(1000), U256::ZERO);
        assert!(matches!(result, Err(RouterError::SlippageExceeded { .. })));

        exchange.issue_exact_set(USER, SET, Asset::Native, ether(10), ether(1))?;
        let proceeds = exchange.get_amount_out_on_redeem(SET, Asset::Native, ether(10))?;
        let result = exchange.redeem_exact_set(USER, SET, Asset::Native, ether(10), proceeds + U256::from(1));
        assert!(matches!(result, Err(RouterError::SlippageExceeded { .. })));

        assert_eq!(chain.balance_of(USER, Asset::Token(USDC)), usdc(10_000));
        assert_eq!(chain.balance_of(USER, Asset::Token(SET)), ether(10));
        Ok(())
    }
}
