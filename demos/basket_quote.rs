use alloy_primitives::{Address, U256};
use basket_router::mocks::InMemoryChain;
use basket_router::utils::constants::PRECISE_UNIT;
use basket_router::utils::ConfigLoader;
use basket_router::{Asset, BasketComponent, ExchangeIssuanceBuilder, RouterConfig};
use eyre::Result;
use std::sync::Arc;
use tracing::{info, warn};

const DAI: Address = Address::repeat_byte(0xda);
const WBTC: Address = Address::repeat_byte(0xb7);
const USDC: Address = Address::repeat_byte(0xc0);
const SET: Address = Address::repeat_byte(0x5e);
const USER: Address = Address::repeat_byte(0xa1);

/// Quotes and settles basket issuance and redemption against an in-memory chain.
///
/// Reads `demos/router.toml` (or `ROUTER_CONFIG`), falling back to environment defaults.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let file_name = std::env::var("ROUTER_CONFIG").unwrap_or_else(|_| "demos/router.toml".to_string());
    let config = match RouterConfig::load_section_from_file(file_name.clone()).await {
        Ok(config) => config,
        Err(e) => {
            warn!("Cannot load {}: {}, using environment defaults", file_name, e);
            RouterConfig::from_env()?
        }
    };

    let weth = config.wrapped_native;
    let ether = |amount: u64| U256::from(amount) * PRECISE_UNIT;
    let chain = Arc::new(InMemoryChain::new(weth));

    let mut builder = ExchangeIssuanceBuilder::new().with_config(config.clone());
    for venue in config.venues.iter() {
        chain.add_liquidity(venue.id, weth, WBTC, ether(100), ether(1));
        chain.add_liquidity(venue.id, weth, DAI, ether(10), ether(100_000));
        chain.add_liquidity(venue.id, weth, USDC, ether(100), U256::from(100_000_000_000u64));
        builder = builder.with_venue(chain.venue(venue.id, venue.fee_bps));
    }
    chain.register_basket(
        SET,
        vec![BasketComponent::new(DAI, PRECISE_UNIT / U256::from(2)), BasketComponent::new(WBTC, U256::from(100_000_000u64))],
    );
    chain.fund(USER, Asset::Native, ether(10));
    chain.fund(USER, Asset::Token(USDC), U256::from(1_000_000_000u64));

    let exchange = builder
        .with_issuance_module(chain.clone())
        .with_custody(chain.clone())
        .with_wrapped_native_adapter(chain.clone())
        .build()?;

    let usdc_in = U256::from(1_000_000_000u64);
    let units = exchange.get_estimated_issue_amount(SET, Asset::Token(USDC), usdc_in)?;
    info!("1000 USDC buys {} set units", units);

    let cost = exchange.get_amount_in_to_issue_exact(SET, Asset::Native, ether(10))?;
    info!("10 set units cost {} wei", cost);

    let receipt = exchange.issue_exact_set(USER, SET, Asset::Native, ether(10), ether(1))?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);

    let proceeds = exchange.get_amount_out_on_redeem(SET, Asset::Native, ether(10))?;
    let receipt = exchange.redeem_exact_set(USER, SET, Asset::Native, ether(10), proceeds)?;
    info!("Redeemed 10 set units for {} wei, user holds {} wei", receipt.amount_out, chain.balance_of(USER, Asset::Native));

    Ok(())
}
