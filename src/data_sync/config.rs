use crate::logic::venues::VenueId;
use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use crate::utils::constants::{DEFAULT_FEE_BPS, FEE_DENOMINATOR_BPS, WETH};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Clone, Deserialize, Debug)]
pub struct RouterConfigRoot {
    pub router: RouterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VenueConfig {
    pub id: VenueId,
    pub name: String,
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u32,
}

fn default_fee_bps() -> u32 {
    DEFAULT_FEE_BPS
}

/// Configuration of the router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Canonical wrapped-native token, the hub of every route
    pub wrapped_native: Address,
    pub venues: Vec<VenueConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            wrapped_native: WETH,
            venues: vec![
                VenueConfig { id: VenueId::Primary, name: "uniswap-v2".to_string(), fee_bps: DEFAULT_FEE_BPS },
                VenueConfig { id: VenueId::Secondary, name: "sushiswap".to_string(), fee_bps: DEFAULT_FEE_BPS },
            ],
        }
    }
}

impl RouterConfig {
    /// Defaults overridden by environment variables
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(wrapped_native) = std::env::var("ROUTER_WRAPPED_NATIVE") {
            config.wrapped_native =
                Address::from_str(&wrapped_native).map_err(|e| eyre::eyre!("Invalid ROUTER_WRAPPED_NATIVE: {}", e))?;
        }

        if let Ok(fee_str) = std::env::var("ROUTER_PRIMARY_FEE_BPS") {
            config.set_fee_bps(VenueId::Primary, fee_str.parse().map_err(|e| eyre::eyre!("Invalid ROUTER_PRIMARY_FEE_BPS: {}", e))?);
        }

        if let Ok(fee_str) = std::env::var("ROUTER_SECONDARY_FEE_BPS") {
            config
                .set_fee_bps(VenueId::Secondary, fee_str.parse().map_err(|e| eyre::eyre!("Invalid ROUTER_SECONDARY_FEE_BPS: {}", e))?);
        }

        config.validate()?;
        Ok(config)
    }

    fn set_fee_bps(&mut self, id: VenueId, fee_bps: u32) {
        for venue in self.venues.iter_mut().filter(|venue| venue.id == id) {
            venue.fee_bps = fee_bps;
        }
    }

    pub fn venue(&self, id: VenueId) -> Option<&VenueConfig> {
        self.venues.iter().find(|venue| venue.id == id)
    }

    pub fn validate(&self) -> Result<(), LoadConfigError> {
        if self.venues.is_empty() {
            return Err(LoadConfigError::ConfigError("at least one venue is required".to_string()));
        }
        let mut seen = HashSet::new();
        for venue in &self.venues {
            if !seen.insert(venue.id) {
                return Err(LoadConfigError::ConfigError(format!("duplicate venue {}", venue.id)));
            }
            if venue.fee_bps >= FEE_DENOMINATOR_BPS {
                return Err(LoadConfigError::ConfigError(format!("fee of {} must be below {} bps", venue.id, FEE_DENOMINATOR_BPS)));
            }
        }
        if self.wrapped_native.is_zero() {
            return Err(LoadConfigError::ConfigError("wrapped_native must not be the native sentinel".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigLoader for RouterConfig {
    type SectionType = RouterConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: RouterConfigRoot = load_from_file(file_name).await?;
        root.router.validate()?;
        Ok(root.router)
    }
}

impl ConfigLoaderSync for RouterConfig {
    type SectionType = RouterConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: RouterConfigRoot = load_from_file_sync(file_name)?;
        root.router.validate()?;
        Ok(root.router)
    }
}
