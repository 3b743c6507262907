use crate::utils::constants::NATIVE;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An input or output asset of a request: the network's native currency or a fungible token.
///
/// Native currency never touches a venue directly. It is wrapped into the canonical
/// wrapped-native token on entry and unwrapped on exit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Asset {
    Native,
    Token(Address),
}

impl Asset {
    pub fn token(address: Address) -> Self {
        // the zero address is the native sentinel
        if address == NATIVE { Asset::Native } else { Asset::Token(address) }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    pub fn get_address(&self) -> Address {
        match self {
            Asset::Native => NATIVE,
            Asset::Token(address) => *address,
        }
    }

    /// The address this asset trades as on a venue.
    pub fn normalize(&self, wrapped_native: Address) -> Address {
        match self {
            Asset::Native => wrapped_native,
            Asset::Token(address) => *address,
        }
    }
}

impl From<Address> for Asset {
    fn from(address: Address) -> Self {
        Asset::token(address)
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Asset::Native => write!(f, "NATIVE"),
            Asset::Token(address) => write!(f, "{address}"),
        }
    }
}
