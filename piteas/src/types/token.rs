use std::fmt;
use std::str::FromStr;

use ethers::types::Address;
use ethers::utils::to_checksum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::PiteasError;

/// Sentinel used by the token list and the quote API for the native coin.
pub const NATIVE_SYMBOL: &str = "PLS";
pub const NATIVE_DECIMALS: u8 = 18;
pub const NATIVE_LOGO_URI: &str = "https://assets.coingecko.com/coins/images/279/large/pulse.png";

/// A swappable asset: the chain's native coin or an ERC-20 contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenAddress {
    Native,
    Contract(Address),
}

impl TokenAddress {
    pub fn is_native(&self) -> bool {
        matches!(self, TokenAddress::Native)
    }

    /// Contract address, `None` for the native coin.
    pub fn contract(&self) -> Option<Address> {
        match self {
            TokenAddress::Native => None,
            TokenAddress::Contract(a) => Some(*a),
        }
    }
}

impl From<Address> for TokenAddress {
    fn from(a: Address) -> Self {
        TokenAddress::Contract(a)
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenAddress::Native => f.write_str(NATIVE_SYMBOL),
            TokenAddress::Contract(a) => f.write_str(&to_checksum(a, None)),
        }
    }
}

impl FromStr for TokenAddress {
    type Err = PiteasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(NATIVE_SYMBOL) {
            return Ok(TokenAddress::Native);
        }
        if !s.starts_with("0x") || s.len() != 42 {
            return Err(PiteasError::Validation(format!("invalid token address: {s}")));
        }
        s.parse::<Address>()
            .map(TokenAddress::Contract)
            .map_err(|e| PiteasError::Validation(format!("invalid token address {s}: {e}")))
    }
}

impl Serialize for TokenAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Token metadata as published by the token list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDescriptor {
    pub address: TokenAddress,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "logoURI", default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl TokenDescriptor {
    /// The locally synthesized descriptor for the native coin.
    pub fn native() -> Self {
        Self {
            address: TokenAddress::Native,
            symbol: NATIVE_SYMBOL.into(),
            decimals: NATIVE_DECIMALS,
            logo_uri: Some(NATIVE_LOGO_URI.into()),
            name: Some("Pulse".into()),
            chain_id: None,
        }
    }
}

/// Token list document: `{"tokens": [...]}`.
///
/// Entries are kept undecoded so one malformed token cannot fail the whole
/// list; [`descriptors`](Self::descriptors) decodes them one by one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenList {
    #[serde(default)]
    pub name: Option<String>,
    pub tokens: Vec<serde_json::Value>,
}

impl TokenList {
    /// Decode every entry, skipping (and logging) those that do not parse.
    pub fn descriptors(self) -> Vec<TokenDescriptor> {
        self.tokens
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                match serde_json::from_value::<TokenDescriptor>(entry) {
                    Ok(token) => Some(token),
                    Err(e) => {
                        warn!(index, error = %e, "skipping malformed token list entry");
                        None
                    }
                }
            })
            .collect()
    }
}
