use ethers::types::{Address, Bytes, U256};
use ethers::utils::to_checksum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::token::TokenAddress;

/// Query parameters for `GET /quote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteQuery {
    pub token_in: TokenAddress,
    pub token_out: TokenAddress,
    /// Input amount in the input token's smallest units.
    pub amount: U256,
    /// Slippage tolerance in percent (`0.5` = 0.5%).
    pub allowed_slippage: Decimal,
    /// Recipient/sender account; omitted from the query when `None`.
    pub account: Option<Address>,
}

impl QuoteQuery {
    /// Query pairs in the order the API documents them.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("tokenInAddress", self.token_in.to_string()),
            ("tokenOutAddress", self.token_out.to_string()),
            ("amount", self.amount.to_string()),
            ("allowedSlippage", self.allowed_slippage.normalize().to_string()),
        ];
        if let Some(account) = self.account {
            pairs.push(("account", to_checksum(&account, None)));
        }
        pairs
    }
}

/// Response body of `GET /quote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    /// Expected output in the output token's smallest units.
    #[serde(with = "u256_dec")]
    pub dest_amount: U256,
    /// Gas estimate for the router call.
    #[serde(default, with = "opt_u256_dec", skip_serializing_if = "Option::is_none")]
    pub gas_use_estimate: Option<U256>,
    pub method_parameters: MethodParameters,
}

/// Router call parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodParameters {
    pub calldata: Bytes,
}

/// Integer fields arrive either as decimal strings or as JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum IntegerRepr {
    Text(String),
    Number(u64),
}

impl IntegerRepr {
    fn into_u256(self) -> Result<U256, String> {
        match self {
            IntegerRepr::Text(s) => {
                U256::from_dec_str(s.trim()).map_err(|e| format!("invalid integer {s:?}: {e:?}"))
            }
            IntegerRepr::Number(n) => Ok(U256::from(n)),
        }
    }
}

mod u256_dec {
    use ethers::types::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::IntegerRepr;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        IntegerRepr::deserialize(deserializer)?
            .into_u256()
            .map_err(D::Error::custom)
    }
}

mod opt_u256_dec {
    use ethers::types::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::IntegerRepr;

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<U256>, D::Error> {
        match Option::<IntegerRepr>::deserialize(deserializer)? {
            Some(repr) => repr.into_u256().map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}
