//! Token registry: the remote token list plus the native coin.

use ethers::types::Address;
use piteas::types::NATIVE_DECIMALS;
use piteas::utils::find_token;
use piteas::{format_amount, PiteasHttpClient, TokenAddress, TokenDescriptor, TokenReader};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::SwapError;

/// Decimals assumed for a token that is not in the registry.
pub const FALLBACK_DECIMALS: u8 = NATIVE_DECIMALS;

/// Result of [`TokenRegistry::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLookup<'a> {
    Known(&'a TokenDescriptor),
    /// Not in the registry; amounts use [`FALLBACK_DECIMALS`].
    Fallback(TokenAddress),
}

impl TokenLookup<'_> {
    pub fn decimals(&self) -> u8 {
        match self {
            TokenLookup::Known(t) => t.decimals,
            TokenLookup::Fallback(_) => FALLBACK_DECIMALS,
        }
    }

    /// Symbol for display; unknown tokens show their address.
    pub fn display_name(&self) -> String {
        match self {
            TokenLookup::Known(t) => t.symbol.clone(),
            TokenLookup::Fallback(address) => address.to_string(),
        }
    }

    /// `"SYMBOL (address)"` for listed contracts, so a listed token can be
    /// told apart from another contract with the same symbol.
    pub fn label(&self) -> String {
        match self {
            TokenLookup::Known(t) if !t.address.is_native() => {
                format!("{} ({})", t.symbol, t.address)
            }
            _ => self.display_name(),
        }
    }
}

/// Tokens available for swapping. The native descriptor is always first.
pub struct TokenRegistry {
    client: PiteasHttpClient,
    list_url: String,
    chain_id: u64,
    tokens: Vec<TokenDescriptor>,
}

impl TokenRegistry {
    /// An empty registry; call [`load`](Self::load) to populate it.
    pub fn new(client: PiteasHttpClient, list_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            client,
            list_url: list_url.into(),
            chain_id,
            tokens: Vec::new(),
        }
    }

    /// Fetch the token list and replace the registry contents. On failure the
    /// previous contents are kept.
    pub async fn load(&mut self) -> Result<usize, SwapError> {
        let list = self
            .client
            .get_token_list(&self.list_url)
            .await
            .map_err(|e| {
                warn!(url = %self.list_url, error = %e, "token list load failed");
                SwapError::RegistryLoad(e)
            })?;

        let remote = list.tokens.len();
        self.tokens = with_native(list.descriptors(), self.chain_id);
        info!(
            remote,
            tokens = self.tokens.len(),
            "token list loaded successfully"
        );
        Ok(self.tokens.len())
    }

    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    pub fn lookup(&self, address: &TokenAddress) -> TokenLookup<'_> {
        match find_token(&self.tokens, address) {
            Some(token) => TokenLookup::Known(token),
            None => TokenLookup::Fallback(*address),
        }
    }

    /// Resolve user input: `PLS`, a `0x` address, or a symbol from the list
    /// (case-insensitive, first match).
    pub fn resolve(&self, input: &str) -> Result<TokenAddress, SwapError> {
        let input = input.trim();
        if let Ok(address) = input.parse::<TokenAddress>() {
            return Ok(address);
        }
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(input))
            .map(|t| t.address)
            .ok_or_else(|| SwapError::Config(format!("unknown token {input:?}")))
    }
}

/// Drop native entries and other chains from `remote` and put the native
/// descriptor first.
fn with_native(remote: Vec<TokenDescriptor>, chain_id: u64) -> Vec<TokenDescriptor> {
    let mut tokens = Vec::with_capacity(remote.len() + 1);
    tokens.push(TokenDescriptor::native());
    tokens.extend(
        remote
            .into_iter()
            .filter(|t| !t.address.is_native())
            .filter(|t| t.chain_id.map_or(true, |id| id == chain_id)),
    );
    tokens
}

// ---------------------------------------------------------------------------
// Token inspection
// ---------------------------------------------------------------------------

/// On-chain metadata of an arbitrary token contract.
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub address: TokenAddress,
    pub symbol: String,
    pub decimals: u8,
    /// Formatted balance of the owner, when one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

/// Read `symbol`, `decimals` and optionally `balanceOf(owner)` concurrently.
pub async fn inspect_token(
    reader: &dyn TokenReader,
    token: Address,
    owner: Option<Address>,
) -> Result<TokenInfo, SwapError> {
    let balance = async {
        match owner {
            Some(owner) => reader.balance_of(token, owner).await.map(Some),
            None => Ok(None),
        }
    };
    let (symbol, decimals, balance) =
        tokio::try_join!(reader.symbol(token), reader.decimals(token), balance)
            .map_err(SwapError::TokenRead)?;

    Ok(TokenInfo {
        address: token.into(),
        symbol,
        decimals,
        balance: balance.map(|b| format_amount(b, decimals)),
    })
}
