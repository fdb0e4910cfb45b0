use ethers::types::Address;

/// Piteas router on PulseChain.
pub const ROUTER_ADDRESS: &str = "0x6BF228eb7F8ad948d37deD07E595EfddfaAF88A6";
/// PulseChain mainnet chain id.
pub const CHAIN_ID: u64 = 369;
pub const PULSECHAIN_RPC_URL: &str = "https://rpc.pulsechain.com";
pub const QUOTE_API_URL: &str = "https://sdk.piteas.io";
pub const TOKEN_LIST_URL: &str =
    "https://raw.githubusercontent.com/piteasio/app-tokens/main/piteas-tokenlist.json";
/// Transaction page prefix on the PulseChain Otterscan explorer.
pub const EXPLORER_TX_URL: &str = "https://otter-pulsechain.g4mm4.io/tx/";

/// Configuration for the Piteas client.
#[derive(Debug, Clone)]
pub struct PiteasConfig {
    /// Base URL for the quote API (e.g. `https://sdk.piteas.io`).
    pub quote_api_url: String,
    /// Absolute URL of the token list JSON document.
    pub token_list_url: String,
    /// JSON-RPC endpoint of the chain.
    pub rpc_url: String,
    /// Chain id used when signing transactions.
    pub chain_id: u64,
    /// Router contract that receives swap calldata and token approvals.
    pub router_address: Address,
    /// Explorer prefix; the transaction hash is appended.
    pub explorer_tx_url: String,
}

impl PiteasConfig {
    /// PulseChain mainnet endpoints.
    pub fn mainnet() -> Self {
        Self {
            quote_api_url: QUOTE_API_URL.into(),
            token_list_url: TOKEN_LIST_URL.into(),
            rpc_url: PULSECHAIN_RPC_URL.into(),
            chain_id: CHAIN_ID,
            router_address: router_address(),
            explorer_tx_url: EXPLORER_TX_URL.into(),
        }
    }

    /// Explorer link for a transaction hash.
    pub fn explorer_url(&self, tx_hash: &str) -> String {
        format!("{}{}", self.explorer_tx_url, tx_hash)
    }
}

impl Default for PiteasConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// The router address as a typed [`Address`].
pub fn router_address() -> Address {
    // Constant literal, checked by `test_router_address_parses`.
    ROUTER_ADDRESS.parse().unwrap_or_default()
}
