//! The swap desk: one wallet session and everything that hangs off it.

use std::sync::Arc;

use ethers::types::Address;
use piteas::{PiteasHttpClient, TokenAddress, TokenDescriptor, TokenReader, WalletProvider};

use crate::balances::{BalanceAggregator, BalanceReport, TokenBalance};
use crate::config::SwapConfig;
use crate::error::SwapError;
use crate::executor::{SwapExecutor, SwapReceipt};
use crate::quoter::{Quote, QuoteRequest, QuoteRequester};
use crate::registry::{inspect_token, TokenInfo, TokenLookup, TokenRegistry};
use crate::session::Session;

/// Owns the session, token registry, balances, quote state and swap history.
pub struct SwapDesk {
    config: SwapConfig,
    reader: Arc<dyn TokenReader>,
    wallet: Option<Arc<dyn WalletProvider>>,
    session: Session,
    registry: TokenRegistry,
    balances: BalanceAggregator,
    quoter: QuoteRequester,
    executor: SwapExecutor,
}

impl SwapDesk {
    pub fn new(
        config: SwapConfig,
        reader: Arc<dyn TokenReader>,
        wallet: Option<Arc<dyn WalletProvider>>,
    ) -> Self {
        let client = PiteasHttpClient::new(&config.network.quote_api_url);
        let registry = TokenRegistry::new(
            client.clone(),
            config.network.token_list_url.clone(),
            config.network.chain_id,
        );
        let balances =
            BalanceAggregator::new(config.balance_batch_size, config.balance_batch_pause());
        let quoter = QuoteRequester::new(client, config.quote_cooldown());
        let executor = SwapExecutor::new(config.network.clone(), config.default_gas_limit);

        Self {
            config,
            reader,
            wallet,
            session: Session::new(),
            registry,
            balances,
            quoter,
            executor,
        }
    }

    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn balances(&self) -> &BalanceAggregator {
        &self.balances
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    // --- Session ---

    pub async fn connect(&mut self) -> Result<Address, SwapError> {
        self.session
            .connect(self.wallet.as_deref(), self.reader.as_ref())
            .await
    }

    pub async fn refresh_native_balance(&mut self) {
        self.session
            .refresh_native_balance(self.reader.as_ref())
            .await;
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    // --- Tokens ---

    pub async fn load_tokens(&mut self) -> Result<usize, SwapError> {
        self.registry.load().await
    }

    /// Parse `PLS`, an address or a listed symbol.
    pub fn resolve_token(&self, input: &str) -> Result<TokenAddress, SwapError> {
        self.registry.resolve(input)
    }

    /// On-chain metadata of `token`, with the connected account's balance.
    pub async fn inspect_token(&self, token: Address) -> Result<TokenInfo, SwapError> {
        inspect_token(self.reader.as_ref(), token, self.session.address()).await
    }

    // --- Balances ---

    /// Refresh the balance of every registry token.
    pub async fn refresh_balances(&mut self) -> Result<BalanceReport, SwapError> {
        let owner = self
            .session
            .address()
            .ok_or(SwapError::NotReady("wallet not connected"))?;
        let report = self
            .balances
            .refresh_all(
                self.reader.as_ref(),
                self.registry.tokens(),
                owner,
                self.session.native_balance(),
            )
            .await;
        Ok(report)
    }

    /// Refresh one token's balance.
    pub async fn refresh_balance(&mut self, token: &TokenAddress) -> Result<TokenBalance, SwapError> {
        let owner = self
            .session
            .address()
            .ok_or(SwapError::NotReady("wallet not connected"))?;
        let descriptor = self.descriptor(token);
        Ok(self
            .balances
            .refresh_one(
                self.reader.as_ref(),
                &descriptor,
                owner,
                self.session.native_balance(),
            )
            .await)
    }

    fn descriptor(&self, token: &TokenAddress) -> TokenDescriptor {
        let lookup = self.registry.lookup(token);
        match lookup {
            TokenLookup::Known(t) => t.clone(),
            TokenLookup::Fallback(address) => TokenDescriptor {
                address,
                symbol: lookup.display_name(),
                decimals: lookup.decimals(),
                logo_uri: None,
                name: None,
                chain_id: None,
            },
        }
    }

    // --- Quotes ---

    pub async fn request_quote(&self, request: &QuoteRequest) -> Result<Arc<Quote>, SwapError> {
        self.quoter
            .request_quote(request, &self.registry, self.session.address())
            .await
    }

    pub fn active_quote(&self) -> Option<Arc<Quote>> {
        self.quoter.active_quote()
    }

    // --- Swaps ---

    /// Swap the active quote. `request` is what is currently displayed; it
    /// must match the quote.
    pub async fn execute_swap(&mut self, request: &QuoteRequest) -> Result<SwapReceipt, SwapError> {
        let quote = self.quoter.active_quote();
        let signer = self.session.signer();
        let input_balance = self.balances.get(&request.token_in).copied();

        self.executor
            .execute_swap(
                quote.as_deref(),
                signer.as_deref(),
                self.reader.as_ref(),
                request,
                input_balance.as_ref(),
            )
            .await
    }

    pub fn last_transaction(&self) -> Option<&SwapReceipt> {
        self.executor.last_transaction()
    }
}
