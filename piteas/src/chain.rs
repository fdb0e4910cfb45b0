//! Chain capabilities used by the swap workflow, plus their `ethers` backed
//! implementations.
//!
//! The workflow only talks to the traits: [`TokenReader`] for view calls,
//! [`TransactionSender`] for signed writes and [`WalletProvider`] for the
//! account handshake. Every write waits for its receipt and fails on a
//! reverted or dropped transaction.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::contract::{abigen, ContractError};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, TransactionReceipt, TransactionRequest, TxHash, U256, U64};
use tracing::debug;

use crate::error::{PiteasError, Result};

abigen!(
    Erc20,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
        function decimals() external view returns (uint8)
        function symbol() external view returns (string)
        function allowance(address owner, address spender) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
    ]"#
);

/// A signed call to the router, as built from a quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterTransaction {
    pub to: Address,
    pub data: Bytes,
    pub gas_limit: U256,
    /// Native value attached to the call; zero for ERC-20 inputs.
    pub value: U256,
}

/// Read-only chain access.
#[async_trait]
pub trait TokenReader: Send + Sync {
    /// Native coin balance in wei.
    async fn native_balance(&self, owner: Address) -> Result<U256>;
    /// ERC-20 `balanceOf(owner)`.
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;
    /// ERC-20 `decimals()`.
    async fn decimals(&self, token: Address) -> Result<u8>;
    /// ERC-20 `symbol()`.
    async fn symbol(&self, token: Address) -> Result<String>;
    /// ERC-20 `allowance(owner, spender)`.
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;
}

/// Signed writes from one account. Both methods return once the transaction
/// is mined successfully.
#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// Account that signs.
    fn address(&self) -> Address;
    /// ERC-20 `approve(spender, amount)`.
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash>;
    /// Raw router call.
    async fn send_transaction(&self, tx: RouterTransaction) -> Result<TxHash>;
}

/// Wallet handshake.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask for account access. Returns `PiteasError::Rejected` if the user
    /// declines.
    async fn request_accounts(&self) -> Result<Vec<Address>>;
    /// Signing capability for the granted account.
    fn signer(&self) -> Arc<dyn TransactionSender>;
}

fn contract_err<M: Middleware>(e: ContractError<M>) -> PiteasError {
    PiteasError::Contract(e.to_string())
}

/// Map a mined receipt to success or `TransactionFailed`.
pub fn check_receipt(tx_hash: TxHash, receipt: Option<TransactionReceipt>) -> Result<TxHash> {
    match receipt {
        None => Err(PiteasError::TransactionFailed {
            tx_hash: format!("{tx_hash:#x}"),
            reason: "dropped before confirmation".into(),
        }),
        Some(r) if r.status == Some(U64::zero()) => Err(PiteasError::TransactionFailed {
            tx_hash: format!("{tx_hash:#x}"),
            reason: "reverted".into(),
        }),
        Some(r) => Ok(r.transaction_hash),
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC reader
// ---------------------------------------------------------------------------

/// [`TokenReader`] over an HTTP JSON-RPC provider.
#[derive(Debug, Clone)]
pub struct EvmChain {
    provider: Arc<Provider<Http>>,
}

impl EvmChain {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| PiteasError::Provider(format!("invalid RPC URL {rpc_url}: {e}")))?;
        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    fn erc20(&self, token: Address) -> Erc20<Provider<Http>> {
        Erc20::new(token, Arc::clone(&self.provider))
    }
}

#[async_trait]
impl TokenReader for EvmChain {
    async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.provider
            .get_balance(owner, None)
            .await
            .map_err(|e| PiteasError::Provider(e.to_string()))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        let contract = self.erc20(token);
        let call = contract.balance_of(owner);
        call.call().await.map_err(contract_err)
    }

    async fn decimals(&self, token: Address) -> Result<u8> {
        let contract = self.erc20(token);
        let call = contract.decimals();
        call.call().await.map_err(contract_err)
    }

    async fn symbol(&self, token: Address) -> Result<String> {
        let contract = self.erc20(token);
        let call = contract.symbol();
        call.call().await.map_err(contract_err)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let contract = self.erc20(token);
        let call = contract.allowance(owner, spender);
        call.call().await.map_err(contract_err)
    }
}

// ---------------------------------------------------------------------------
// Local-key signer
// ---------------------------------------------------------------------------

pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// [`TransactionSender`] backed by a local private key.
#[derive(Debug, Clone)]
pub struct EvmSigner {
    client: Arc<SignerClient>,
}

impl EvmSigner {
    pub fn new(provider: Provider<Http>, wallet: LocalWallet, chain_id: u64) -> Self {
        let wallet = wallet.with_chain_id(chain_id);
        Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
        }
    }

    /// Build a signer from a hex private key (with or without `0x`).
    pub fn from_private_key(rpc_url: &str, private_key: &str, chain_id: u64) -> Result<Self> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let wallet: LocalWallet = key
            .parse()
            .map_err(|e| PiteasError::Wallet(format!("invalid private key: {e}")))?;
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| PiteasError::Provider(format!("invalid RPC URL {rpc_url}: {e}")))?;
        Ok(Self::new(provider, wallet, chain_id))
    }
}

#[async_trait]
impl TransactionSender for EvmSigner {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        let contract = Erc20::new(token, Arc::clone(&self.client));
        let call = contract.approve(spender, amount);
        let pending = call.send().await.map_err(contract_err)?;
        let tx_hash = pending.tx_hash();
        debug!(tx = %format!("{tx_hash:#x}"), "approval submitted");
        let receipt = pending
            .await
            .map_err(|e| PiteasError::Provider(e.to_string()))?;
        check_receipt(tx_hash, receipt)
    }

    async fn send_transaction(&self, tx: RouterTransaction) -> Result<TxHash> {
        let request = TransactionRequest::new()
            .from(self.client.address())
            .to(tx.to)
            .data(tx.data)
            .gas(tx.gas_limit)
            .value(tx.value);
        let pending = self
            .client
            .send_transaction(request, None)
            .await
            .map_err(|e| PiteasError::Provider(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        debug!(tx = %format!("{tx_hash:#x}"), "transaction submitted");
        let receipt = pending
            .await
            .map_err(|e| PiteasError::Provider(e.to_string()))?;
        check_receipt(tx_hash, receipt)
    }
}
