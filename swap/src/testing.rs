//! In-memory chain, signer and wallet used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::{Address, TxHash, H256, U256};
use piteas::{
    PiteasError, Result, RouterTransaction, TokenDescriptor, TokenReader, TransactionSender,
    WalletProvider,
};

pub fn token(byte: u8, symbol: &str, decimals: u8) -> TokenDescriptor {
    TokenDescriptor {
        address: Address::repeat_byte(byte).into(),
        symbol: symbol.into(),
        decimals,
        logo_uri: None,
        name: None,
        chain_id: Some(369),
    }
}

// ---------------------------------------------------------------------------
// Chain reads
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeChain {
    pub native: U256,
    pub balances: HashMap<Address, U256>,
    pub decimals: HashMap<Address, u8>,
    pub symbols: HashMap<Address, String>,
    pub allowances: HashMap<Address, U256>,
    /// Tokens whose calls revert.
    pub failing: HashSet<Address>,
    pub fail_native: bool,
    /// Latency of every token call.
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub allowance_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeChain {
    pub fn with_token(mut self, address: Address, balance: U256, decimals: u8) -> Self {
        self.balances.insert(address, balance);
        self.decimals.insert(address, decimals);
        self
    }

    async fn enter(&self, token: Address) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.contains(&token) {
            return Err(PiteasError::Contract("execution reverted".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenReader for FakeChain {
    async fn native_balance(&self, _owner: Address) -> Result<U256> {
        if self.fail_native {
            return Err(PiteasError::Provider("connection refused".into()));
        }
        Ok(self.native)
    }

    async fn balance_of(&self, token: Address, _owner: Address) -> Result<U256> {
        self.enter(token).await?;
        Ok(self.balances.get(&token).copied().unwrap_or_default())
    }

    async fn decimals(&self, token: Address) -> Result<u8> {
        self.enter(token).await?;
        Ok(self.decimals.get(&token).copied().unwrap_or(18))
    }

    async fn symbol(&self, token: Address) -> Result<String> {
        self.enter(token).await?;
        Ok(self.symbols.get(&token).cloned().unwrap_or_default())
    }

    async fn allowance(&self, token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        self.allowance_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&token) {
            return Err(PiteasError::Contract("execution reverted".into()));
        }
        Ok(self.allowances.get(&token).copied().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeSigner {
    pub address: Address,
    pub approvals: Mutex<Vec<(Address, Address, U256)>>,
    pub sent: Mutex<Vec<RouterTransaction>>,
    pub fail_approve: bool,
    pub fail_send: bool,
    pub reject_send: bool,
}

impl FakeSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    pub fn approvals(&self) -> Vec<(Address, Address, U256)> {
        self.approvals.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<RouterTransaction> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSender for FakeSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        if self.fail_approve {
            return Err(PiteasError::TransactionFailed {
                tx_hash: format!("{:#x}", H256::repeat_byte(0xaa)),
                reason: "reverted".into(),
            });
        }
        self.approvals.lock().unwrap().push((token, spender, amount));
        Ok(H256::repeat_byte(0xaa))
    }

    async fn send_transaction(&self, tx: RouterTransaction) -> Result<TxHash> {
        if self.reject_send {
            return Err(PiteasError::Rejected("swap declined".into()));
        }
        if self.fail_send {
            return Err(PiteasError::TransactionFailed {
                tx_hash: format!("{:#x}", H256::repeat_byte(0xbb)),
                reason: "reverted".into(),
            });
        }
        self.sent.lock().unwrap().push(tx);
        Ok(H256::repeat_byte(0xcc))
    }
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

pub struct FakeWallet {
    pub accounts: Result<Vec<Address>>,
    pub signer: Arc<FakeSigner>,
}

impl FakeWallet {
    pub fn approving(signer: Arc<FakeSigner>) -> Self {
        Self {
            accounts: Ok(vec![signer.address]),
            signer,
        }
    }

    pub fn declining(signer: Arc<FakeSigner>) -> Self {
        Self {
            accounts: Err(PiteasError::Rejected("connection declined".into())),
            signer,
        }
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        match &self.accounts {
            Ok(accounts) => Ok(accounts.clone()),
            Err(PiteasError::Rejected(reason)) => Err(PiteasError::Rejected(reason.clone())),
            Err(other) => Err(PiteasError::Wallet(other.to_string())),
        }
    }

    fn signer(&self) -> Arc<dyn TransactionSender> {
        self.signer.clone()
    }
}
