//! Local-key wallet with interactive confirmation.
//!
//! Connecting and sending a swap both ask on the terminal unless
//! confirmation is disabled (`--yes`). A "no" surfaces as
//! `PiteasError::Rejected`.

use std::io::{BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use ethers::utils::format_ether;
use piteas::{
    EvmSigner, PiteasConfig, PiteasError, Result, RouterTransaction, TransactionSender,
    WalletProvider,
};

/// How confirmations are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    /// Answer yes to every prompt.
    Always,
    /// Ask on stderr and read the answer from stdin.
    Prompt,
}

impl Confirm {
    async fn ask(self, question: String) -> Result<bool> {
        match self {
            Confirm::Always => Ok(true),
            Confirm::Prompt => tokio::task::spawn_blocking(move || read_answer(&question))
                .await
                .map_err(|e| PiteasError::Wallet(format!("prompt task failed: {e}")))?,
        }
    }
}

fn read_answer(question: &str) -> Result<bool> {
    let mut stderr = std::io::stderr().lock();
    write!(stderr, "{question} [y/N] ")
        .and_then(|_| stderr.flush())
        .map_err(|e| PiteasError::Wallet(e.to_string()))?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| PiteasError::Wallet(e.to_string()))?;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// [`WalletProvider`] over a private key.
pub struct KeyWallet {
    signer: Arc<ConfirmingSigner>,
    confirm: Confirm,
}

impl KeyWallet {
    pub fn new(signer: EvmSigner, confirm: Confirm) -> Self {
        Self {
            signer: Arc::new(ConfirmingSigner {
                inner: signer,
                confirm,
            }),
            confirm,
        }
    }

    /// Build from a hex private key against `network`.
    pub fn from_private_key(network: &PiteasConfig, private_key: &str, confirm: Confirm) -> Result<Self> {
        let signer = EvmSigner::from_private_key(&network.rpc_url, private_key, network.chain_id)?;
        Ok(Self::new(signer, confirm))
    }
}

#[async_trait]
impl WalletProvider for KeyWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let address = self.signer.address();
        let question = format!("Connect wallet {address:#x}?");
        if !self.confirm.ask(question).await? {
            return Err(PiteasError::Rejected("wallet connection declined".into()));
        }
        Ok(vec![address])
    }

    fn signer(&self) -> Arc<dyn TransactionSender> {
        self.signer.clone()
    }
}

/// Asks before every router transaction. Approvals go through unprompted;
/// they are part of the confirmed swap.
struct ConfirmingSigner {
    inner: EvmSigner,
    confirm: Confirm,
}

#[async_trait]
impl TransactionSender for ConfirmingSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        self.inner.approve(token, spender, amount).await
    }

    async fn send_transaction(&self, tx: RouterTransaction) -> Result<TxHash> {
        let question = format!(
            "Send swap to router {:#x} with {} PLS attached (gas limit {})?",
            tx.to,
            format_ether(tx.value),
            tx.gas_limit
        );
        if !self.confirm.ask(question).await? {
            return Err(PiteasError::Rejected("swap declined".into()));
        }
        self.inner.send_transaction(tx).await
    }
}
