//! Connected wallet state.

use std::sync::Arc;

use ethers::types::{Address, U256};
use piteas::{format_amount, PiteasError, TokenReader, TransactionSender, WalletProvider};
use piteas::types::NATIVE_DECIMALS;
use tracing::{info, warn};

use crate::error::SwapError;

/// An account together with the capability to sign for it.
#[derive(Clone)]
pub struct Connection {
    pub address: Address,
    pub signer: Arc<dyn TransactionSender>,
}

/// Wallet session: either disconnected, or an address with its signer and
/// the last known native balance.
#[derive(Default)]
pub struct Session {
    connection: Option<Connection>,
    native_balance: U256,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self) -> Option<Address> {
        self.connection.as_ref().map(|c| c.address)
    }

    pub fn signer(&self) -> Option<Arc<dyn TransactionSender>> {
        self.connection.as_ref().map(|c| Arc::clone(&c.signer))
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Native balance in wei; zero while disconnected.
    pub fn native_balance(&self) -> U256 {
        self.native_balance
    }

    pub fn native_balance_formatted(&self) -> String {
        format_amount(self.native_balance, NATIVE_DECIMALS)
    }

    /// Ask the wallet for account access, store the first account and its
    /// signer, then refresh the native balance.
    pub async fn connect(
        &mut self,
        wallet: Option<&dyn WalletProvider>,
        reader: &dyn TokenReader,
    ) -> Result<Address, SwapError> {
        let wallet = wallet.ok_or_else(|| {
            SwapError::WalletUnavailable("no wallet configured (set PRIVATE_KEY)".into())
        })?;

        let accounts = wallet.request_accounts().await.map_err(|e| match e {
            PiteasError::Rejected(reason) => SwapError::UserRejected(reason),
            other => SwapError::WalletUnavailable(other.to_string()),
        })?;
        let address = accounts
            .first()
            .copied()
            .ok_or_else(|| SwapError::WalletUnavailable("wallet returned no accounts".into()))?;

        self.connection = Some(Connection {
            address,
            signer: wallet.signer(),
        });
        info!(address = %format!("{address:#x}"), "wallet connected");

        self.refresh_native_balance(reader).await;
        Ok(address)
    }

    /// Re-read the native balance. Errors are logged and the last known value
    /// is kept.
    pub async fn refresh_native_balance(&mut self, reader: &dyn TokenReader) {
        let Some(address) = self.address() else {
            return;
        };
        match reader.native_balance(address).await {
            Ok(balance) => self.native_balance = balance,
            Err(e) => warn!(error = %e, "native balance refresh failed"),
        }
    }

    pub fn disconnect(&mut self) {
        if self.connection.take().is_some() {
            info!("wallet disconnected");
        }
        self.native_balance = U256::zero();
    }
}
