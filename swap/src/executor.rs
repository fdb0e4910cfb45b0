//! Swap submission: readiness checks, approval, router transaction.

use ethers::types::{Address, TxHash, U256};
use piteas::{PiteasConfig, RouterTransaction, TokenReader, TransactionSender};
use tracing::{info, warn};

use crate::approval::{ensure_approved, ApprovalOutcome};
use crate::balances::TokenBalance;
use crate::error::SwapError;
use crate::quoter::{Quote, QuoteRequest};

/// A mined swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub tx_hash: TxHash,
    pub explorer_url: String,
    pub approval: ApprovalOutcome,
}

/// Router call for `quote`. Native input attaches the input amount as value.
pub fn build_router_transaction(quote: &Quote, router: Address, default_gas: u64) -> RouterTransaction {
    let value = if quote.request.token_in.is_native() {
        quote.amount_in
    } else {
        U256::zero()
    };
    RouterTransaction {
        to: router,
        data: quote.calldata.clone(),
        gas_limit: quote.gas_estimate.unwrap_or_else(|| U256::from(default_gas)),
        value,
    }
}

pub struct SwapExecutor {
    network: PiteasConfig,
    default_gas_limit: u64,
    last_transaction: Option<SwapReceipt>,
}

impl SwapExecutor {
    pub fn new(network: PiteasConfig, default_gas_limit: u64) -> Self {
        Self {
            network,
            default_gas_limit,
            last_transaction: None,
        }
    }

    /// The most recent successful swap.
    pub fn last_transaction(&self) -> Option<&SwapReceipt> {
        self.last_transaction.as_ref()
    }

    /// Execute `quote` for the currently displayed `request`.
    ///
    /// `input_balance` is the last known balance of a non-native input token;
    /// when it was read successfully and is below the amount the swap is
    /// refused.
    pub async fn execute_swap(
        &mut self,
        quote: Option<&Quote>,
        signer: Option<&dyn TransactionSender>,
        reader: &dyn TokenReader,
        request: &QuoteRequest,
        input_balance: Option<&TokenBalance>,
    ) -> Result<SwapReceipt, SwapError> {
        let quote = quote.ok_or(SwapError::NotReady("no quote available"))?;
        let signer = signer.ok_or(SwapError::NotReady("wallet not connected"))?;
        if !quote.matches(request) {
            return Err(SwapError::StaleQuote);
        }

        if !request.token_in.is_native() {
            if let Some(balance) = input_balance
                .filter(|b| !b.failed)
                .filter(|b| b.raw < quote.amount_in)
            {
                return Err(SwapError::InsufficientBalance {
                    symbol: quote.input_token.clone(),
                    available: balance.formatted(),
                    required: quote.input_amount.clone(),
                });
            }
        }

        let router = self.network.router_address;
        let approval =
            ensure_approved(reader, signer, &request.token_in, quote.amount_in, router).await?;

        let tx = build_router_transaction(quote, router, self.default_gas_limit);
        info!(
            to = %format!("{:#x}", tx.to),
            value = %tx.value,
            gas = %tx.gas_limit,
            "sending swap"
        );
        let tx_hash = signer.send_transaction(tx).await.map_err(|e| {
            warn!(error = %e, "swap failed");
            SwapError::from_signer(e, SwapError::SwapExecution)
        })?;

        let receipt = SwapReceipt {
            tx_hash,
            explorer_url: self.network.explorer_url(&format!("{tx_hash:#x}")),
            approval,
        };
        info!(tx = %format!("{tx_hash:#x}"), url = %receipt.explorer_url, "swap executed successfully");
        self.last_transaction = Some(receipt.clone());
        Ok(receipt)
    }
}
