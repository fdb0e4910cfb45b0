//! Batched balance polling.
//!
//! Token balances are fetched in waves: every call inside a wave runs
//! concurrently, waves run one after another in list order with a pause in
//! between. A token whose calls fail is recorded as zero and never aborts
//! its wave.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use ethers::types::{Address, U256};
use futures_util::future::join_all;
use piteas::{format_amount, TokenAddress, TokenDescriptor, TokenReader};
use tracing::{debug, info, warn};

/// Balance of one token in smallest units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBalance {
    pub raw: U256,
    pub decimals: u8,
    /// The on-chain read failed and `raw` is a zero placeholder.
    pub failed: bool,
}

impl TokenBalance {
    pub fn formatted(&self) -> String {
        format_amount(self.raw, self.decimals)
    }
}

pub type BalanceMap = HashMap<TokenAddress, TokenBalance>;

/// Summary of one [`BalanceAggregator::refresh_all`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalanceReport {
    pub tokens: usize,
    pub waves: usize,
    pub failures: usize,
}

// ---------------------------------------------------------------------------
// Wave runner
// ---------------------------------------------------------------------------

/// Run `f` over `items` in waves of `wave_size`, concurrently within a wave,
/// sleeping `pause` between consecutive waves. Results keep item order.
pub async fn run_waves<T, R, F, Fut>(
    items: &[T],
    wave_size: usize,
    pause: Duration,
    f: F,
) -> (Vec<R>, usize)
where
    F: Fn(&T) -> Fut,
    Fut: Future<Output = R>,
{
    let wave_size = wave_size.max(1);
    let total = items.len().div_ceil(wave_size);
    let mut results = Vec::with_capacity(items.len());

    for (idx, wave) in items.chunks(wave_size).enumerate() {
        debug!(wave = idx + 1, total, size = wave.len(), "WAVE");
        results.extend(join_all(wave.iter().map(&f)).await);

        if idx + 1 < total {
            tokio::time::sleep(pause).await;
        }
    }

    (results, total)
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Latest known balance of every registry token for the connected account.
#[derive(Debug, Clone)]
pub struct BalanceAggregator {
    batch_size: usize,
    pause: Duration,
    balances: BalanceMap,
}

impl BalanceAggregator {
    pub fn new(batch_size: usize, pause: Duration) -> Self {
        Self {
            batch_size,
            pause,
            balances: BalanceMap::new(),
        }
    }

    pub fn balances(&self) -> &BalanceMap {
        &self.balances
    }

    pub fn get(&self, token: &TokenAddress) -> Option<&TokenBalance> {
        self.balances.get(token)
    }

    /// Fetch every token's balance for `owner`. The native entry is taken
    /// from `native_balance` without an RPC call.
    pub async fn refresh_all(
        &mut self,
        reader: &dyn TokenReader,
        tokens: &[TokenDescriptor],
        owner: Address,
        native_balance: U256,
    ) -> BalanceReport {
        let fetch = |token: &TokenDescriptor| {
            let descriptor = token.clone();
            async move { fetch_balance(reader, &descriptor, owner, native_balance).await }
        };
        let (results, waves) = run_waves(tokens, self.batch_size, self.pause, fetch).await;

        let mut balances = BalanceMap::with_capacity(tokens.len());
        let mut failures = 0;
        for (token, balance) in tokens.iter().zip(results) {
            if balance.failed {
                failures += 1;
            }
            balances.insert(token.address, balance);
        }
        self.balances = balances;

        let report = BalanceReport {
            tokens: tokens.len(),
            waves,
            failures,
        };
        info!(
            tokens = report.tokens,
            waves = report.waves,
            failures = report.failures,
            "balances fetched"
        );
        report
    }

    /// Refresh a single entry.
    pub async fn refresh_one(
        &mut self,
        reader: &dyn TokenReader,
        token: &TokenDescriptor,
        owner: Address,
        native_balance: U256,
    ) -> TokenBalance {
        let balance = fetch_balance(reader, token, owner, native_balance).await;
        self.balances.insert(token.address, balance);
        balance
    }
}

async fn fetch_balance(
    reader: &dyn TokenReader,
    token: &TokenDescriptor,
    owner: Address,
    native_balance: U256,
) -> TokenBalance {
    let contract = match token.address {
        TokenAddress::Native => {
            return TokenBalance {
                raw: native_balance,
                decimals: token.decimals,
                failed: false,
            }
        }
        TokenAddress::Contract(address) => address,
    };

    match tokio::try_join!(reader.balance_of(contract, owner), reader.decimals(contract)) {
        Ok((raw, decimals)) => TokenBalance {
            raw,
            decimals,
            failed: false,
        },
        Err(e) => {
            warn!(token = %token.symbol, address = %token.address, error = %e, "balance fetch failed");
            TokenBalance {
                raw: U256::zero(),
                decimals: token.decimals,
                failed: true,
            }
        }
    }
}
