//! Swap workflow configuration.

use std::time::Duration;

use piteas::PiteasConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tuneable parameters of the swap workflow.
///
/// [`Default::default()`] carries the PulseChain mainnet endpoints and the
/// production limits; CLI flags override individual fields.
#[derive(Debug, Clone)]
pub struct SwapConfig {
    /// Endpoints, chain id and router.
    pub network: PiteasConfig,
    /// Minimum time between successful quote requests in milliseconds.
    pub quote_cooldown_ms: u64,
    /// Tokens per balance wave.
    pub balance_batch_size: usize,
    /// Pause between balance waves in milliseconds.
    pub balance_batch_pause_ms: u64,
    /// Gas limit for the router call when the quote carries no estimate.
    pub default_gas_limit: u64,
    /// Slippage tolerance in percent used when none is given.
    pub default_slippage: Decimal,
}

impl SwapConfig {
    pub fn quote_cooldown(&self) -> Duration {
        Duration::from_millis(self.quote_cooldown_ms)
    }

    pub fn balance_batch_pause(&self) -> Duration {
        Duration::from_millis(self.balance_batch_pause_ms)
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            network: PiteasConfig::mainnet(),
            quote_cooldown_ms: 12_000,
            balance_batch_size: 50,
            balance_batch_pause_ms: 100,
            default_gas_limit: 300_000,
            default_slippage: dec!(0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SwapConfig::default();
        assert_eq!(config.quote_cooldown(), Duration::from_secs(12));
        assert_eq!(config.balance_batch_size, 50);
        assert_eq!(config.balance_batch_pause(), Duration::from_millis(100));
        assert_eq!(config.default_gas_limit, 300_000);
        assert_eq!(config.network.chain_id, 369);
    }
}
