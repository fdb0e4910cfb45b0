//! Rate-limited, single-flight quote requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use ethers::types::{Address, Bytes, U256};
use piteas::{
    format_amount, format_amount_padded, parse_amount, PiteasHttpClient, QuoteQuery,
    TokenAddress,
};
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::SwapError;
use crate::registry::TokenRegistry;

/// Input amounts are shown with at least this many fraction digits.
const INPUT_MIN_FRACTION_DIGITS: usize = 6;

/// What the user asked to swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub token_in: TokenAddress,
    pub token_out: TokenAddress,
    /// Human-readable amount in units of `token_in`, e.g. `"2.5"`.
    pub amount: String,
    /// Slippage tolerance in percent.
    pub slippage: Decimal,
    /// Recipient override; only sent when a wallet is connected.
    pub receiver: Option<Address>,
}

/// A priced route returned by the quote API.
#[derive(Debug, Clone)]
pub struct Quote {
    pub input_token: String,
    pub output_token: String,
    /// Formatted input amount.
    pub input_amount: String,
    /// Formatted expected output.
    pub estimated_output: String,
    pub calldata: Bytes,
    /// The request this quote was computed for.
    pub request: QuoteRequest,
    /// Input amount in smallest units.
    pub amount_in: U256,
    /// Decimals `amount_in` was parsed with.
    pub input_decimals: u8,
    /// Expected output in smallest units.
    pub dest_amount: U256,
    pub gas_estimate: Option<U256>,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    /// Gas estimate as an integer string, empty if the API gave none.
    pub fn gas_fee(&self) -> String {
        self.gas_estimate.map(|g| g.to_string()).unwrap_or_default()
    }

    /// Whether this quote was computed for `request`. Amounts compare by
    /// value, so `"2.5"` matches `"2.50"`.
    pub fn matches(&self, request: &QuoteRequest) -> bool {
        let quoted = &self.request;
        quoted.token_in == request.token_in
            && quoted.token_out == request.token_out
            && quoted.slippage == request.slippage
            && quoted.receiver == request.receiver
            && parse_amount(&request.amount, self.input_decimals).ok() == Some(self.amount_in)
    }
}

/// Clears the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fetches quotes with a cooldown between successes and at most one request
/// in flight. Holds the active quote.
pub struct QuoteRequester {
    client: PiteasHttpClient,
    cooldown: Duration,
    in_flight: AtomicBool,
    last_success: Mutex<Option<Instant>>,
    active: Mutex<Option<Arc<Quote>>>,
}

impl QuoteRequester {
    pub fn new(client: PiteasHttpClient, cooldown: Duration) -> Self {
        Self {
            client,
            cooldown,
            in_flight: AtomicBool::new(false),
            last_success: Mutex::new(None),
            active: Mutex::new(None),
        }
    }

    /// The latest successful quote.
    pub fn active_quote(&self) -> Option<Arc<Quote>> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Time left until the next request is allowed, if any.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let last = (*self.last_success.lock().unwrap_or_else(PoisonError::into_inner))?;
        self.cooldown
            .checked_sub(last.elapsed())
            .filter(|d| !d.is_zero())
    }

    /// Request a quote for `request`. `connected` is the wallet address, if
    /// any; the `account` parameter is only sent when it is present.
    ///
    /// On success the result becomes the active quote and the cooldown
    /// restarts. On failure neither changes.
    pub async fn request_quote(
        &self,
        request: &QuoteRequest,
        registry: &TokenRegistry,
        connected: Option<Address>,
    ) -> Result<Arc<Quote>, SwapError> {
        if let Some(remaining) = self.cooldown_remaining() {
            return Err(SwapError::CooldownActive { remaining });
        }
        let _guard = InFlight::acquire(&self.in_flight).ok_or(SwapError::RequestInProgress)?;

        let input = registry.lookup(&request.token_in);
        let output = registry.lookup(&request.token_out);

        let amount_text = request.amount.trim();
        if amount_text.is_empty() {
            return Err(SwapError::InvalidAmount("amount is required".into()));
        }
        let amount_in = parse_amount(amount_text, input.decimals())
            .map_err(|e| SwapError::InvalidAmount(e.to_string()))?;

        let query = QuoteQuery {
            token_in: request.token_in,
            token_out: request.token_out,
            amount: amount_in,
            allowed_slippage: request.slippage,
            account: connected.map(|address| request.receiver.unwrap_or(address)),
        };

        let response = self.client.get_quote(&query).await.map_err(|e| {
            warn!(error = %e, "quote request failed");
            SwapError::QuoteFetch(e)
        })?;

        let quote = Arc::new(Quote {
            input_token: input.label(),
            output_token: output.label(),
            input_amount: format_amount_padded(
                amount_in,
                input.decimals(),
                INPUT_MIN_FRACTION_DIGITS,
            ),
            estimated_output: format_amount(response.dest_amount, output.decimals()),
            calldata: response.method_parameters.calldata,
            request: request.clone(),
            amount_in,
            input_decimals: input.decimals(),
            dest_amount: response.dest_amount,
            gas_estimate: response.gas_use_estimate,
            fetched_at: Utc::now(),
        });

        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&quote));
        *self
            .last_success
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());

        info!(
            input = %quote.input_token,
            output = %quote.output_token,
            amount = %quote.input_amount,
            estimated = %quote.estimated_output,
            "quote fetched successfully"
        );
        Ok(quote)
    }
}
