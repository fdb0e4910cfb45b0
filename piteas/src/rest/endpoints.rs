use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::rest::PiteasHttpClient;
use crate::types::*;

/// Path of the quote endpoint relative to the API base URL.
pub const QUOTE_PATH: &str = "/quote";

impl PiteasHttpClient {
    // --- Quotes ---

    /// GET /quote - Route and calldata for a swap.
    pub async fn get_quote(&self, query: &QuoteQuery) -> Result<QuoteResponse> {
        let pairs = query.to_query_pairs();
        debug!(
            token_in = %query.token_in,
            token_out = %query.token_out,
            amount = %query.amount,
            "requesting quote"
        );
        self.get(QUOTE_PATH, &pairs).await
    }

    /// Full URL that [`get_quote`](Self::get_quote) requests, for display and logging.
    pub fn quote_url(&self, query: &QuoteQuery) -> Result<Url> {
        let base = format!("{}{}", self.base_url(), QUOTE_PATH);
        let url = Url::parse_with_params(&base, query.to_query_pairs())?;
        Ok(url)
    }

    // --- Token list ---

    /// GET an absolute token list URL (`{"tokens": [...]}`).
    pub async fn get_token_list(&self, url: &str) -> Result<TokenList> {
        let empty: [(&str, &str); 0] = [];
        self.get_url(url, &empty).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_url_native_ten_tokens() {
        let client = PiteasHttpClient::new("https://sdk.piteas.io/");
        let query = QuoteQuery {
            token_in: TokenAddress::Native,
            token_out: "0xA1077a294dDE1B09bB078844df40758a5D0f9a27".parse().unwrap(),
            amount: U256::from_dec_str("10000000000000000000").unwrap(),
            allowed_slippage: dec!(0.5),
            account: None,
        };
        let url = client.quote_url(&query).unwrap();
        assert_eq!(url.path(), "/quote");
        let q = url.query().unwrap();
        assert!(q.starts_with("tokenInAddress=PLS&"), "{q}");
        assert!(q.contains("amount=10000000000000000000&allowedSlippage=0.5"), "{q}");
        assert!(!q.contains("account="), "{q}");
    }
}
