//! Integration tests for JSON decoding of the token list and quote API types.
//!
//! Fixtures mirror the shapes served by the Piteas token list and the
//! `/quote` endpoint, including the loose integer encodings seen in practice.

use ethers::types::U256;
use piteas::types::*;

// ---------------------------------------------------------------------------
// TokenList
// ---------------------------------------------------------------------------

#[test]
fn test_token_list_decodes() {
    let json = r#"{
        "name": "Piteas Token List",
        "timestamp": "2024-05-01T00:00:00Z",
        "tokens": [
            {
                "chainId": 369,
                "address": "0xA1077a294dDE1B09bB078844df40758a5D0f9a27",
                "name": "Wrapped Pulse",
                "symbol": "WPLS",
                "decimals": 18,
                "logoURI": "https://example.com/wpls.png"
            },
            {
                "chainId": 369,
                "address": "0x15D38573d2feeb82e7ad5187aB8c1D52810B1f07",
                "symbol": "USDC",
                "decimals": 6
            }
        ]
    }"#;

    let list: TokenList = serde_json::from_str(json).unwrap();
    assert_eq!(list.name.as_deref(), Some("Piteas Token List"));
    let tokens = list.descriptors();
    assert_eq!(tokens.len(), 2);

    let wpls = &tokens[0];
    assert_eq!(wpls.symbol, "WPLS");
    assert_eq!(wpls.decimals, 18);
    assert_eq!(wpls.chain_id, Some(369));
    assert_eq!(wpls.logo_uri.as_deref(), Some("https://example.com/wpls.png"));
    assert!(!wpls.address.is_native());

    let usdc = &tokens[1];
    assert_eq!(usdc.decimals, 6);
    assert!(usdc.logo_uri.is_none());
}

#[test]
fn test_token_list_native_sentinel() {
    let json = r#"{"tokens": [{"address": "PLS", "symbol": "PLS", "decimals": 18}]}"#;
    let list: TokenList = serde_json::from_str(json).unwrap();
    assert_eq!(list.descriptors()[0].address, TokenAddress::Native);
}

#[test]
fn test_token_list_skips_bad_address() {
    let json = r#"{"tokens": [
        {"address": "0x123", "symbol": "BAD", "decimals": 18},
        {"address": "0x15D38573d2feeb82e7ad5187aB8c1D52810B1f07", "symbol": "USDC", "decimals": 6}
    ]}"#;
    let tokens = serde_json::from_str::<TokenList>(json).unwrap().descriptors();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].symbol, "USDC");
}

#[test]
fn test_token_list_requires_tokens_array() {
    assert!(serde_json::from_str::<TokenList>(r#"{"name": "x"}"#).is_err());
    assert!(serde_json::from_str::<TokenList>(r#"{"tokens": {}}"#).is_err());
}

#[test]
fn test_token_descriptor_serializes_logo_uri_key() {
    let native = TokenDescriptor::native();
    let value = serde_json::to_value(&native).unwrap();
    assert_eq!(value["address"], "PLS");
    assert!(value.get("logoURI").is_some());
    assert!(value.get("chainId").is_none());
}

// ---------------------------------------------------------------------------
// QuoteResponse
// ---------------------------------------------------------------------------

#[test]
fn test_quote_response_string_integers() {
    let json = r#"{
        "destAmount": "123456789000000000000",
        "gasUseEstimate": "254000",
        "methodParameters": {
            "calldata": "0x1234567890abcdef",
            "value": "0x00",
            "to": "0x6BF228eb7F8ad948d37deD07E595EfddfaAF88A6"
        },
        "route": []
    }"#;

    let quote: QuoteResponse = serde_json::from_str(json).unwrap();
    assert_eq!(
        quote.dest_amount,
        U256::from_dec_str("123456789000000000000").unwrap()
    );
    assert_eq!(quote.gas_use_estimate, Some(U256::from(254_000u64)));
    assert_eq!(
        quote.method_parameters.calldata.as_ref(),
        &[0x12, 0x34, 0x56, 0x78, 0x90, 0xab, 0xcd, 0xef]
    );
}

#[test]
fn test_quote_response_numeric_integers() {
    let json = r#"{
        "destAmount": 990000,
        "gasUseEstimate": 21000,
        "methodParameters": {"calldata": "0x"}
    }"#;
    let quote: QuoteResponse = serde_json::from_str(json).unwrap();
    assert_eq!(quote.dest_amount, U256::from(990_000u64));
    assert_eq!(quote.gas_use_estimate, Some(U256::from(21_000u64)));
    assert!(quote.method_parameters.calldata.is_empty());
}

#[test]
fn test_quote_response_missing_gas_estimate() {
    let json = r#"{"destAmount": "1", "methodParameters": {"calldata": "0xab"}}"#;
    let quote: QuoteResponse = serde_json::from_str(json).unwrap();
    assert!(quote.gas_use_estimate.is_none());

    // Re-encoding keeps integers as decimal strings.
    let value = serde_json::to_value(&quote).unwrap();
    assert_eq!(value["destAmount"], "1");
    assert!(value.get("gasUseEstimate").is_none());
}

#[test]
fn test_quote_response_malformed() {
    // Missing methodParameters.
    assert!(serde_json::from_str::<QuoteResponse>(r#"{"destAmount": "1"}"#).is_err());
    // Non-integer amount.
    let bad = r#"{"destAmount": "1.5", "methodParameters": {"calldata": "0x"}}"#;
    assert!(serde_json::from_str::<QuoteResponse>(bad).is_err());
    // Calldata that is not hex.
    let bad = r#"{"destAmount": "1", "methodParameters": {"calldata": "zz"}}"#;
    assert!(serde_json::from_str::<QuoteResponse>(bad).is_err());
}
