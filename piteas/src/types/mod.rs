mod quote;
mod token;

pub use quote::{MethodParameters, QuoteQuery, QuoteResponse};
pub use token::{
    TokenAddress, TokenDescriptor, TokenList, NATIVE_DECIMALS, NATIVE_LOGO_URI, NATIVE_SYMBOL,
};
