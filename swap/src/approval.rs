//! ERC-20 allowance management for the router.

use ethers::types::{Address, TxHash, U256};
use piteas::{TokenAddress, TokenReader, TransactionSender};
use tracing::{debug, info};

use crate::error::SwapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Native input; nothing to approve.
    NotRequired,
    /// The existing allowance covers the amount.
    AlreadyApproved,
    /// An unlimited approval was mined.
    Approved { tx_hash: TxHash },
}

/// Make sure `spender` may move `required` units of `token` from the signer's
/// account, approving `U256::MAX` when the current allowance is short.
pub async fn ensure_approved(
    reader: &dyn TokenReader,
    signer: &dyn TransactionSender,
    token: &TokenAddress,
    required: U256,
    spender: Address,
) -> Result<ApprovalOutcome, SwapError> {
    let contract = match token {
        TokenAddress::Native => return Ok(ApprovalOutcome::NotRequired),
        TokenAddress::Contract(address) => *address,
    };
    let owner = signer.address();

    let allowance = reader
        .allowance(contract, owner, spender)
        .await
        .map_err(SwapError::Approval)?;
    debug!(token = %token, %allowance, %required, "allowance");
    if allowance >= required {
        return Ok(ApprovalOutcome::AlreadyApproved);
    }

    let tx_hash = signer
        .approve(contract, spender, U256::MAX)
        .await
        .map_err(|e| SwapError::from_signer(e, SwapError::Approval))?;
    info!(token = %token, tx = %format!("{tx_hash:#x}"), "token approved successfully");
    Ok(ApprovalOutcome::Approved { tx_hash })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChain, FakeSigner};
    use std::sync::atomic::Ordering;

    const ROUTER: Address = Address::repeat_byte(0x99);
    const TOKEN: Address = Address::repeat_byte(0x05);

    #[tokio::test]
    async fn test_native_needs_no_rpc() {
        let chain = FakeChain::default();
        let signer = FakeSigner::new(Address::repeat_byte(0x42));
        let outcome = ensure_approved(&chain, &signer, &TokenAddress::Native, U256::MAX, ROUTER)
            .await
            .unwrap();
        assert_eq!(outcome, ApprovalOutcome::NotRequired);
        assert_eq!(chain.allowance_calls.load(Ordering::SeqCst), 0);
        assert!(signer.approvals().is_empty());
    }

    #[tokio::test]
    async fn test_sufficient_allowance_no_write() {
        let mut chain = FakeChain::default();
        chain.allowances.insert(TOKEN, U256::from(1_000u64));
        let signer = FakeSigner::new(Address::repeat_byte(0x42));

        for required in [U256::from(999u64), U256::from(1_000u64)] {
            let outcome = ensure_approved(&chain, &signer, &TOKEN.into(), required, ROUTER)
                .await
                .unwrap();
            assert_eq!(outcome, ApprovalOutcome::AlreadyApproved);
        }
        assert!(signer.approvals().is_empty());
    }

    #[tokio::test]
    async fn test_short_allowance_approves_max() {
        let mut chain = FakeChain::default();
        chain.allowances.insert(TOKEN, U256::from(10u64));
        let signer = FakeSigner::new(Address::repeat_byte(0x42));

        let outcome = ensure_approved(&chain, &signer, &TOKEN.into(), U256::from(11u64), ROUTER)
            .await
            .unwrap();
        assert!(matches!(outcome, ApprovalOutcome::Approved { .. }));
        assert_eq!(signer.approvals(), vec![(TOKEN, ROUTER, U256::MAX)]);
    }

    #[tokio::test]
    async fn test_failed_approval() {
        let chain = FakeChain::default();
        let signer = FakeSigner {
            fail_approve: true,
            ..FakeSigner::new(Address::repeat_byte(0x42))
        };
        let err = ensure_approved(&chain, &signer, &TOKEN.into(), U256::one(), ROUTER)
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::Approval(_)));
    }

    #[tokio::test]
    async fn test_allowance_read_failure() {
        let mut chain = FakeChain::default();
        chain.failing.insert(TOKEN);
        let signer = FakeSigner::new(Address::repeat_byte(0x42));
        let err = ensure_approved(&chain, &signer, &TOKEN.into(), U256::one(), ROUTER)
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::Approval(_)));
        assert!(signer.approvals().is_empty());
    }
}
