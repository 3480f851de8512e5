//! # History Replay
//!
//! `HistoryVerifier` rebuilding a segment's owner across several blocks.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pc_05_childchain::{ChainError, ChainHistorySource, HistoryVerifier};
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{Segment, U256};

    use crate::integration::fixtures::{commit_block, test_chain, transfer};

    #[tokio::test]
    async fn test_history_across_blocks() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        let carol = Secp256k1KeyPair::generate();
        let dave = Secp256k1KeyPair::generate();

        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();
        t.chain
            .handle_deposit(dave.address(), 0, U256::from(100), U256::from(200), 2)
            .await
            .unwrap();
        commit_block(&t.chain, vec![transfer(&alice, &[(&bob, 0, 100)], 3)], 3).await;
        // Block 4 touches only dave's range.
        commit_block(&t.chain, vec![transfer(&dave, &[(&carol, 100, 200)], 4)], 4).await;
        commit_block(&t.chain, vec![transfer(&bob, &[(&carol, 0, 60), (&bob, 60, 100)], 5)], 5)
            .await;

        let source = Arc::new(ChainHistorySource::new(t.chain.clone()));
        let verifier = HistoryVerifier::new(t.chain.predicates().clone(), source, 2);
        let segment = Segment::from_u64(0, 100).unwrap();
        let state = verifier.verify("carol", &segment, 1, 5).await.unwrap();

        let carol_owned = state.get_owned(&carol.address());
        assert_eq!(carol_owned.len(), 1);
        assert_eq!(carol_owned[0].segment, Segment::from_u64(0, 60).unwrap());
        assert_eq!(state.get_owned(&bob.address()).len(), 1);
        assert!(state.get_owned(&alice.address()).is_empty());
        assert!(state.get_owned(&dave.address()).is_empty());
    }

    #[tokio::test]
    async fn test_history_without_deposit_is_invalid() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();
        commit_block(&t.chain, vec![transfer(&alice, &[(&bob, 0, 100)], 2)], 2).await;

        let source = Arc::new(ChainHistorySource::new(t.chain.clone()));
        let verifier = HistoryVerifier::new(t.chain.predicates().clone(), source, 2);
        let result = verifier
            .verify("bob", &Segment::from_u64(0, 100).unwrap(), 2, 2)
            .await;
        assert!(matches!(result, Err(ChainError::InvalidHistory(_))));
    }
}
