//! # Admission Control
//!
//! TxFilter, spendability and block generation as seen through the `Chain`.

#[cfg(test)]
mod tests {
    use pc_03_state_manager::StateManager;
    use pc_05_childchain::service::SNAPSHOT_KEY;
    use pc_05_childchain::{ChainDb, ChainError};
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{Segment, U256};

    use crate::integration::fixtures::{commit_block, test_chain, transfer};

    const TEN_M: u64 = 10_000_000;

    #[tokio::test]
    async fn test_filter_adjacent_and_overlapping_ranges() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(2 * TEN_M), 1)
            .await
            .unwrap();

        t.chain
            .append_tx(transfer(&alice, &[(&bob, 0, TEN_M)], 2))
            .await
            .unwrap();
        t.chain
            .append_tx(transfer(&alice, &[(&bob, TEN_M, 2 * TEN_M)], 2))
            .await
            .unwrap();
        assert_eq!(
            t.chain
                .append_tx(transfer(&alice, &[(&bob, TEN_M / 2, 3 * TEN_M / 2)], 2))
                .await,
            Err(ChainError::OverlappedInputs(
                Segment::from_u64(TEN_M / 2, 3 * TEN_M / 2).unwrap()
            ))
        );
        assert_eq!(t.chain.queue_len().await, 2);

        let generation = t.chain.generate_block().await.unwrap();
        assert_eq!(generation.included, 2);
        assert_eq!(t.chain.queue_len().await, 0);
    }

    #[tokio::test]
    async fn test_spendability() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        let carol = Secp256k1KeyPair::generate();

        // Never deposited.
        assert_eq!(
            t.chain.append_tx(transfer(&alice, &[(&bob, 0, 10)], 2)).await,
            Err(ChainError::InvalidTransaction)
        );

        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();

        // Wrong signer.
        assert_eq!(
            t.chain.append_tx(transfer(&bob, &[(&carol, 0, 10)], 2)).await,
            Err(ChainError::InvalidTransaction)
        );

        // Bob can spend only after the block carrying his output is submitted.
        commit_block(&t.chain, vec![transfer(&alice, &[(&bob, 0, 100)], 2)], 2).await;
        t.chain
            .append_tx(transfer(&bob, &[(&carol, 0, 10)], 3))
            .await
            .unwrap();
        t.chain.clear().await;

        // Exited ranges are frozen.
        t.chain
            .handle_exit(bob.address(), Segment::from_u64(0, 10).unwrap(), 2)
            .await
            .unwrap();
        assert_eq!(
            t.chain.append_tx(transfer(&bob, &[(&carol, 0, 10)], 3)).await,
            Err(ChainError::InvalidTransaction)
        );
        t.chain
            .append_tx(transfer(&bob, &[(&carol, 10, 100)], 3))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_exit_before_generation_drops_tx() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();

        let exited = transfer(&alice, &[(&bob, 0, 50)], 2);
        let kept = transfer(&alice, &[(&bob, 50, 100)], 2);
        t.chain.append_tx(exited.clone()).await.unwrap();
        t.chain.append_tx(kept).await.unwrap();
        t.chain
            .handle_exit(alice.address(), Segment::from_u64(0, 50).unwrap(), 1)
            .await
            .unwrap();

        let generation = t.chain.generate_block().await.unwrap();
        assert_eq!(generation.included, 1);
        assert_eq!(generation.dropped, vec![exited.hash()]);
    }

    #[tokio::test]
    async fn test_all_dropped_is_no_valid_transactions() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();
        t.chain
            .append_tx(transfer(&alice, &[(&bob, 0, 100)], 2))
            .await
            .unwrap();
        t.chain
            .handle_exit(alice.address(), Segment::from_u64(0, 100).unwrap(), 1)
            .await
            .unwrap();
        assert_eq!(
            t.chain.generate_block().await,
            Err(ChainError::NoValidTransactions)
        );
    }

    #[tokio::test]
    async fn test_stored_snapshot_is_stable() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();
        commit_block(&t.chain, vec![transfer(&alice, &[(&bob, 0, 30), (&alice, 30, 100)], 2)], 2)
            .await;
        t.chain
            .handle_exit(alice.address(), Segment::from_u64(40, 60).unwrap(), 2)
            .await
            .unwrap();

        let bytes = t.db.get(SNAPSHOT_KEY).await.unwrap().unwrap();
        let restored = StateManager::deserialize(t.chain.predicates().clone(), &bytes).unwrap();
        assert_eq!(restored.serialize().unwrap(), bytes);
        assert_eq!(restored.get_exiting().len(), 1);
        assert_eq!(restored.len(), 4);
    }
}
