//! # End-to-End Flow
//!
//! Deposit → transfer → block generation → submission → proofs, all through
//! the `Chain` and verified with the stateless sum Merkle verifier.

#[cfg(test)]
mod tests {
    use pc_04_block::CoinProof;
    use pc_05_childchain::ChainError;
    use rand::Rng;
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::U256;

    use crate::integration::fixtures::{commit_block, test_chain, transfer};

    #[tokio::test]
    async fn test_inclusion_proof_verifies_and_tampering_fails() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();

        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();
        let tx = transfer(&alice, &[(&bob, 0, 100)], 2);
        let root = commit_block(&t.chain, vec![tx.clone()], 2).await;

        let bundles = t.chain.get_transaction_proofs(2, &tx.hash()).await.unwrap();
        assert_eq!(bundles.len(), 1);
        let bundle = &bundles[0];
        assert_eq!(bundle.root, root);
        assert_eq!(bundle.tx_bytes(), tx.tx().to_bytes());
        assert_eq!(bundle.signatures().len(), 1);
        assert!(bundle.check_inclusion());

        for i in 0..bundle.proof_bytes().len() {
            let mut tampered = bundle.clone();
            tampered.proof.proof[i] ^= 0x01;
            assert!(!tampered.check_inclusion(), "byte {} flipped still verified", i);
        }

        let mut wrong_root = bundle.clone();
        wrong_root.root[0] ^= 0x01;
        assert!(!wrong_root.check_inclusion());
    }

    #[tokio::test]
    async fn test_split_with_change() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        let split = rand::thread_rng().gen_range(1..100u64);

        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();
        let tx = transfer(&alice, &[(&bob, 0, split), (&alice, split, 100)], 2);
        commit_block(&t.chain, vec![tx.clone()], 2).await;

        let bob_owned = t.chain.get_owned_segments(&bob.address()).await;
        assert_eq!(bob_owned.len(), 1);
        assert_eq!(bob_owned[0].segment.end(), U256::from(split));
        let alice_owned = t.chain.get_owned_segments(&alice.address()).await;
        assert_eq!(alice_owned.len(), 1);
        assert_eq!(alice_owned[0].segment.start(), U256::from(split));

        let bob_txs = t.chain.get_user_transactions(2, &bob.address()).await.unwrap();
        assert_eq!(bob_txs.len(), 1);
        assert_eq!(bob_txs[0].output_index, 0);
        assert!(bob_txs[0].check_inclusion());

        let alice_txs = t
            .chain
            .get_user_transactions(2, &alice.address())
            .await
            .unwrap();
        assert_eq!(alice_txs.len(), 1);
        assert_eq!(alice_txs[0].output_index, 1);
    }

    #[tokio::test]
    async fn test_unused_range_has_exclusion_proof() {
        let t = test_chain();
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();
        commit_block(&t.chain, vec![transfer(&alice, &[(&bob, 0, 100)], 2)], 2).await;

        let mut block = t.chain.get_block(2).await.unwrap();
        let exclusion = block.get_exclusion_proof(U256::from(5_000)).unwrap();
        assert!(exclusion.check_exclusion());
        assert!(exclusion.segment().contains_offset(U256::from(5_000)));

        match block.create_coin_proof(U256::from(50)).unwrap() {
            CoinProof::Inclusion(bundle) => assert!(bundle.check_inclusion()),
            other => panic!("expected inclusion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chain_of_transfers() {
        let t = test_chain();
        let keys: Vec<Secp256k1KeyPair> = (0..4).map(|_| Secp256k1KeyPair::generate()).collect();
        t.chain
            .handle_deposit(keys[0].address(), 0, U256::zero(), U256::from(1_000), 1)
            .await
            .unwrap();

        for hop in 0..3 {
            let blk_num = hop as u64 + 2;
            let tx = transfer(&keys[hop], &[(&keys[hop + 1], 0, 1_000)], blk_num);
            commit_block(&t.chain, vec![tx], blk_num).await;
        }

        assert_eq!(t.chain.block_height().await, 4);
        assert_eq!(t.chain.get_owned_segments(&keys[3].address()).await.len(), 1);
        for key in &keys[..3] {
            assert!(t.chain.get_owned_segments(&key.address()).await.is_empty());
        }
        assert_eq!(
            t.chain.get_block(9).await.unwrap_err(),
            ChainError::BlockNotFound(9)
        );
    }
}
