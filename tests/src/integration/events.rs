//! # Root Chain Events
//!
//! The `EventWatcher` polling an in-memory log source and driving a `Chain`.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pc_05_childchain::{
        EventLog, EventWatcher, InMemoryEventSource, InMemoryWatcherStorage, RootChainEvent,
        WatcherConfig,
    };
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{Segment, U256};

    use crate::integration::fixtures::{commit_block, test_chain, transfer, TestChain};

    fn log(tx: u8, block_number: u64, event: RootChainEvent) -> EventLog {
        EventLog {
            transaction_hash: Some([tx; 32]),
            block_number,
            event,
        }
    }

    fn watcher(t: &TestChain, source: &Arc<InMemoryEventSource>) -> EventWatcher {
        EventWatcher::new(
            source.clone(),
            Arc::new(InMemoryWatcherStorage::new()),
            t.chain.clone(),
            WatcherConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_events_drive_the_chain() {
        let t = test_chain();
        let source = Arc::new(InMemoryEventSource::new());
        let watcher = watcher(&t, &source);
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();

        source.push_log(log(
            1,
            10,
            RootChainEvent::TokenListed {
                token_id: 1,
                token_address: [0x22; 20],
            },
        ));
        source.push_log(log(
            2,
            11,
            RootChainEvent::Deposit {
                depositor: alice.address(),
                token_id: 0,
                start: U256::zero(),
                end: U256::from(100),
                blk_num: 1,
            },
        ));
        assert_eq!(watcher.poll_once().await.unwrap(), 2);
        assert_eq!(t.chain.read_num_tokens().await.unwrap(), 2);
        assert_eq!(t.chain.get_owned_segments(&alice.address()).await.len(), 1);

        t.chain
            .append_tx(transfer(&alice, &[(&bob, 0, 100)], 2))
            .await
            .unwrap();
        let generation = t.chain.generate_block().await.unwrap();

        source.push_log(log(
            3,
            12,
            RootChainEvent::BlockSubmitted {
                super_root: [7; 32],
                root: generation.root,
                blk_num: 2,
                timestamp: 1_700_000_000,
            },
        ));
        source.push_log(log(
            4,
            13,
            RootChainEvent::ExitStarted {
                exitor: bob.address(),
                segment: Segment::from_u64(0, 40).unwrap(),
                blk_num: 2,
            },
        ));
        assert_eq!(watcher.poll_once().await.unwrap(), 2);

        assert_eq!(t.chain.block_height().await, 2);
        assert_eq!(t.chain.get_owned_segments(&bob.address()).await.len(), 1);
        assert_eq!(t.chain.get_exiting_segments().await.len(), 1);
        let block = t.chain.get_block(2).await.unwrap();
        assert_eq!(block.super_root(), Some([7; 32]));
        assert_eq!(block.num_tokens(), 2);
    }

    #[tokio::test]
    async fn test_stale_exits_and_rejected_deposits_do_not_stall_the_watcher() {
        let t = test_chain();
        let source = Arc::new(InMemoryEventSource::new());
        let watcher = watcher(&t, &source);
        let alice = Secp256k1KeyPair::generate();
        let bob = Secp256k1KeyPair::generate();
        let carol = Secp256k1KeyPair::generate();

        t.chain
            .handle_deposit(alice.address(), 0, U256::zero(), U256::from(100), 1)
            .await
            .unwrap();
        commit_block(
            &t.chain,
            vec![transfer(&alice, &[(&bob, 0, 50), (&carol, 50, 100)], 2)],
            2,
        )
        .await;

        // Exit over the range as deposited, now split between two owners.
        source.push_log(log(
            1,
            10,
            RootChainEvent::ExitStarted {
                exitor: alice.address(),
                segment: Segment::from_u64(0, 100).unwrap(),
                blk_num: 1,
            },
        ));
        source.push_log(log(
            2,
            11,
            RootChainEvent::ExitStarted {
                exitor: alice.address(),
                segment: Segment::from_u64(500, 600).unwrap(),
                blk_num: 1,
            },
        ));
        source.push_log(log(
            3,
            12,
            RootChainEvent::Deposit {
                depositor: bob.address(),
                token_id: 5,
                start: U256::zero(),
                end: U256::from(10),
                blk_num: 3,
            },
        ));
        source.push_log(log(
            4,
            13,
            RootChainEvent::Deposit {
                depositor: bob.address(),
                token_id: 0,
                start: U256::from(200),
                end: U256::from(300),
                blk_num: 4,
            },
        ));

        assert_eq!(watcher.poll_once().await.unwrap(), 3);
        assert_eq!(watcher.poll_once().await.unwrap(), 0);

        assert_eq!(t.chain.get_exiting_segments().await.len(), 2);
        let owned = t.chain.get_owned_segments(&bob.address()).await;
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].segment, Segment::from_u64(200, 300).unwrap());
        assert!(t.chain.get_owned_segments(&carol.address()).await.is_empty());
        assert_eq!(t.chain.block_height().await, 4);
    }

    #[tokio::test]
    async fn test_redelivered_logs_are_harmless() {
        let t = test_chain();
        let source = Arc::new(InMemoryEventSource::new());
        let alice = Secp256k1KeyPair::generate();
        let deposit = RootChainEvent::Deposit {
            depositor: alice.address(),
            token_id: 0,
            start: U256::zero(),
            end: U256::from(100),
            blk_num: 1,
        };
        source.push_log(log(1, 10, deposit.clone()));
        source.push_log(log(1, 10, deposit.clone()));

        // A second watcher with its own bookkeeping sees the same log again.
        assert_eq!(watcher(&t, &source).poll_once().await.unwrap(), 1);
        assert_eq!(watcher(&t, &source).poll_once().await.unwrap(), 1);
        assert_eq!(t.chain.get_current_segments().await.len(), 1);
    }
}
