//! Shared setup for the integration flows.

use std::sync::Arc;

use pc_01_predicates::{OwnershipPredicate, SignedTransaction, StateUpdate};
use pc_05_childchain::{Chain, ChainConfig, InMemoryChainDb};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Address, Hash, Segment, U256};

/// Ownership predicate address used by every fixture.
pub const OWNERSHIP: Address = [0x0d; 20];

/// A chain over a fresh in-memory store.
pub struct TestChain {
    pub db: Arc<InMemoryChainDb>,
    pub chain: Arc<Chain>,
}

pub fn config() -> ChainConfig {
    ChainConfig {
        ownership_predicate: OWNERSHIP,
        ..ChainConfig::default()
    }
}

pub fn test_chain() -> TestChain {
    let db = Arc::new(InMemoryChainDb::new());
    let chain = Arc::new(Chain::new(db.clone(), config()).expect("chain"));
    TestChain { db, chain }
}

/// Ownership output of `[start, end)` to `owner`.
pub fn output(owner: &Secp256k1KeyPair, start: u64, end: u64, blk_num: u64) -> StateUpdate {
    OwnershipPredicate::create(
        Segment::from_u64(start, end).expect("segment"),
        U256::from(blk_num),
        OWNERSHIP,
        owner.address(),
    )
}

/// `from` sends each `(owner, start, end)` range.
pub fn transfer(
    from: &Secp256k1KeyPair,
    outputs: &[(&Secp256k1KeyPair, u64, u64)],
    blk_num: u64,
) -> SignedTransaction {
    let outputs = outputs
        .iter()
        .map(|(owner, start, end)| output(owner, *start, *end, blk_num))
        .collect();
    let mut tx = SignedTransaction::from_outputs(outputs).expect("outputs");
    tx.sign(from).expect("sign");
    tx
}

/// Queue `txs`, generate the block and submit it as `blk_num`.
pub async fn commit_block(chain: &Chain, txs: Vec<SignedTransaction>, blk_num: u64) -> Hash {
    for tx in txs {
        chain.append_tx(tx).await.expect("append");
    }
    let generation = chain.generate_block().await.expect("generate");
    chain
        .handle_submit([0; 32], generation.root, blk_num, 0)
        .await
        .expect("submit");
    generation.root
}
