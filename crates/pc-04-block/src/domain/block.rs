//! # Block
//!
//! Batches transactions, lazily commits them to a sum Merkle tree and serves
//! proofs against the resulting root.

use pc_01_predicates::{PredicatesManager, SignedTransaction, StateUpdate};
use pc_02_sum_merkle_tree::{SumMerkleProof, SumMerkleTree, SumMerkleTreeNode};
use serde::{Deserialize, Serialize};
use shared_types::{coin_space_size, Address, Hash, Segment, U256, ZERO_HASH};
use tracing::debug;

use super::errors::BlockError;
use super::proofs::{CoinProof, DepositWithProof, ExclusionProof, SignedTransactionWithProof};

/// What a tree leaf stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LeafSource {
    Output { tx_index: usize, output_index: usize },
    Deposit,
    Gap,
}

/// Built tree plus the origin of each leaf.
#[derive(Clone, Debug)]
struct Commitment {
    tree: SumMerkleTree,
    sources: Vec<LeafSource>,
}

/// Persisted form of a block. The tree is rebuilt on demand.
#[derive(Serialize, Deserialize)]
struct BlockRecord {
    number: u64,
    txs: Vec<SignedTransaction>,
    deposit_tx: Option<StateUpdate>,
    super_root: Option<Hash>,
    timestamp: Option<u64>,
    num_tokens: u64,
}

/// A child chain block.
#[derive(Clone, Debug)]
pub struct Block {
    number: u64,
    txs: Vec<SignedTransaction>,
    deposit_tx: Option<StateUpdate>,
    super_root: Option<Hash>,
    timestamp: Option<u64>,
    num_tokens: u64,
    commitment: Option<Commitment>,
}

impl Block {
    /// Empty block over `num_tokens` listed tokens.
    pub fn new(num_tokens: u64) -> Self {
        Self {
            number: 0,
            txs: Vec::new(),
            deposit_tx: None,
            super_root: None,
            timestamp: None,
            num_tokens,
            commitment: None,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Block number (0 until submitted).
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Admitted transactions, in order.
    pub fn transactions(&self) -> &[SignedTransaction] {
        &self.txs
    }

    /// Deposit marker, if this is a deposit block.
    pub fn deposit_tx(&self) -> Option<&StateUpdate> {
        self.deposit_tx.as_ref()
    }

    /// Root of roots recorded by the settlement contract.
    pub fn super_root(&self) -> Option<Hash> {
        self.super_root
    }

    /// Submission timestamp.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    /// Listed tokens when the block was opened.
    pub fn num_tokens(&self) -> u64 {
        self.num_tokens
    }

    /// Total committed length (`num_tokens * 2^48`).
    pub fn total_amount(&self) -> U256 {
        coin_space_size(self.num_tokens)
    }

    /// True once the tree has been built.
    pub fn is_frozen(&self) -> bool {
        self.commitment.is_some()
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Append an admitted transaction.
    pub fn append_tx(&mut self, tx: SignedTransaction) -> Result<(), BlockError> {
        if self.is_frozen() {
            return Err(BlockError::BlockFrozen);
        }
        self.txs.push(tx);
        Ok(())
    }

    /// Mark this block as the deposit block for `update`.
    pub fn set_deposit_tx(&mut self, update: StateUpdate) -> Result<(), BlockError> {
        if self.is_frozen() {
            return Err(BlockError::BlockFrozen);
        }
        self.deposit_tx = Some(update);
        Ok(())
    }

    /// Set the block number assigned on submission.
    pub fn set_block_number(&mut self, number: u64) {
        self.number = number;
    }

    /// Set the submission timestamp.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = Some(timestamp);
    }

    /// Set the super root.
    pub fn set_super_root(&mut self, super_root: Hash) {
        self.super_root = Some(super_root);
    }

    // =========================================================================
    // COMMITMENT
    // =========================================================================

    /// Root of the block's sum Merkle tree, building it on first use.
    pub fn get_root(&mut self) -> Result<Hash, BlockError> {
        Ok(self.commitment()?.tree.root()?)
    }

    fn commitment(&mut self) -> Result<&Commitment, BlockError> {
        if self.commitment.is_none() {
            let commitment = self.build_commitment()?;
            debug!(
                "[pc-04] block committed: txs={}, leaves={}, root=0x{}",
                self.txs.len(),
                commitment.sources.len(),
                hex::encode(commitment.tree.root()?)
            );
            self.commitment = Some(commitment);
        }
        match &self.commitment {
            Some(commitment) => Ok(commitment),
            None => Err(BlockError::BlockFrozen),
        }
    }

    fn build_commitment(&self) -> Result<Commitment, BlockError> {
        let mut items: Vec<(Segment, Hash, LeafSource)> = Vec::new();
        for (tx_index, tx) in self.txs.iter().enumerate() {
            let hash = tx.hash();
            for (output_index, output) in tx.outputs().iter().enumerate() {
                items.push((
                    output.segment,
                    hash,
                    LeafSource::Output {
                        tx_index,
                        output_index,
                    },
                ));
            }
        }
        if let Some(deposit) = &self.deposit_tx {
            items.push((deposit.segment, deposit.hash(), LeafSource::Deposit));
        }
        items.sort_by_key(|(segment, _, _)| *segment);

        let total = self.total_amount();
        let mut leaves = Vec::with_capacity(items.len() * 2 + 1);
        let mut sources = Vec::with_capacity(items.len() * 2 + 1);
        let mut cursor = U256::zero();
        for (segment, hash, source) in items {
            if segment.start() < cursor {
                return Err(BlockError::OverlappingOutputs(segment));
            }
            if segment.end() > total {
                return Err(BlockError::SegmentOutOfRange(segment));
            }
            if segment.start() > cursor {
                leaves.push(SumMerkleTreeNode::new(ZERO_HASH, segment.start() - cursor));
                sources.push(LeafSource::Gap);
            }
            leaves.push(SumMerkleTreeNode::new(hash, segment.width()));
            sources.push(source);
            cursor = segment.end();
        }
        if cursor < total || leaves.is_empty() {
            leaves.push(SumMerkleTreeNode::new(ZERO_HASH, total - cursor));
            sources.push(LeafSource::Gap);
        }

        let tree = SumMerkleTree::new(leaves)?;
        Ok(Commitment { tree, sources })
    }

    // =========================================================================
    // PROOFS
    // =========================================================================

    fn bundle(
        &self,
        commitment: &Commitment,
        proof: SumMerkleProof,
        root: Hash,
    ) -> Result<CoinProof, BlockError> {
        let source = commitment
            .sources
            .get(proof.index)
            .copied()
            .unwrap_or(LeafSource::Gap);
        Ok(match source {
            LeafSource::Output {
                tx_index,
                output_index,
            } => {
                let signed_tx = self
                    .txs
                    .get(tx_index)
                    .cloned()
                    .ok_or(BlockError::TransactionNotFound(proof.leaf))?;
                CoinProof::Inclusion(SignedTransactionWithProof {
                    signed_tx,
                    output_index,
                    blk_num: self.number,
                    root,
                    proof,
                })
            }
            LeafSource::Deposit => match &self.deposit_tx {
                Some(deposit) => CoinProof::Deposit(DepositWithProof {
                    deposit: deposit.clone(),
                    blk_num: self.number,
                    root,
                    proof,
                }),
                None => CoinProof::Exclusion(ExclusionProof {
                    blk_num: self.number,
                    root,
                    proof,
                }),
            },
            LeafSource::Gap => CoinProof::Exclusion(ExclusionProof {
                blk_num: self.number,
                root,
                proof,
            }),
        })
    }

    /// Proofs for every leaf intersecting `segment`, in coin order.
    pub fn get_segment_proofs(&mut self, segment: &Segment) -> Result<Vec<CoinProof>, BlockError> {
        let num_tokens = self.num_tokens;
        self.commitment()?;
        let Some(commitment) = &self.commitment else {
            return Ok(Vec::new());
        };
        let root = commitment.tree.root()?;
        commitment
            .tree
            .get_proof_by_range(num_tokens, segment.start(), segment.end())?
            .into_iter()
            .map(|proof| self.bundle(commitment, proof, root))
            .collect()
    }

    /// Inclusion or exclusion proof for the leaf covering `offset`.
    pub fn create_coin_proof(&mut self, offset: U256) -> Result<CoinProof, BlockError> {
        if offset >= self.total_amount() {
            return Err(BlockError::OffsetOutOfRange(offset));
        }
        let point = Segment::new(offset, offset + U256::one())
            .map_err(|_| BlockError::OffsetOutOfRange(offset))?;
        self.get_segment_proofs(&point)?
            .into_iter()
            .next()
            .ok_or(BlockError::OffsetOutOfRange(offset))
    }

    /// Exclusion proof for the gap covering `offset`.
    pub fn get_exclusion_proof(&mut self, offset: U256) -> Result<ExclusionProof, BlockError> {
        match self.create_coin_proof(offset)? {
            CoinProof::Exclusion(proof) => Ok(proof),
            _ => Err(BlockError::OffsetIncluded(offset)),
        }
    }

    /// One bundle per output of the transaction with hash `tx_hash`.
    pub fn get_signed_transaction_with_proof(
        &mut self,
        tx_hash: &Hash,
    ) -> Result<Vec<SignedTransactionWithProof>, BlockError> {
        let num_tokens = self.num_tokens;
        self.commitment()?;
        let Some(commitment) = &self.commitment else {
            return Ok(Vec::new());
        };
        let root = commitment.tree.root()?;

        let mut bundles = Vec::new();
        for proof in commitment.tree.proofs(num_tokens, tx_hash)? {
            if let CoinProof::Inclusion(bundle) = self.bundle(commitment, proof, root)? {
                bundles.push(bundle);
            }
        }
        if bundles.is_empty() {
            return Err(BlockError::TransactionNotFound(*tx_hash));
        }
        bundles.sort_by_key(|bundle| bundle.output_index);
        Ok(bundles)
    }

    /// Bundles for every output owned by `owner`.
    pub fn get_user_transactions_and_proofs(
        &mut self,
        owner: &Address,
        manager: &PredicatesManager,
    ) -> Result<Vec<SignedTransactionWithProof>, BlockError> {
        let hashes: Vec<Hash> = self
            .txs
            .iter()
            .filter(|tx| {
                tx.outputs()
                    .iter()
                    .any(|output| manager.is_owned_by(&output.predicate, owner, output))
            })
            .map(SignedTransaction::hash)
            .collect();

        let mut bundles = Vec::new();
        for hash in hashes {
            for bundle in self.get_signed_transaction_with_proof(&hash)? {
                let owned = bundle
                    .output()
                    .map(|output| manager.is_owned_by(&output.predicate, owner, output))
                    .unwrap_or(false);
                if owned && !bundles.contains(&bundle) {
                    bundles.push(bundle);
                }
            }
        }
        Ok(bundles)
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Encode number, transactions, deposit, super root, timestamp and token count.
    pub fn serialize(&self) -> Result<Vec<u8>, BlockError> {
        let record = BlockRecord {
            number: self.number,
            txs: self.txs.clone(),
            deposit_tx: self.deposit_tx.clone(),
            super_root: self.super_root,
            timestamp: self.timestamp,
            num_tokens: self.num_tokens,
        };
        bincode::serialize(&record).map_err(|e| BlockError::Serialization(e.to_string()))
    }

    /// Inverse of `serialize`. The tree is rebuilt on the next root request.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, BlockError> {
        let record: BlockRecord =
            bincode::deserialize(bytes).map_err(|e| BlockError::Serialization(e.to_string()))?;
        Ok(Self {
            number: record.number,
            txs: record.txs,
            deposit_tx: record.deposit_tx,
            super_root: record.super_root,
            timestamp: record.timestamp,
            num_tokens: record.num_tokens,
            commitment: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pc_01_predicates::OwnershipPredicate;
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::TOKEN_SEGMENT_SIZE;

    const PREDICATE: Address = [0x0e; 20];

    fn owned(owner: Address, start: u64, end: u64) -> StateUpdate {
        OwnershipPredicate::create(
            Segment::from_u64(start, end).unwrap(),
            U256::from(4),
            PREDICATE,
            owner,
        )
    }

    fn signed(signer: &Secp256k1KeyPair, outputs: Vec<StateUpdate>) -> SignedTransaction {
        let mut tx = SignedTransaction::from_outputs(outputs).unwrap();
        tx.sign(signer).unwrap();
        tx
    }

    fn manager() -> PredicatesManager {
        let mut manager = PredicatesManager::new();
        manager
            .add_predicate(PREDICATE, "OwnershipPredicate")
            .unwrap();
        manager
    }

    #[test]
    fn test_empty_block_is_single_gap() {
        let mut block = Block::new(1);
        let root = block.get_root().unwrap();
        let proof = block.get_exclusion_proof(U256::from(123)).unwrap();
        assert_eq!(proof.root, root);
        assert_eq!(proof.segment(), Segment::from_u64(0, TOKEN_SEGMENT_SIZE).unwrap());
        assert!(proof.check_exclusion());
    }

    #[test]
    fn test_inclusion_proofs_verify() {
        let alice = Secp256k1KeyPair::generate();
        let tx = signed(&alice, vec![owned([1; 20], 100, 200), owned([2; 20], 500, 600)]);
        let mut block = Block::new(1);
        block.append_tx(tx.clone()).unwrap();
        block.set_block_number(7);

        let bundles = block.get_signed_transaction_with_proof(&tx.hash()).unwrap();
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].segment(), Segment::from_u64(100, 200).unwrap());
        assert_eq!(bundles[1].segment(), Segment::from_u64(500, 600).unwrap());
        assert!(bundles.iter().all(|b| b.check_inclusion() && b.blk_num == 7));
        assert_eq!(bundles[0].tx_bytes(), tx.tx().to_bytes());
        assert_eq!(bundles[0].signatures().len(), 1);
    }

    #[test]
    fn test_flipped_proof_byte_fails() {
        let alice = Secp256k1KeyPair::generate();
        let tx = signed(&alice, vec![owned([1; 20], 100, 200)]);
        let mut block = Block::new(1);
        block.append_tx(tx.clone()).unwrap();

        let mut bundle = block
            .get_signed_transaction_with_proof(&tx.hash())
            .unwrap()
            .remove(0);
        assert!(bundle.check_inclusion());
        bundle.proof.proof[20] ^= 0xff;
        assert!(!bundle.check_inclusion());
    }

    #[test]
    fn test_gaps_give_exclusion_proofs() {
        let alice = Secp256k1KeyPair::generate();
        let mut block = Block::new(1);
        block
            .append_tx(signed(&alice, vec![owned([1; 20], 100, 200)]))
            .unwrap();

        let before = block.get_exclusion_proof(U256::from(50)).unwrap();
        assert_eq!(before.segment(), Segment::from_u64(0, 100).unwrap());
        assert!(before.check_exclusion());

        let after = block.get_exclusion_proof(U256::from(200)).unwrap();
        assert_eq!(after.segment().start(), U256::from(200));
        assert_eq!(after.segment().end(), U256::from(TOKEN_SEGMENT_SIZE));

        assert_eq!(
            block.get_exclusion_proof(U256::from(150)),
            Err(BlockError::OffsetIncluded(U256::from(150)))
        );
        assert!(matches!(
            block.create_coin_proof(U256::from(TOKEN_SEGMENT_SIZE)),
            Err(BlockError::OffsetOutOfRange(_))
        ));
    }

    #[test]
    fn test_deposit_block_proof() {
        let mut block = Block::new(2);
        let deposit = owned([3; 20], TOKEN_SEGMENT_SIZE, TOKEN_SEGMENT_SIZE + 10);
        block.set_deposit_tx(deposit.clone()).unwrap();
        block.set_block_number(2);

        match block.create_coin_proof(U256::from(TOKEN_SEGMENT_SIZE + 5)).unwrap() {
            CoinProof::Deposit(proof) => {
                assert_eq!(proof.deposit, deposit);
                assert!(proof.check_inclusion());
            }
            other => panic!("expected deposit proof, got {:?}", other),
        }
    }

    #[test]
    fn test_frozen_after_root() {
        let alice = Secp256k1KeyPair::generate();
        let mut block = Block::new(1);
        block.get_root().unwrap();
        assert_eq!(
            block.append_tx(signed(&alice, vec![owned([1; 20], 0, 1)])),
            Err(BlockError::BlockFrozen)
        );
        block.set_super_root([9; 32]);
        block.set_timestamp(1_700_000_000);
        assert_eq!(block.super_root(), Some([9; 32]));
    }

    #[test]
    fn test_overlapping_outputs_rejected() {
        let alice = Secp256k1KeyPair::generate();
        let mut block = Block::new(1);
        block
            .append_tx(signed(&alice, vec![owned([1; 20], 0, 10)]))
            .unwrap();
        block
            .append_tx(signed(&alice, vec![owned([1; 20], 5, 15)]))
            .unwrap();
        assert!(matches!(
            block.get_root(),
            Err(BlockError::OverlappingOutputs(_))
        ));
    }

    #[test]
    fn test_user_transactions() {
        let alice = Secp256k1KeyPair::generate();
        let bob = [0xb0; 20];
        let to_bob = signed(&alice, vec![owned(bob, 0, 10), owned([1; 20], 10, 20)]);
        let to_other = signed(&alice, vec![owned([1; 20], 30, 40)]);
        let mut block = Block::new(1);
        block.append_tx(to_bob.clone()).unwrap();
        block.append_tx(to_other).unwrap();

        let bundles = block
            .get_user_transactions_and_proofs(&bob, &manager())
            .unwrap();
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].signed_tx, to_bob);
        assert_eq!(bundles[0].output_index, 0);
    }

    #[test]
    fn test_serialize_roundtrip_keeps_root() {
        let alice = Secp256k1KeyPair::generate();
        let mut block = Block::new(1);
        block
            .append_tx(signed(&alice, vec![owned([1; 20], 0, 10)]))
            .unwrap();
        block.set_block_number(5);
        block.set_timestamp(42);
        block.set_super_root([3; 32]);
        let root = block.get_root().unwrap();

        let mut restored = Block::deserialize(&block.serialize().unwrap()).unwrap();
        assert_eq!(restored.number(), 5);
        assert_eq!(restored.timestamp(), Some(42));
        assert_eq!(restored.super_root(), Some([3; 32]));
        assert_eq!(restored.transactions(), block.transactions());
        assert_eq!(restored.get_root().unwrap(), root);
    }
}
