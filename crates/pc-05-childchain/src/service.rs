//! Child Chain Service - Core orchestration
//!
//! `Chain` owns the StateManager, the TxFilter and the transaction queue
//! behind one `tokio::sync::Mutex`, so every mutation (admission, block
//! generation, root chain events) is serialized. Blocks and snapshots go to
//! an abstract `ChainDb`.

use std::sync::Arc;

use async_trait::async_trait;
use pc_01_predicates::{
    OwnershipPredicate, PaymentChannelPredicate, PredicatesManager, SignedTransaction, StateUpdate,
};
use pc_03_state_manager::StateManager;
use pc_04_block::{Block, SignedTransactionWithProof};
use shared_types::{address_to_hex, hash_to_hex, Address, Hash, Segment, U256};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::ChainConfig;
use crate::domain::{ChainError, RootChainEvent, TxFilter};
use crate::ports::{ChainDb, RootChainEventHandler};

/// Store key of the StateManager snapshot.
pub const SNAPSHOT_KEY: &str = "snapshot";
/// Store key of the listed token count.
pub const NUM_TOKENS_KEY: &str = "numTokens";

/// Store key of a submitted block.
pub fn block_key(blk_num: u64) -> String {
    format!("block.{blk_num}")
}

/// Store key of a generated block awaiting its submission event.
pub fn waiting_block_key(root: &Hash) -> String {
    format!("waitingblock.{}", hash_to_hex(root))
}

/// Outcome of `Chain::generate_block`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockGeneration {
    /// Root to submit to the root chain.
    pub root: Hash,
    /// Transactions committed in the block.
    pub included: usize,
    /// Hashes of queued transactions that no longer spent anything.
    pub dropped: Vec<Hash>,
}

struct ChainState {
    block_height: u64,
    num_tokens: u64,
    tx_queue: Vec<SignedTransaction>,
    tx_filter: TxFilter,
    state_manager: StateManager,
}

/// The child chain operator.
pub struct Chain {
    db: Arc<dyn ChainDb>,
    config: ChainConfig,
    predicates: Arc<PredicatesManager>,
    inner: Mutex<ChainState>,
}

impl Chain {
    /// Create a chain over `db`, registering the predicates named in `config`.
    pub fn new(db: Arc<dyn ChainDb>, config: ChainConfig) -> Result<Self, ChainError> {
        let mut predicates = PredicatesManager::new();
        predicates.add_predicate(config.ownership_predicate, OwnershipPredicate::NAME)?;
        if let Some(address) = config.payment_channel_predicate {
            predicates.add_predicate(address, PaymentChannelPredicate::NAME)?;
        }
        let predicates = Arc::new(predicates);

        Ok(Self {
            db,
            inner: Mutex::new(ChainState {
                block_height: 0,
                num_tokens: 1,
                tx_queue: Vec::new(),
                tx_filter: TxFilter::new(),
                state_manager: StateManager::new(predicates.clone()),
            }),
            predicates,
            config,
        })
    }

    /// Registered predicates.
    pub fn predicates(&self) -> &Arc<PredicatesManager> {
        &self.predicates
    }

    /// Configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Number of the latest block seen (deposit or submission).
    pub async fn block_height(&self) -> u64 {
        self.inner.lock().await.block_height
    }

    /// Transactions queued for the in-flight block.
    pub async fn queue_len(&self) -> usize {
        self.inner.lock().await.tx_queue.len()
    }

    /// Current (non-exiting) state updates.
    pub async fn get_current_segments(&self) -> Vec<StateUpdate> {
        self.inner.lock().await.state_manager.get_state_updates()
    }

    /// Ranges marked exiting.
    pub async fn get_exiting_segments(&self) -> Vec<StateUpdate> {
        self.inner.lock().await.state_manager.get_exiting()
    }

    /// Current state updates owned by `owner`.
    pub async fn get_owned_segments(&self, owner: &Address) -> Vec<StateUpdate> {
        self.inner.lock().await.state_manager.get_owned(owner)
    }

    // === ADMISSION ===

    /// Queue `tx` for the next block.
    ///
    /// Rejects transactions whose inputs are not spendable, then transactions
    /// whose inputs overlap an already queued one.
    pub async fn append_tx(&self, tx: SignedTransaction) -> Result<(), ChainError> {
        let mut inner = self.inner.lock().await;
        if !inner.state_manager.is_contain(&tx) {
            debug!(
                "[pc-05] rejected tx {}: inputs not spendable",
                hash_to_hex(&tx.hash())
            );
            return Err(ChainError::InvalidTransaction);
        }
        inner.tx_filter.check_and_insert_tx(&tx)?;
        debug!("[pc-05] queued tx {}", hash_to_hex(&tx.hash()));
        inner.tx_queue.push(tx);
        Ok(())
    }

    /// Discard the queue and the filter.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.tx_queue.clear();
        inner.tx_filter.clear();
    }

    // === BLOCK GENERATION ===

    /// Fold the queue into a block and store it until its submission event.
    ///
    /// Transactions are applied in queue order to a copy of the state. One
    /// whose inputs were consumed earlier in the fold is left out and reported
    /// in `dropped`. The copy is installed and the queue and filter emptied
    /// only once the waiting block and snapshot are stored; any earlier error
    /// leaves state and queue untouched.
    pub async fn generate_block(&self) -> Result<BlockGeneration, ChainError> {
        let stored_tokens = self.read_num_tokens().await?;
        let mut inner = self.inner.lock().await;
        inner.num_tokens = inner.num_tokens.max(stored_tokens);

        let mut next_state = inner.state_manager.clone();
        let mut block = Block::new(inner.num_tokens);
        let mut dropped = Vec::new();
        for tx in &inner.tx_queue {
            if next_state.spend(tx).is_empty() {
                warn!(
                    "[pc-05] dropped tx {} during block generation",
                    hash_to_hex(&tx.hash())
                );
                dropped.push(tx.hash());
                continue;
            }
            block.append_tx(tx.clone())?;
        }

        if block.transactions().is_empty() {
            // Nothing in the queue spends anything any more.
            inner.tx_queue.clear();
            inner.tx_filter.clear();
            return Err(ChainError::NoValidTransactions);
        }

        let root = block.get_root()?;
        self.write_waiting_block(&root, &block).await?;
        self.write_snapshot(&next_state).await?;
        inner.state_manager = next_state;
        inner.tx_queue.clear();
        inner.tx_filter.clear();

        info!(
            "[pc-05] generated block: root={}, txs={}, dropped={}",
            hash_to_hex(&root),
            block.transactions().len(),
            dropped.len()
        );
        Ok(BlockGeneration {
            root,
            included: block.transactions().len(),
            dropped,
        })
    }

    // === ROOT CHAIN EVENTS ===

    /// A token was listed: the coin space now spans `token_id + 1` tokens.
    pub async fn handle_listing_event(
        &self,
        token_id: u64,
        token_address: Address,
    ) -> Result<(), ChainError> {
        let stored_tokens = self.read_num_tokens().await?;
        let mut inner = self.inner.lock().await;
        let num_tokens = inner
            .num_tokens
            .max(stored_tokens)
            .max(token_id.saturating_add(1));
        let bytes =
            serde_json::to_vec(&num_tokens).map_err(|e| ChainError::Serialization(e.to_string()))?;
        self.db.insert(NUM_TOKENS_KEY, bytes).await?;
        inner.num_tokens = num_tokens;
        info!(
            "[pc-05] token {} listed at {}, num_tokens={}",
            token_id,
            address_to_hex(&token_address),
            num_tokens
        );
        Ok(())
    }

    /// A generated block was accepted on the root chain.
    ///
    /// Installs the block's outputs and stores it under its number. Outputs
    /// go into a copy of the state that replaces the live one only after the
    /// block and snapshot are stored. A repeated event for an already stored
    /// block is a no-op.
    pub async fn handle_submit(
        &self,
        super_root: Hash,
        root: Hash,
        blk_num: u64,
        timestamp: u64,
    ) -> Result<(), ChainError> {
        let mut inner = self.inner.lock().await;
        if self.db.contains(&block_key(blk_num)).await? {
            debug!("[pc-05] block {} already submitted", blk_num);
            return Ok(());
        }

        let waiting_key = waiting_block_key(&root);
        let bytes = self
            .db
            .get(&waiting_key)
            .await?
            .ok_or(ChainError::BlockNotFound(blk_num))?;
        let mut block = Block::deserialize(&bytes)?;

        let mut next_state = inner.state_manager.clone();
        for tx in block.transactions() {
            next_state.insert(tx)?;
        }
        block.set_block_number(blk_num);
        block.set_super_root(super_root);
        block.set_timestamp(timestamp);

        self.db.insert(&block_key(blk_num), block.serialize()?).await?;
        self.db.delete(&waiting_key).await?;
        self.write_snapshot(&next_state).await?;
        inner.state_manager = next_state;
        inner.block_height = inner.block_height.max(blk_num);

        info!(
            "[pc-05] block {} submitted: root={}, txs={}",
            blk_num,
            hash_to_hex(&root),
            block.transactions().len()
        );
        Ok(())
    }

    /// Coins were deposited on the root chain.
    ///
    /// Token-local `[start, end)` is mapped into the global coin space. Tokens
    /// not listed yet are rejected. A repeated event for an already tracked
    /// deposit is a no-op.
    pub async fn handle_deposit(
        &self,
        depositor: Address,
        token_id: u64,
        start: U256,
        end: U256,
        blk_num: u64,
    ) -> Result<(), ChainError> {
        let segment = Segment::from_token(token_id, start, end)?;
        let update = OwnershipPredicate::create(
            segment,
            U256::from(blk_num),
            self.config.ownership_predicate,
            depositor,
        );

        let stored_tokens = self.read_num_tokens().await?;
        let mut inner = self.inner.lock().await;
        inner.num_tokens = inner.num_tokens.max(stored_tokens);
        if token_id >= inner.num_tokens {
            return Err(ChainError::TokenNotListed(token_id));
        }
        if inner.state_manager.contains_update(&update) {
            debug!("[pc-05] deposit {} already tracked", segment);
            return Ok(());
        }

        inner.state_manager.insert_deposit_tx(update.clone())?;
        let mut block = Block::new(inner.num_tokens);
        block.set_block_number(blk_num);
        block.set_deposit_tx(update)?;
        inner.block_height = inner.block_height.max(blk_num);

        self.db.insert(&block_key(blk_num), block.serialize()?).await?;
        self.write_snapshot(&inner.state_manager).await?;

        info!(
            "[pc-05] deposit {} by {} in block {}",
            segment,
            address_to_hex(&depositor),
            blk_num
        );
        Ok(())
    }

    /// An exit was started: every tracked part of the range stops being
    /// spendable.
    ///
    /// The range may span several entries or none, since exits can be stale
    /// or target coins in flight. An exit that touches nothing tracked is
    /// logged and ignored.
    pub async fn handle_exit(
        &self,
        exitor: Address,
        segment: Segment,
        blk_num: u64,
    ) -> Result<(), ChainError> {
        let mut inner = self.inner.lock().await;
        let mut next_state = inner.state_manager.clone();
        let marked = next_state.mark_exiting(&segment);
        if marked.is_empty() {
            warn!(
                "[pc-05] exit for {} by {} (block {}) matches no spendable range",
                segment,
                address_to_hex(&exitor),
                blk_num
            );
            return Ok(());
        }
        self.write_snapshot(&next_state).await?;
        inner.state_manager = next_state;
        info!(
            "[pc-05] exit started for {} by {} (block {}): ranges={}",
            segment,
            address_to_hex(&exitor),
            blk_num,
            marked.len()
        );
        Ok(())
    }

    // === QUERIES ===

    /// Stored block `blk_num`.
    pub async fn get_block(&self, blk_num: u64) -> Result<Block, ChainError> {
        let bytes = self
            .db
            .get(&block_key(blk_num))
            .await?
            .ok_or(ChainError::BlockNotFound(blk_num))?;
        Ok(Block::deserialize(&bytes)?)
    }

    /// Proof bundles for every output of `tx_hash` in block `blk_num`.
    pub async fn get_transaction_proofs(
        &self,
        blk_num: u64,
        tx_hash: &Hash,
    ) -> Result<Vec<SignedTransactionWithProof>, ChainError> {
        let mut block = self.get_block(blk_num).await?;
        Ok(block.get_signed_transaction_with_proof(tx_hash)?)
    }

    /// Proof bundles for the outputs owned by `owner` in block `blk_num`.
    pub async fn get_user_transactions(
        &self,
        blk_num: u64,
        owner: &Address,
    ) -> Result<Vec<SignedTransactionWithProof>, ChainError> {
        let mut block = self.get_block(blk_num).await?;
        Ok(block.get_user_transactions_and_proofs(owner, &self.predicates)?)
    }

    // === PERSISTENCE ===

    /// Listed token count, or 1 if nothing was listed yet.
    pub async fn read_num_tokens(&self) -> Result<u64, ChainError> {
        match self.db.get(NUM_TOKENS_KEY).await? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| ChainError::Serialization(e.to_string()))
            }
            None => Ok(1),
        }
    }

    /// Restore the StateManager from the stored snapshot, if any.
    ///
    /// Returns whether a snapshot was found.
    pub async fn load_snapshot(&self) -> Result<bool, ChainError> {
        let Some(bytes) = self.db.get(SNAPSHOT_KEY).await? else {
            return Ok(false);
        };
        let state_manager = StateManager::deserialize(self.predicates.clone(), &bytes)?;
        let num_tokens = self.read_num_tokens().await?;
        let mut inner = self.inner.lock().await;
        info!("[pc-05] restored snapshot: entries={}", state_manager.len());
        inner.state_manager = state_manager;
        inner.num_tokens = num_tokens;
        Ok(true)
    }

    /// Replay stored blocks from `sync_start_block` on, stopping after two
    /// consecutive missing block numbers.
    ///
    /// Returns the number of blocks replayed.
    pub async fn sync_blocks(&self) -> Result<u64, ChainError> {
        let mut blk_num = self.config.sync_start_block;
        let mut previous_found = true;
        let mut synced = 0;
        loop {
            let found = self.sync_block(blk_num).await?;
            if !found && !previous_found {
                break;
            }
            if found {
                synced += 1;
            }
            previous_found = found;
            blk_num += 1;
        }
        let inner = self.inner.lock().await;
        self.write_snapshot(&inner.state_manager).await?;
        info!(
            "[pc-05] synced {} blocks, height={}",
            synced, inner.block_height
        );
        Ok(synced)
    }

    async fn sync_block(&self, blk_num: u64) -> Result<bool, ChainError> {
        let block = match self.get_block(blk_num).await {
            Ok(block) => block,
            Err(ChainError::BlockNotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };

        let mut inner = self.inner.lock().await;
        if let Some(deposit) = block.deposit_tx() {
            if !inner.state_manager.contains_update(deposit) {
                if let Err(e) = inner.state_manager.insert_deposit_tx(deposit.clone()) {
                    warn!("[pc-05] sync block {}: deposit skipped: {}", blk_num, e);
                }
            }
        }
        for tx in block.transactions() {
            if inner.state_manager.spend(tx).is_empty() {
                let applied = tx
                    .outputs()
                    .iter()
                    .all(|output| inner.state_manager.contains_update(output));
                if !applied {
                    warn!(
                        "[pc-05] sync block {}: tx {} skipped: inputs not tracked",
                        blk_num,
                        hash_to_hex(&tx.hash())
                    );
                }
                continue;
            }
            if let Err(e) = inner.state_manager.insert(tx) {
                warn!(
                    "[pc-05] sync block {}: tx {} skipped: {}",
                    blk_num,
                    hash_to_hex(&tx.hash()),
                    e
                );
            }
        }
        inner.block_height = inner.block_height.max(blk_num);
        debug!("[pc-05] synced block {}", blk_num);
        Ok(true)
    }

    async fn write_waiting_block(&self, root: &Hash, block: &Block) -> Result<(), ChainError> {
        self.db
            .insert(&waiting_block_key(root), block.serialize()?)
            .await
    }

    async fn write_snapshot(&self, state_manager: &StateManager) -> Result<(), ChainError> {
        self.db
            .insert(SNAPSHOT_KEY, state_manager.serialize()?)
            .await
    }
}

#[async_trait]
impl RootChainEventHandler for Chain {
    async fn handle_event(&self, event: &RootChainEvent) -> Result<(), ChainError> {
        let result = match event {
            RootChainEvent::Deposit {
                depositor,
                token_id,
                start,
                end,
                blk_num,
            } => {
                self.handle_deposit(*depositor, *token_id, *start, *end, *blk_num)
                    .await
            }
            RootChainEvent::BlockSubmitted {
                super_root,
                root,
                blk_num,
                timestamp,
            } => {
                self.handle_submit(*super_root, *root, *blk_num, *timestamp)
                    .await
            }
            RootChainEvent::ExitStarted {
                exitor,
                segment,
                blk_num,
            } => self.handle_exit(*exitor, *segment, *blk_num).await,
            RootChainEvent::TokenListed {
                token_id,
                token_address,
            } => self.handle_listing_event(*token_id, *token_address).await,
        };
        if let Err(e) = &result {
            error!("[pc-05] {} event failed: {}", event.name(), e);
        }
        result
    }
}
