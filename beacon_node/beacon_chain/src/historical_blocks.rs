use crate::block_sequence::verify_block_sequence;
use crate::errors::BeaconChainError;
use crate::{metrics, ChainConfig, ValidatorPubkeyCache};
use parking_lot::RwLock;
use slog::{debug, warn, Logger};
use state_processing::signature_sets::{
    block_proposal_signature_set_from_parts, Error as SignatureSetError,
};
use state_processing::SignatureBatchVerifier;
use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;
use types::{BeaconState, ChainSpec, EthSpec, Hash256, SignedBeaconBlock, Slot};

#[derive(Debug, PartialEq, Clone)]
pub enum HistoricalBlockError {
    /// The newest block of the batch is not the anchor, caller should re-anchor or request
    /// different blocks.
    NotAnchored { block_root: Hash256, anchor: Hash256 },
    /// Bad signature, caller should retry with different blocks.
    InvalidSignature,
    /// Bad signature, caller should retry with different blocks.
    SignatureSet(SignatureSetError),
    /// A genesis block appeared somewhere other than the start of the batch.
    MisplacedGenesisBlock { index: usize },
    /// More blocks than `ChainConfig::max_backfill_batch_size`.
    BatchTooLarge { blocks: usize, max_blocks: usize },
    /// Transitory error, caller should retry with the same blocks.
    ValidatorPubkeyCacheTimeout,
    /// No historical sync needed.
    NoAnchorInfo,
}

/// Why a batch was only partially accepted.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PartialReason {
    /// Linkage broke part-way through the batch.
    NotLinear,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BackfillOutcome {
    /// Every block in the batch was verified.
    Complete,
    /// A prefix of the batch was verified, resume from `next_anchor`.
    Partial(PartialReason),
}

/// The result of successfully verifying a backfill batch.
#[derive(Debug, PartialEq)]
pub struct BackfillVerification<'a> {
    /// Verified blocks in the order they were checked, newest first.
    pub verified_blocks: Vec<&'a SignedBeaconBlock>,
    /// The root that the next older block must have.
    pub next_anchor: Hash256,
    pub outcome: BackfillOutcome,
}

impl<'a> BackfillVerification<'a> {
    /// The slot of the oldest verified block, if any.
    pub fn oldest_block_slot(&self) -> Option<Slot> {
        self.verified_blocks.last().map(|block| block.slot())
    }
}

/// Verifies batches of historical blocks against a trusted anchor.
///
/// Blocks are accepted on hash linkage to the anchor alone, then every proposer signature in the
/// linked prefix is checked in a single batch. No state is required, only the validator pubkeys.
pub struct BackfillVerifier<E: EthSpec, V> {
    spec: ChainSpec,
    config: ChainConfig,
    genesis_validators_root: Hash256,
    validator_pubkey_cache: Arc<RwLock<ValidatorPubkeyCache>>,
    signature_verifier: V,
    log: Logger,
    _phantom: PhantomData<E>,
}

impl<E: EthSpec, V: SignatureBatchVerifier> BackfillVerifier<E, V> {
    pub fn new(
        spec: ChainSpec,
        config: ChainConfig,
        genesis_validators_root: Hash256,
        validator_pubkey_cache: Arc<RwLock<ValidatorPubkeyCache>>,
        signature_verifier: V,
        log: Logger,
    ) -> Result<Self, BeaconChainError> {
        spec.ensure_preset::<E>()?;

        Ok(Self {
            spec,
            config,
            genesis_validators_root,
            validator_pubkey_cache,
            signature_verifier,
            log,
            _phantom: PhantomData,
        })
    }

    /// Build a verifier whose pubkey cache is seeded from `state`.
    pub fn from_state(
        state: &BeaconState<E>,
        spec: ChainSpec,
        config: ChainConfig,
        signature_verifier: V,
        log: Logger,
    ) -> Result<Self, BeaconChainError> {
        let validator_pubkey_cache = Arc::new(RwLock::new(ValidatorPubkeyCache::new(state)?));
        Self::new(
            spec,
            config,
            state.genesis_validators_root,
            validator_pubkey_cache,
            signature_verifier,
            log,
        )
    }

    pub fn spec(&self) -> &ChainSpec {
        &self.spec
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    pub fn validator_pubkey_cache(&self) -> &Arc<RwLock<ValidatorPubkeyCache>> {
        &self.validator_pubkey_cache
    }

    /// Verify a batch of `blocks`, ordered ascending by slot, whose newest block must have the
    /// root `anchor`.
    ///
    /// Returns the longest prefix (from the anchor) that hash-links, provided every proposer
    /// signature in that prefix is valid. The genesis block carries no valid signature and is
    /// never checked. The signature verifier is called at most once.
    ///
    /// Nothing is committed here. On `Err` the caller must discard the whole batch.
    pub fn verify_batch<'a>(
        &self,
        anchor: Hash256,
        blocks: &'a [SignedBeaconBlock],
    ) -> Result<BackfillVerification<'a>, HistoricalBlockError> {
        let _timer = metrics::start_timer(&metrics::BACKFILL_BATCH_TIMES);

        let result = self.verify_batch_inner(anchor, blocks);

        match &result {
            Ok(verification) => {
                metrics::inc_counter_by(
                    &metrics::BACKFILL_VERIFIED_BLOCKS_TOTAL,
                    verification.verified_blocks.len() as u64,
                );
                if verification.outcome != BackfillOutcome::Complete {
                    metrics::inc_counter(&metrics::BACKFILL_PARTIAL_BATCHES_TOTAL);
                }
                debug!(
                    self.log,
                    "Verified backfill batch";
                    "anchor" => ?anchor,
                    "next_anchor" => ?verification.next_anchor,
                    "blocks" => blocks.len(),
                    "verified" => verification.verified_blocks.len(),
                    "outcome" => ?verification.outcome,
                );
            }
            Err(HistoricalBlockError::ValidatorPubkeyCacheTimeout) => {
                metrics::inc_counter(&metrics::BACKFILL_FAILED_BATCHES_TOTAL);
                warn!(
                    self.log,
                    "Backfill batch processing error";
                    "error" => "pubkey_cache_timeout"
                );
            }
            Err(e) => {
                metrics::inc_counter(&metrics::BACKFILL_FAILED_BATCHES_TOTAL);
                warn!(
                    self.log,
                    "Backfill batch processing error";
                    "anchor" => ?anchor,
                    "blocks" => blocks.len(),
                    "error" => ?e
                );
            }
        }

        result
    }

    fn verify_batch_inner<'a>(
        &self,
        anchor: Hash256,
        blocks: &'a [SignedBeaconBlock],
    ) -> Result<BackfillVerification<'a>, HistoricalBlockError> {
        if blocks.len() > self.config.max_backfill_batch_size {
            return Err(HistoricalBlockError::BatchTooLarge {
                blocks: blocks.len(),
                max_blocks: self.config.max_backfill_batch_size,
            });
        }

        let sequence = verify_block_sequence(anchor, blocks)?;

        // Only the oldest block of a batch may be the genesis block.
        if let Some(index) = blocks
            .iter()
            .skip(1)
            .position(|block| block.slot() == self.spec.genesis_slot)
        {
            return Err(HistoricalBlockError::MisplacedGenesisBlock { index: index + 1 });
        }

        let verification = BackfillVerification {
            verified_blocks: sequence.linked.iter().map(|linked| linked.block).collect(),
            next_anchor: sequence.next_anchor,
            outcome: sequence.outcome,
        };

        if sequence
            .linked
            .iter()
            .all(|linked| linked.block.slot() == self.spec.genesis_slot)
        {
            return Ok(verification);
        }

        let setup_timer = metrics::start_timer(&metrics::BACKFILL_SIGNATURE_SETUP_TIMES);

        let pubkey_cache = self
            .validator_pubkey_cache
            .try_read_for(self.config.pubkey_cache_lock_timeout)
            .ok_or(HistoricalBlockError::ValidatorPubkeyCacheTimeout)?;

        let signature_sets = sequence
            .linked
            .iter()
            .filter(|linked| linked.block.slot() != self.spec.genesis_slot)
            .map(|linked| {
                let block = linked.block.message();
                block_proposal_signature_set_from_parts::<E, _>(
                    linked.block,
                    Some(linked.block_root),
                    block.proposer_index(),
                    &self.spec.fork_at_epoch(block.epoch::<E>()),
                    self.genesis_validators_root,
                    |validator_index| pubkey_cache.get(validator_index).cloned().map(Cow::Owned),
                    &self.spec,
                )
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(HistoricalBlockError::SignatureSet)?;

        drop(pubkey_cache);
        drop(setup_timer);

        let _verify_timer = metrics::start_timer(&metrics::BACKFILL_SIGNATURE_VERIFY_TIMES);
        if !self.signature_verifier.verify_signature_sets(signature_sets) {
            return Err(HistoricalBlockError::InvalidSignature);
        }

        Ok(verification)
    }
}
