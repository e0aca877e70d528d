use crate::{BackfillVerifier, ChainConfig};
use slog::Logger;
use sloggers::{null::NullLoggerBuilder, Build};
use state_processing::SignatureBatchVerifier;
use std::sync::atomic::{AtomicUsize, Ordering};
use types::test_utils::generate_deterministic_keypairs;
use types::{
    BeaconBlock, BeaconState, ChainSpec, Domain, EthSpec, Hash256, Keypair, MinimalEthSpec,
    PublicKeyBytes, SignatureSet, SignedBeaconBlock, SignedRoot, Slot, Validator,
};

pub type E = MinimalEthSpec;

pub const DEFAULT_VALIDATOR_COUNT: usize = 16;

/// Returns a logger suitable for tests.
///
/// Output is dropped unless the `test_logger` feature is enabled.
pub fn test_logger() -> Logger {
    if cfg!(feature = "test_logger") {
        sloggers::terminal::TerminalLoggerBuilder::new()
            .level(sloggers::types::Severity::Debug)
            .build()
            .expect("Should build test_logger")
    } else {
        NullLoggerBuilder.build().expect("Should build null_logger")
    }
}

/// A `SignatureBatchVerifier` that returns a fixed answer and records how it was called.
#[derive(Debug)]
pub struct MockBatchVerifier {
    result: bool,
    calls: AtomicUsize,
    sets: AtomicUsize,
}

impl MockBatchVerifier {
    pub fn accepting() -> Self {
        Self::new(true)
    }

    pub fn rejecting() -> Self {
        Self::new(false)
    }

    fn new(result: bool) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        }
    }

    /// Number of times `verify_signature_sets` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total number of signature sets seen across all calls.
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

impl SignatureBatchVerifier for MockBatchVerifier {
    fn verify_signature_sets<'a>(&self, sets: Vec<SignatureSet<'a>>) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sets.fetch_add(sets.len(), Ordering::SeqCst);
        self.result
    }
}

/// Builds a correctly signed chain of blocks from genesis, one block per slot.
///
/// `blocks[i]` is the block at slot `i`; `blocks[0]` is the unsigned genesis block.
pub struct HistoricalChainHarness {
    pub spec: ChainSpec,
    pub keypairs: Vec<Keypair>,
    pub genesis_state: BeaconState<E>,
    pub blocks: Vec<SignedBeaconBlock>,
}

impl HistoricalChainHarness {
    pub fn new(validator_count: usize) -> Self {
        Self::with_spec(validator_count, ChainSpec::minimal())
    }

    pub fn with_spec(validator_count: usize, spec: ChainSpec) -> Self {
        let keypairs = generate_deterministic_keypairs(validator_count);
        let validators = keypairs
            .iter()
            .map(|kp| Validator {
                pubkey: PublicKeyBytes::from(&kp.pk),
                effective_balance: 32_000_000_000,
                slashed: false,
            })
            .collect();
        let genesis_state =
            BeaconState::new(0, validators, &spec).expect("should build genesis state");

        let genesis_block = SignedBeaconBlock::from_block(
            BeaconBlock::empty(&spec),
            types::Signature::empty(),
        );

        Self {
            spec,
            keypairs,
            genesis_state,
            blocks: vec![genesis_block],
        }
    }

    /// Append `num_blocks` blocks, each at the slot after the current head.
    pub fn extend_chain(&mut self, num_blocks: usize) {
        for _ in 0..num_blocks {
            let parent = self.head();
            let slot = parent.slot() + 1;
            let proposer_index = slot.as_usize() % self.keypairs.len();

            let mut block = BeaconBlock::empty(&self.spec);
            block.slot = slot;
            block.proposer_index = proposer_index as u64;
            block.parent_root = parent.canonical_root();
            block.state_root = Hash256::from_low_u64_be(slot.as_u64());
            block.body.randao_reveal = self.sign_randao(slot, proposer_index);

            let signature = self.sign_block(&block, proposer_index);
            self.blocks.push(SignedBeaconBlock::from_block(block, signature));
        }
    }

    pub fn head(&self) -> &SignedBeaconBlock {
        self.blocks
            .last()
            .expect("harness always holds the genesis block")
    }

    pub fn block_root_at(&self, slot: u64) -> Hash256 {
        self.blocks[slot as usize].canonical_root()
    }

    /// Signs `block` as `validator_index` under the proposer domain active at its slot.
    pub fn sign_block(&self, block: &BeaconBlock, validator_index: usize) -> types::Signature {
        let epoch = block.epoch::<E>();
        let domain = self.spec.get_domain(
            epoch,
            Domain::BeaconProposer,
            &self.spec.fork_at_epoch(epoch),
            self.genesis_state.genesis_validators_root,
        );
        self.keypairs[validator_index]
            .sk
            .sign(block.signing_root(domain))
    }

    fn sign_randao(&self, slot: Slot, validator_index: usize) -> types::Signature {
        let epoch = slot.epoch(E::slots_per_epoch());
        let domain = self.spec.get_domain(
            epoch,
            Domain::Randao,
            &self.spec.fork_at_epoch(epoch),
            self.genesis_state.genesis_validators_root,
        );
        self.keypairs[validator_index]
            .sk
            .sign(epoch.signing_root(domain))
    }

    /// A `BackfillVerifier` for this chain using the default `ChainConfig`.
    pub fn backfill_verifier<V: SignatureBatchVerifier>(
        &self,
        signature_verifier: V,
    ) -> BackfillVerifier<E, V> {
        self.backfill_verifier_with_config(signature_verifier, ChainConfig::default())
    }

    pub fn backfill_verifier_with_config<V: SignatureBatchVerifier>(
        &self,
        signature_verifier: V,
        config: ChainConfig,
    ) -> BackfillVerifier<E, V> {
        BackfillVerifier::from_state(
            &self.genesis_state,
            self.spec.clone(),
            config,
            signature_verifier,
            test_logger(),
        )
        .expect("should build backfill verifier")
    }
}
