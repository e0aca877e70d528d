use beacon_chain::test_utils::{
    HistoricalChainHarness, MockBatchVerifier, DEFAULT_VALIDATOR_COUNT,
};
use beacon_chain::{
    BackfillOutcome, BlsBatchVerifier, ChainConfig, HistoricalBlockError, PartialReason,
};
use state_processing::signature_sets::Error as SignatureSetError;
use std::time::Duration;
use types::{ChainSpec, Epoch, Hash256, Signature, SignedBeaconBlock, Slot};

fn harness(num_blocks: usize) -> HistoricalChainHarness {
    let mut harness = HistoricalChainHarness::new(DEFAULT_VALIDATOR_COUNT);
    harness.extend_chain(num_blocks);
    harness
}

fn roots(blocks: &[&SignedBeaconBlock]) -> Vec<Hash256> {
    blocks.iter().map(|block| block.canonical_root()).collect()
}

#[test]
fn complete_batch_with_valid_signatures() {
    let harness = harness(20);
    let verifier = harness.backfill_verifier(BlsBatchVerifier);
    let batch = &harness.blocks[5..=20];

    let verification = verifier
        .verify_batch(harness.block_root_at(20), batch)
        .unwrap();

    assert_eq!(verification.outcome, BackfillOutcome::Complete);
    assert_eq!(verification.next_anchor, harness.blocks[5].parent_root());
    assert_eq!(verification.next_anchor, harness.block_root_at(4));
    assert_eq!(
        roots(&verification.verified_blocks),
        batch.iter().rev().map(|b| b.canonical_root()).collect::<Vec<_>>()
    );
    assert_eq!(verification.oldest_block_slot(), Some(Slot::new(5)));
}

#[test]
fn batch_down_to_genesis_verifies() {
    let harness = harness(12);
    let verifier = harness.backfill_verifier(BlsBatchVerifier);

    let verification = verifier
        .verify_batch(harness.block_root_at(12), &harness.blocks)
        .unwrap();

    assert_eq!(verification.outcome, BackfillOutcome::Complete);
    assert_eq!(verification.verified_blocks.len(), 13);
    assert_eq!(verification.next_anchor, Hash256::zero());
    assert_eq!(verification.oldest_block_slot(), Some(Slot::new(0)));
}

#[test]
fn head_mismatch_is_not_anchored() {
    let harness = harness(8);
    let mock = MockBatchVerifier::accepting();
    let verifier = harness.backfill_verifier(&mock);
    let anchor = harness.block_root_at(7);

    assert_eq!(
        verifier.verify_batch(anchor, &harness.blocks[1..=8]),
        Err(HistoricalBlockError::NotAnchored {
            block_root: harness.block_root_at(8),
            anchor,
        })
    );
    assert_eq!(mock.calls(), 0);
}

#[test]
fn broken_linkage_returns_partial_prefix() {
    let mut harness = harness(10);
    // Re-sign block 6 with different contents so it no longer links to block 7.
    let mut block = harness.blocks[6].message().clone();
    block.state_root = Hash256::repeat_byte(0xee);
    let signature = harness.sign_block(&block, block.proposer_index as usize);
    harness.blocks[6] = SignedBeaconBlock::from_block(block, signature);

    let mock = MockBatchVerifier::accepting();
    let verifier = harness.backfill_verifier(&mock);

    let verification = verifier
        .verify_batch(harness.block_root_at(10), &harness.blocks[1..=10])
        .unwrap();

    // Blocks 10, 9, 8 and 7 link; block 6 does not.
    assert_eq!(
        verification.outcome,
        BackfillOutcome::Partial(PartialReason::NotLinear)
    );
    assert_eq!(verification.verified_blocks.len(), 4);
    assert_eq!(verification.next_anchor, harness.blocks[7].parent_root());
    assert_eq!(verification.oldest_block_slot(), Some(Slot::new(7)));
    // Only the linked prefix is sent for signature verification.
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.sets(), 4);
}

#[test]
fn invalid_signature_rejects_whole_prefix() {
    let mut harness = harness(10);
    // Swap in a signature from the wrong proposer without changing the block root.
    let wrong_signer =
        (harness.blocks[4].message().proposer_index as usize + 1) % DEFAULT_VALIDATOR_COUNT;
    harness.blocks[4].signature = harness.sign_block(harness.blocks[4].message(), wrong_signer);
    let verifier = harness.backfill_verifier(BlsBatchVerifier);

    assert_eq!(
        verifier.verify_batch(harness.block_root_at(10), &harness.blocks[1..=10]),
        Err(HistoricalBlockError::InvalidSignature)
    );
}

#[test]
fn empty_signature_is_invalid() {
    let mut harness = harness(4);
    harness.blocks[2].signature = Signature::empty();
    let verifier = harness.backfill_verifier(BlsBatchVerifier);

    assert_eq!(
        verifier.verify_batch(harness.block_root_at(4), &harness.blocks[1..=4]),
        Err(HistoricalBlockError::InvalidSignature)
    );
}

#[test]
fn rejecting_verifier_yields_invalid_signature() {
    let harness = harness(6);
    let mock = MockBatchVerifier::rejecting();
    let verifier = harness.backfill_verifier(&mock);

    assert_eq!(
        verifier.verify_batch(harness.block_root_at(6), &harness.blocks[1..=6]),
        Err(HistoricalBlockError::InvalidSignature)
    );
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.sets(), 6);
}

#[test]
fn genesis_is_excluded_from_signature_sets() {
    let harness = harness(3);
    let mock = MockBatchVerifier::accepting();
    let verifier = harness.backfill_verifier(&mock);

    let verification = verifier
        .verify_batch(harness.block_root_at(3), &harness.blocks)
        .unwrap();

    assert_eq!(verification.verified_blocks.len(), 4);
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.sets(), 3);
}

#[test]
fn genesis_only_batch_skips_verifier() {
    let harness = harness(0);
    let mock = MockBatchVerifier::rejecting();
    let verifier = harness.backfill_verifier(&mock);

    let verification = verifier
        .verify_batch(harness.block_root_at(0), &harness.blocks)
        .unwrap();

    assert_eq!(verification.outcome, BackfillOutcome::Complete);
    assert_eq!(verification.verified_blocks.len(), 1);
    assert_eq!(mock.calls(), 0);
}

#[test]
fn misplaced_genesis_block_is_rejected() {
    let harness = harness(4);
    let mock = MockBatchVerifier::accepting();
    let verifier = harness.backfill_verifier(&mock);
    let batch = vec![
        harness.blocks[1].clone(),
        harness.blocks[0].clone(),
        harness.blocks[2].clone(),
    ];

    assert_eq!(
        verifier.verify_batch(harness.block_root_at(2), &batch),
        Err(HistoricalBlockError::MisplacedGenesisBlock { index: 1 })
    );
    assert_eq!(mock.calls(), 0);
}

#[test]
fn head_mismatch_wins_over_misplaced_genesis() {
    let harness = harness(4);
    let mock = MockBatchVerifier::accepting();
    let verifier = harness.backfill_verifier(&mock);
    let batch = vec![
        harness.blocks[1].clone(),
        harness.blocks[0].clone(),
        harness.blocks[2].clone(),
    ];
    let wrong_anchor = harness.block_root_at(4);

    assert_eq!(
        verifier.verify_batch(wrong_anchor, &batch),
        Err(HistoricalBlockError::NotAnchored {
            block_root: harness.block_root_at(2),
            anchor: wrong_anchor,
        })
    );
    assert_eq!(mock.calls(), 0);
}

#[test]
fn genesis_only_and_empty_batches_skip_pubkey_cache() {
    let harness = harness(2);
    let config = ChainConfig {
        pubkey_cache_lock_timeout: Duration::from_millis(10),
        ..ChainConfig::default()
    };
    let mock = MockBatchVerifier::rejecting();
    let verifier = harness.backfill_verifier_with_config(&mock, config);

    let write_lock = verifier.validator_pubkey_cache().write();

    let verification = verifier
        .verify_batch(harness.block_root_at(0), &harness.blocks[..1])
        .unwrap();
    assert_eq!(verification.outcome, BackfillOutcome::Complete);
    assert_eq!(verification.verified_blocks.len(), 1);

    let anchor = harness.block_root_at(2);
    let verification = verifier.verify_batch(anchor, &[]).unwrap();
    assert_eq!(verification.outcome, BackfillOutcome::Complete);
    assert_eq!(verification.next_anchor, anchor);

    assert_eq!(
        verifier.verify_batch(harness.block_root_at(2), &harness.blocks[1..=2]),
        Err(HistoricalBlockError::ValidatorPubkeyCacheTimeout)
    );

    drop(write_lock);
    assert_eq!(mock.calls(), 0);
}

#[test]
fn empty_batch_is_complete() {
    let harness = harness(2);
    let mock = MockBatchVerifier::accepting();
    let verifier = harness.backfill_verifier(&mock);
    let anchor = harness.block_root_at(2);

    let verification = verifier.verify_batch(anchor, &[]).unwrap();

    assert_eq!(verification.outcome, BackfillOutcome::Complete);
    assert!(verification.verified_blocks.is_empty());
    assert_eq!(verification.next_anchor, anchor);
    assert_eq!(mock.calls(), 0);
}

#[test]
fn oversized_batch_is_rejected() {
    let harness = harness(10);
    let mock = MockBatchVerifier::accepting();
    let config = ChainConfig {
        max_backfill_batch_size: 4,
        ..ChainConfig::default()
    };
    let verifier = harness.backfill_verifier_with_config(&mock, config);

    assert_eq!(
        verifier.verify_batch(harness.block_root_at(10), &harness.blocks[5..=10]),
        Err(HistoricalBlockError::BatchTooLarge {
            blocks: 6,
            max_blocks: 4
        })
    );
    assert!(verifier
        .verify_batch(harness.block_root_at(10), &harness.blocks[7..=10])
        .is_ok());
}

#[test]
fn unknown_proposer_is_a_signature_set_error() {
    let mut harness = harness(3);
    let mut block = harness.blocks[3].message().clone();
    block.proposer_index = DEFAULT_VALIDATOR_COUNT as u64 + 10;
    harness.blocks[3] = SignedBeaconBlock::from_block(block, Signature::empty());
    let mock = MockBatchVerifier::accepting();
    let verifier = harness.backfill_verifier(&mock);

    assert_eq!(
        verifier.verify_batch(harness.block_root_at(3), &harness.blocks[1..=3]),
        Err(HistoricalBlockError::SignatureSet(
            SignatureSetError::ValidatorUnknown(DEFAULT_VALIDATOR_COUNT as u64 + 10)
        ))
    );
    assert_eq!(mock.calls(), 0);
}

#[test]
fn pubkey_cache_contention_times_out() {
    let harness = harness(3);
    let config = ChainConfig {
        pubkey_cache_lock_timeout: Duration::from_millis(10),
        ..ChainConfig::default()
    };
    let verifier = harness.backfill_verifier_with_config(BlsBatchVerifier, config);

    let write_lock = verifier.validator_pubkey_cache().write();
    assert_eq!(
        verifier.verify_batch(harness.block_root_at(3), &harness.blocks[1..=3]),
        Err(HistoricalBlockError::ValidatorPubkeyCacheTimeout)
    );
    drop(write_lock);

    assert!(verifier
        .verify_batch(harness.block_root_at(3), &harness.blocks[1..=3])
        .is_ok());
}

#[test]
fn blocks_across_fork_boundaries_verify() {
    let mut spec = ChainSpec::minimal();
    spec.altair_fork_epoch = Some(Epoch::new(1));
    spec.bellatrix_fork_epoch = Some(Epoch::new(2));
    let mut harness = HistoricalChainHarness::with_spec(DEFAULT_VALIDATOR_COUNT, spec);
    harness.extend_chain(30);
    let verifier = harness.backfill_verifier(BlsBatchVerifier);

    let verification = verifier
        .verify_batch(harness.block_root_at(30), &harness.blocks[1..=30])
        .unwrap();
    assert_eq!(verification.verified_blocks.len(), 30);

    // A block signed under the genesis fork domain is invalid after Altair.
    let mut block = harness.blocks[12].message().clone();
    block.state_root = Hash256::repeat_byte(0x12);
    let genesis_domain_harness = HistoricalChainHarness::new(DEFAULT_VALIDATOR_COUNT);
    let signature = genesis_domain_harness.sign_block(&block, block.proposer_index as usize);
    let forged = SignedBeaconBlock::from_block(block, signature);
    let forged_root = forged.canonical_root();

    assert_eq!(
        verifier.verify_batch(forged_root, std::slice::from_ref(&forged)),
        Err(HistoricalBlockError::InvalidSignature)
    );
}

/// Blocks built by hand so their roots can be named in the assertions.
mod linkage_scenarios {
    use super::*;
    use types::BeaconBlock;

    fn block(slot: u64, parent_root: Hash256) -> SignedBeaconBlock {
        let mut block = BeaconBlock::empty(&ChainSpec::minimal());
        block.slot = Slot::new(slot);
        block.parent_root = parent_root;
        SignedBeaconBlock::from_block(block, Signature::empty())
    }

    #[test]
    fn two_linked_blocks_complete() {
        let harness = harness(0);
        let mock = MockBatchVerifier::accepting();
        let verifier = harness.backfill_verifier(&mock);

        let root_cc = Hash256::repeat_byte(0xcc);
        let block_9 = block(9, root_cc);
        let root_bb = block_9.canonical_root();
        let block_10 = block(10, root_bb);
        let root_aa = block_10.canonical_root();

        let batch = vec![block_9, block_10];
        let verification = verifier.verify_batch(root_aa, &batch).unwrap();

        assert_eq!(verification.outcome, BackfillOutcome::Complete);
        assert_eq!(verification.next_anchor, root_cc);
        assert_eq!(roots(&verification.verified_blocks), vec![root_aa, root_bb]);
        assert_eq!(mock.sets(), 2);
    }

    #[test]
    fn mismatch_at_second_block_is_partial() {
        let harness = harness(0);
        let mock = MockBatchVerifier::accepting();
        let verifier = harness.backfill_verifier(&mock);

        let root_bb = Hash256::repeat_byte(0xbb);
        let block_10 = block(10, root_bb);
        let root_aa = block_10.canonical_root();
        // Slot 9 block whose root is not `root_bb`.
        let block_9 = block(9, Hash256::repeat_byte(0xee));

        let batch = vec![block_9, block_10];
        let verification = verifier.verify_batch(root_aa, &batch).unwrap();

        assert_eq!(
            verification.outcome,
            BackfillOutcome::Partial(PartialReason::NotLinear)
        );
        assert_eq!(roots(&verification.verified_blocks), vec![root_aa]);
        assert_eq!(verification.next_anchor, root_bb);
        assert_eq!(mock.sets(), 1);
    }
}
