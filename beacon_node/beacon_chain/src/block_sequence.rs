//! Parent-root linkage checks for batches of historical blocks.
use crate::historical_blocks::{BackfillOutcome, HistoricalBlockError, PartialReason};
use types::{Hash256, SignedBeaconBlock};

/// A block that has been shown to hash-link to the anchor of a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkedBlock<'a> {
    pub block: &'a SignedBeaconBlock,
    /// The `tree_hash_root` of `block.message()`, computed once during linkage.
    pub block_root: Hash256,
}

/// The longest run of blocks that links back from an anchor.
#[derive(Debug, PartialEq)]
pub struct BlockSequence<'a> {
    /// Linked blocks, newest first.
    pub linked: Vec<LinkedBlock<'a>>,
    /// The root that the next (older) block must have.
    pub next_anchor: Hash256,
    pub outcome: BackfillOutcome,
}

/// Walks `blocks` from newest to oldest, checking that each block's root is the parent root of
/// the block after it, starting from `anchor`.
///
/// `blocks` is expected in the order a peer returns them from a `BlocksByRange` request, i.e.,
/// ascending by slot. No signatures are checked here.
///
/// ## Errors
///
/// Returns `NotAnchored` if the newest block does not have the root `anchor`. A break in
/// linkage after the first block is not an error: the linked prefix is returned with a
/// `Partial(NotLinear)` outcome and `next_anchor` set to the root the missing block must have.
pub fn verify_block_sequence(
    anchor: Hash256,
    blocks: &[SignedBeaconBlock],
) -> Result<BlockSequence<'_>, HistoricalBlockError> {
    let mut expected_block_root = anchor;
    let mut linked = Vec::with_capacity(blocks.len());

    for block in blocks.iter().rev() {
        let block_root = block.canonical_root();

        if block_root != expected_block_root {
            if linked.is_empty() {
                return Err(HistoricalBlockError::NotAnchored { block_root, anchor });
            }
            return Ok(BlockSequence {
                linked,
                next_anchor: expected_block_root,
                outcome: BackfillOutcome::Partial(PartialReason::NotLinear),
            });
        }

        linked.push(LinkedBlock { block, block_root });
        expected_block_root = block.parent_root();
    }

    Ok(BlockSequence {
        linked,
        next_anchor: expected_block_root,
        outcome: BackfillOutcome::Complete,
    })
}
