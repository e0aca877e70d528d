use crate::historical_blocks::{BackfillVerification, BackfillVerifier, HistoricalBlockError};
use slog::{debug, info};
use state_processing::SignatureBatchVerifier;
use types::{EthSpec, Hash256, SignedBeaconBlock, Slot};

/// Tracks the progress of a single backfill sync, from a trusted anchor back to genesis.
///
/// Batches must be processed one at a time through `&mut self`, so two batches can never race to
/// extend the same anchor. The anchor only moves when a batch is verified.
pub struct BackfillSession<'v, E: EthSpec, V> {
    verifier: &'v BackfillVerifier<E, V>,
    anchor: Hash256,
    oldest_block_slot: Option<Slot>,
    complete: bool,
}

impl<'v, E: EthSpec, V: SignatureBatchVerifier> BackfillSession<'v, E, V> {
    pub fn new(verifier: &'v BackfillVerifier<E, V>, anchor: Hash256) -> Self {
        Self {
            verifier,
            anchor,
            oldest_block_slot: None,
            complete: false,
        }
    }

    /// The root that the next batch's newest block must have.
    pub fn anchor(&self) -> Hash256 {
        self.anchor
    }

    /// The slot of the oldest block verified by this session.
    pub fn oldest_block_slot(&self) -> Option<Slot> {
        self.oldest_block_slot
    }

    /// Returns `true` once the genesis block has been verified.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Verify `blocks` against the current anchor and, on success, move the anchor to the
    /// returned `next_anchor`.
    ///
    /// An `Err` leaves the session exactly as it was.
    pub fn process_batch<'a>(
        &mut self,
        blocks: &'a [SignedBeaconBlock],
    ) -> Result<BackfillVerification<'a>, HistoricalBlockError> {
        if self.complete {
            return Err(HistoricalBlockError::NoAnchorInfo);
        }

        let verification = self.verifier.verify_batch(self.anchor, blocks)?;

        let log = self.verifier.log();
        self.anchor = verification.next_anchor;
        if let Some(slot) = verification.oldest_block_slot() {
            self.oldest_block_slot = Some(slot);
        }

        if self.oldest_block_slot == Some(self.verifier.spec().genesis_slot) {
            self.complete = true;
            info!(log, "Historical block download complete");
        } else {
            debug!(
                log,
                "Backfill anchor advanced";
                "anchor" => ?self.anchor,
                "oldest_block_slot" => ?self.oldest_block_slot,
            );
        }

        Ok(verification)
    }
}
