use lazy_static::lazy_static;
pub use metrics::*;

lazy_static! {
    /*
     * Backfill
     */
    pub static ref BACKFILL_BATCH_TIMES: Result<Histogram> = try_create_histogram(
        "beacon_backfill_batch_verify_seconds",
        "Full runtime of backfill batch verification"
    );
    pub static ref BACKFILL_SIGNATURE_SETUP_TIMES: Result<Histogram> = try_create_histogram(
        "beacon_backfill_signature_setup_seconds",
        "Time spent building signature sets for backfill batches"
    );
    pub static ref BACKFILL_SIGNATURE_VERIFY_TIMES: Result<Histogram> = try_create_histogram(
        "beacon_backfill_signature_verify_seconds",
        "Time spent verifying signature sets for backfill batches"
    );
    pub static ref BACKFILL_VERIFIED_BLOCKS_TOTAL: Result<IntCounter> = try_create_int_counter(
        "beacon_backfill_verified_blocks_total",
        "Count of historical blocks verified by backfill"
    );
    pub static ref BACKFILL_PARTIAL_BATCHES_TOTAL: Result<IntCounter> = try_create_int_counter(
        "beacon_backfill_partial_batches_total",
        "Count of backfill batches that only partially linked to their anchor"
    );
    pub static ref BACKFILL_FAILED_BATCHES_TOTAL: Result<IntCounter> = try_create_int_counter(
        "beacon_backfill_failed_batches_total",
        "Count of backfill batches rejected with an error"
    );
}
