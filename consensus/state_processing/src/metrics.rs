use lazy_static::lazy_static;
pub use metrics::*;

lazy_static! {
    /*
     * Per-block processing
     */
    pub static ref PROCESS_RANDAO_TIMES: Result<Histogram> = try_create_histogram(
        "beacon_state_processing_process_randao_seconds",
        "Time spent verifying the randao reveal and updating the randao mix"
    );
    pub static ref RANDAO_SIGNATURE_FAILURES: Result<IntCounter> = try_create_int_counter(
        "beacon_state_processing_randao_signature_failures_total",
        "Count of blocks rejected for an invalid randao reveal"
    );
    /*
     * Signature verification
     */
    pub static ref SIGNATURE_SETS_VERIFIED: Result<IntCounter> = try_create_int_counter(
        "beacon_state_processing_signature_sets_verified_total",
        "Count of signature sets submitted for batch verification"
    );
    pub static ref BATCH_SIGNATURE_VERIFY_TIMES: Result<Histogram> = try_create_histogram(
        "beacon_state_processing_batch_signature_verify_seconds",
        "Time spent verifying a batch of signature sets"
    );
}
