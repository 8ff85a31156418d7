/// Trailing debounce the client batcher waits after the last tap before
/// flushing, in milliseconds
pub const FLUSH_DEBOUNCE_MS: u64 = 300;

/// Largest tap count a single batch request may carry
///
/// Every accepted tap fans out one ledger row, so an unbounded batch is a
/// storage-abuse vector.
pub const MAX_BATCH_COUNT: i64 = 10_000;

/// Leaderboard entries returned when the request names no limit
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 100;

/// Hard cap on the number of leaderboard entries a request may ask for
pub const MAX_LEADERBOARD_LIMIT: i64 = 500;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for a missing, non-positive, or oversized batch count
pub const ERR_INVALID_TAP_COUNT: &str = "Invalid tap count";
