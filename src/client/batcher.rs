use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::constants::FLUSH_DEBOUNCE_MS;

/// Authoritative state returned by the server for one accepted batch
#[derive(Debug, Clone)]
pub struct BatchReceipt {
    /// Calendar day the batch was folded into
    pub date: NaiveDate,
    /// The day's total after this batch, including concurrent increments
    pub tap_count: i64,
    /// How many taps this batch carried
    pub processed: i64,
}

/// Failures surfaced to the batcher by a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("server rejected batch: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Transport the batcher flushes batches through
#[async_trait]
pub trait TapSink: Send + Sync + 'static {
    async fn submit(&self, count: i64) -> Result<BatchReceipt, SinkError>;
}

/// Locally displayed count next to the last server-confirmed value.
///
/// `optimistic` moves on every tap, before the server answers; `confirmed`
/// only moves when a flush response arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeritCount {
    pub optimistic: i64,
    pub confirmed: i64,
}

#[derive(Default)]
struct BatchState {
    /// Taps recorded but not yet captured by a flush
    pending: i64,
    counts: MeritCount,
    timer: Option<JoinHandle<()>>,
}

struct BatcherInner<S> {
    sink: S,
    debounce: Duration,
    state: Mutex<BatchState>,
}

/// Coalesces rapid tap events into periodic batch submissions.
///
/// One instance per active tap surface, with an explicit lifecycle:
/// construct when the surface appears, [`close`](TapBatcher::close) when it
/// goes away. Each tap re-arms a trailing debounce timer, so a continuous
/// tap stream defers flushing until the stream pauses. Must live on a
/// Tokio runtime; the debounce timer is a spawned task.
pub struct TapBatcher<S: TapSink> {
    inner: Arc<BatcherInner<S>>,
}

impl<S: TapSink> TapBatcher<S> {
    pub fn new(sink: S) -> Self {
        Self::with_debounce(sink, Duration::from_millis(FLUSH_DEBOUNCE_MS))
    }

    pub fn with_debounce(sink: S, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(BatcherInner {
                sink,
                debounce,
                state: Mutex::new(BatchState::default()),
            }),
        }
    }

    /// Register one tap: bump the pending and optimistic counts and re-arm
    /// the flush timer.
    pub fn record_tap(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.pending += 1;
        state.counts.optimistic += 1;

        // Trailing debounce: every tap cancels the outstanding timer.
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        let inner = Arc::clone(&self.inner);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if let Err(err) = BatcherInner::flush(&inner).await {
                tracing::warn!("Tap flush failed, count requeued: {}", err);
            }
        }));
    }

    /// Submit the pending count now, if any.
    ///
    /// Returns the server receipt for a non-empty flush, `None` when there
    /// was nothing to send. Concurrent flushes cannot double-send: capture
    /// zeroes the pending count in the same critical section, so a second
    /// caller sees an empty batch.
    pub async fn flush(&self) -> Result<Option<BatchReceipt>, SinkError> {
        BatcherInner::flush(&self.inner).await
    }

    /// Current `{optimistic, confirmed}` pair
    pub fn counts(&self) -> MeritCount {
        self.inner.state.lock().unwrap().counts
    }

    /// Taps recorded but not yet accepted by the server
    pub fn pending(&self) -> i64 {
        self.inner.state.lock().unwrap().pending
    }

    /// Cancel the timer and flush outstanding taps.
    ///
    /// Call when the tap surface goes away; dropping the batcher without
    /// closing only cancels the timer and leaves captured-but-unsent taps
    /// behind.
    pub async fn close(&self) -> Result<Option<BatchReceipt>, SinkError> {
        {
            let mut state = self.inner.state.lock().unwrap();
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
        }
        BatcherInner::flush(&self.inner).await
    }
}

impl<S: TapSink> Drop for TapBatcher<S> {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.state.lock().unwrap().timer.take() {
            timer.abort();
        }
    }
}

impl<S: TapSink> BatcherInner<S> {
    async fn flush(inner: &Arc<Self>) -> Result<Option<BatchReceipt>, SinkError> {
        // Capture-and-zero is one atomic step: a tap interleaving with the
        // flush lands in the next batch, never in this one twice.
        let captured = {
            let mut state = inner.state.lock().unwrap();
            std::mem::take(&mut state.pending)
        };
        if captured == 0 {
            return Ok(None);
        }

        match inner.sink.submit(captured).await {
            Ok(receipt) => {
                let mut state = inner.state.lock().unwrap();
                // The server count is authoritative: replace the optimistic
                // base rather than adding to it. Taps that arrived while
                // the flush was in flight are still pending and stay
                // visible on top of the new base.
                state.counts.confirmed = receipt.tap_count;
                state.counts.optimistic = receipt.tap_count + state.pending;
                Ok(Some(receipt))
            }
            Err(err) => {
                let mut state = inner.state.lock().unwrap();
                // Roll back exactly what was captured and requeue it; the
                // next tap's debounce re-arms the retry.
                state.pending += captured;
                state.counts.optimistic -= captured;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

    /// Sink standing in for the server: accumulates submitted counts into
    /// an authoritative total and can be told to fail the next submission.
    struct MockSink {
        submissions: Mutex<Vec<i64>>,
        total: AtomicI64,
        fail_next: AtomicBool,
        delay: Duration,
    }

    impl MockSink {
        fn new() -> Arc<Self> {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                submissions: Mutex::new(Vec::new()),
                total: AtomicI64::new(0),
                fail_next: AtomicBool::new(false),
                delay,
            })
        }

        fn submissions(&self) -> Vec<i64> {
            self.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TapSink for Arc<MockSink> {
        async fn submit(&self, count: i64) -> Result<BatchReceipt, SinkError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(SinkError::Transport("connection reset".to_string()));
            }
            self.submissions.lock().unwrap().push(count);
            let total = self.total.fetch_add(count, Ordering::SeqCst) + count;
            Ok(BatchReceipt {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                tap_count: total,
                processed: count,
            })
        }
    }

    const DEBOUNCE: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn rapid_taps_coalesce_into_one_batch() {
        let sink = MockSink::new();
        let batcher = TapBatcher::with_debounce(Arc::clone(&sink), DEBOUNCE);

        for _ in 0..5 {
            batcher.record_tap();
        }
        assert_eq!(batcher.counts().optimistic, 5);
        assert_eq!(batcher.counts().confirmed, 0);

        // Let the debounce elapse and the timer-driven flush run.
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;

        assert_eq!(sink.submissions(), vec![5]);
        assert_eq!(batcher.pending(), 0);
        assert_eq!(
            batcher.counts(),
            MeritCount {
                optimistic: 5,
                confirmed: 5
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn each_tap_resets_the_debounce() {
        let sink = MockSink::new();
        let batcher = TapBatcher::with_debounce(Arc::clone(&sink), DEBOUNCE);

        batcher.record_tap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        batcher.record_tap();
        // 400ms since the first tap, 200ms since the second: the first
        // timer was cancelled, so nothing has flushed yet.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(sink.submissions().is_empty());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(sink.submissions(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_flush_replaces_optimistic_count() {
        let sink = MockSink::new();
        let batcher = TapBatcher::with_debounce(Arc::clone(&sink), DEBOUNCE);

        // The server already holds 7 taps from another device.
        sink.total.store(7, Ordering::SeqCst);

        for _ in 0..3 {
            batcher.record_tap();
        }
        assert_eq!(batcher.counts().optimistic, 3);

        let receipt = batcher.flush().await.unwrap().unwrap();
        assert_eq!(receipt.tap_count, 10);
        // Replaced with the authoritative total, not 3 + anything local.
        assert_eq!(
            batcher.counts(),
            MeritCount {
                optimistic: 10,
                confirmed: 10
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_flush_rolls_back_and_requeues() {
        let sink = MockSink::new();
        let batcher = TapBatcher::with_debounce(Arc::clone(&sink), DEBOUNCE);

        for _ in 0..4 {
            batcher.record_tap();
        }
        sink.fail_next.store(true, Ordering::SeqCst);

        let err = batcher.flush().await.unwrap_err();
        assert!(matches!(err, SinkError::Transport(_)));
        // Displayed count is back to its value before the captured taps
        // were ever recorded, and the taps are pending again.
        assert_eq!(batcher.counts().optimistic, 0);
        assert_eq!(batcher.pending(), 4);

        // The retry carries the full requeued count.
        let receipt = batcher.flush().await.unwrap().unwrap();
        assert_eq!(receipt.processed, 4);
        assert_eq!(sink.submissions(), vec![4]);
        assert_eq!(
            batcher.counts(),
            MeritCount {
                optimistic: 4,
                confirmed: 4
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn taps_during_inflight_flush_join_the_next_batch() {
        let sink = MockSink::with_delay(Duration::from_millis(100));
        let batcher = TapBatcher::with_debounce(Arc::clone(&sink), DEBOUNCE);

        batcher.record_tap();
        batcher.record_tap();

        // Debounce elapses; the flush captures 2 and sits in the sink's
        // delay while three more taps arrive.
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(10)).await;
        batcher.record_tap();
        batcher.record_tap();
        batcher.record_tap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(sink.submissions(), vec![2]);
        // Authoritative base 2, plus the 3 still-pending taps on display.
        assert_eq!(
            batcher.counts(),
            MeritCount {
                optimistic: 5,
                confirmed: 2
            }
        );

        // The new taps' own debounce flushes them as a separate batch.
        tokio::time::sleep(DEBOUNCE).await;
        assert_eq!(sink.submissions(), vec![2, 3]);
        assert_eq!(
            batcher.counts(),
            MeritCount {
                optimistic: 5,
                confirmed: 5
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_flushes_do_not_double_send() {
        let sink = MockSink::new();
        let batcher = TapBatcher::with_debounce(Arc::clone(&sink), DEBOUNCE);

        for _ in 0..4 {
            batcher.record_tap();
        }

        let (first, second) = tokio::join!(batcher.flush(), batcher.flush());
        // One flush captured all four taps, the other saw an empty batch.
        let receipts = [first.unwrap(), second.unwrap()];
        assert_eq!(receipts.iter().flatten().count(), 1);
        assert_eq!(sink.submissions(), vec![4]);
    }

    #[tokio::test(start_paused = true)]
    async fn close_flushes_outstanding_taps() {
        let sink = MockSink::new();
        let batcher = TapBatcher::with_debounce(Arc::clone(&sink), DEBOUNCE);

        batcher.record_tap();
        batcher.record_tap();

        let receipt = batcher.close().await.unwrap().unwrap();
        assert_eq!(receipt.processed, 2);
        assert_eq!(sink.submissions(), vec![2]);

        // The cancelled timer never produces a second flush.
        tokio::time::sleep(DEBOUNCE * 2).await;
        assert_eq!(sink.submissions(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn conservation_across_consecutive_batches() {
        let sink = MockSink::new();
        let batcher = TapBatcher::with_debounce(Arc::clone(&sink), DEBOUNCE);

        for _ in 0..5 {
            batcher.record_tap();
        }
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(10)).await;

        for _ in 0..3 {
            batcher.record_tap();
        }
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(10)).await;

        assert_eq!(sink.submissions(), vec![5, 3]);
        assert_eq!(sink.total.load(Ordering::SeqCst), 8);
        assert_eq!(
            batcher.counts(),
            MeritCount {
                optimistic: 8,
                confirmed: 8
            }
        );
    }
}
