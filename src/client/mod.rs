//! Client-side tap batching.
//!
//! A tap surface produces taps far faster than it should produce HTTP
//! requests. [`TapBatcher`] coalesces the stream: every tap bumps an
//! optimistic local count and re-arms a trailing debounce timer, and only
//! once the stream pauses does one batch request go out through a
//! [`TapSink`]. The server's answer is authoritative and replaces the
//! optimistic count; a failed flush rolls the optimistic count back and
//! requeues the captured taps for the next flush.

pub mod batcher;
pub mod http;

pub use batcher::{BatchReceipt, MeritCount, SinkError, TapBatcher, TapSink};
pub use http::HttpTapSink;
