//! Synthetic byte-stream channels.
//!
//! These channels emulate arbitrarily large readable/writable data sources
//! under a bounded in-memory footprint. The read side produces a
//! reproducible pseudo-random stream from a seed; the write side sinks a
//! bounded number of bytes and can fold them into an incremental digest so
//! the receiving end of a transfer can be verified without keeping the data
//! around. Each channel is single-owner and never shared across threads.

pub mod read;
pub mod write;

pub use read::SyntheticReadChannel;
pub use write::{OverrunRecord, SyntheticWriteChannel, WriteStatus};

use sha3::{Digest, Sha3_256};
use std::time::Instant;

/// Default backing-buffer size for read channels (1 MiB).
pub const DEFAULT_BUFFER_CAPACITY: u32 = 1 << 20;

/// Byte-range accounting shared by both synthetic channel types.
///
/// Tracks how far a bounded byte-moving channel has progressed toward its
/// target size, plus call-level diagnostics. The state is terminal (no
/// longer open) once the stream boundary has been crossed: EOF on the read
/// side, completion or overrun on the write side.
#[derive(Debug, Clone)]
pub struct RangeState {
    target_size: u64,
    bytes_moved: u64,
    buffer_capacity: u32,
    opened: bool,
    call_count: u64,
    started_at: Option<Instant>,
}

impl RangeState {
    /// Creates accounting state for a channel with the given target size.
    pub(crate) fn new(target_size: u64, buffer_capacity: u32) -> Self {
        Self {
            target_size,
            bytes_moved: 0,
            buffer_capacity,
            opened: true,
            call_count: 0,
            started_at: None,
        }
    }

    /// Total number of bytes this channel will move.
    pub fn target_size(&self) -> u64 {
        self.target_size
    }

    /// Bytes moved so far.
    pub fn bytes_moved(&self) -> u64 {
        self.bytes_moved
    }

    /// Bytes left before the target is reached.
    pub fn remaining(&self) -> u64 {
        self.target_size.saturating_sub(self.bytes_moved)
    }

    /// Capacity of the channel's backing buffer.
    pub fn buffer_capacity(&self) -> u32 {
        self.buffer_capacity
    }

    /// Whether the channel is still open (terminal boundary not reached).
    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Whether all target bytes have been moved.
    pub fn is_complete(&self) -> bool {
        self.bytes_moved >= self.target_size
    }

    /// Number of productive read/write calls made on the channel.
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Time elapsed since the first productive call, if any was made.
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    pub(crate) fn record_call(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        self.call_count += 1;
    }

    pub(crate) fn advance(&mut self, n: u64) {
        debug_assert!(self.bytes_moved + n <= self.target_size);
        self.bytes_moved += n;
    }

    pub(crate) fn close(&mut self) {
        self.opened = false;
    }
}

/// Computes the digest a hashing write channel will report after consuming
/// the full stream of a read channel with the same configuration.
///
/// This is the verification-side recomputation: given only the original
/// seed and channel configuration, the expected content digest can be
/// derived without the data ever existing in full.
pub fn expected_digest(
    seed: i64,
    target_size: u64,
    buffer_capacity: u32,
    cycle_on_wrap: bool,
) -> [u8; 32] {
    let mut source = SyntheticReadChannel::new(seed, target_size, buffer_capacity, cycle_on_wrap);
    let mut hasher = Sha3_256::new();
    let mut buf = vec![0u8; buffer_capacity.min(64 * 1024).max(1) as usize];
    while let Some(n) = source.read(&mut buf) {
        hasher.update(&buf[..n]);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_state_lifecycle() {
        let mut state = RangeState::new(100, 64);
        assert!(state.is_open());
        assert!(!state.is_complete());
        assert_eq!(state.remaining(), 100);
        assert_eq!(state.call_count(), 0);
        assert!(state.elapsed().is_none());

        state.record_call();
        state.advance(60);
        assert_eq!(state.bytes_moved(), 60);
        assert_eq!(state.remaining(), 40);
        assert!(state.elapsed().is_some());

        state.record_call();
        state.advance(40);
        assert!(state.is_complete());
        assert_eq!(state.call_count(), 2);

        state.close();
        assert!(!state.is_open());
    }

    #[test]
    fn test_zero_target_is_immediately_complete() {
        let state = RangeState::new(0, 64);
        assert!(state.is_complete());
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn test_expected_digest_matches_write_side() {
        let seed = 0x5eed;
        let target = 10_000;
        let capacity = 1024;

        let mut source = SyntheticReadChannel::new(seed, target, capacity, true);
        let mut sink = SyntheticWriteChannel::new(target, true);
        let mut buf = [0u8; 333];
        while let Some(n) = source.read(&mut buf) {
            assert_eq!(sink.write(&buf[..n]), Some(n));
        }

        assert_eq!(
            sink.digest().copied(),
            Some(expected_digest(seed, target, capacity, true))
        );
    }
}
