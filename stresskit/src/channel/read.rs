//! Reproducible pseudo-random byte source.
//!
//! A [`SyntheticReadChannel`] emits a stream of `target_size` pseudo-random
//! bytes while only ever holding `buffer_capacity` bytes in memory. The
//! stream content is fully determined by the construction parameters, and
//! is independent of how callers chunk their read calls, so a receiver that
//! knows the seed and configuration can recompute the exact expected bytes.

use super::RangeState;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Bounded source of reproducible pseudo-random bytes.
///
/// The channel repeatedly serves slices of a fixed-size seeded buffer. In
/// the cyclic configuration the same buffer content repeats every
/// `buffer_capacity` bytes; with `cycle_on_wrap` set the buffer is
/// regenerated from `seed + generation` each time the stream position wraps,
/// so the long stream pattern never repeats while staying reproducible from
/// the `(seed, generation)` pair.
///
/// State machine: OPEN until all `target_size` bytes have been read, then
/// terminal (EOF). A channel is single-owner; it is never shared across
/// threads.
///
/// # Examples
///
/// ```rust,ignore
/// use stresskit::channel::SyntheticReadChannel;
///
/// let mut source = SyntheticReadChannel::new(42, 1 << 30, 1 << 20, true);
/// let mut buf = [0u8; 8192];
/// while let Some(n) = source.read(&mut buf) {
///     // feed buf[..n] to the transport under test
/// }
/// ```
pub struct SyntheticReadChannel {
    range: RangeState,
    seed: i64,
    generation: u64,
    cycle_on_wrap: bool,
    buffer: Vec<u8>,
}

impl SyntheticReadChannel {
    /// Creates a source that will produce `target_size` bytes derived from
    /// `seed`, holding `buffer_capacity` bytes in memory.
    ///
    /// # Panics
    ///
    /// Panics if `buffer_capacity` is zero.
    pub fn new(seed: i64, target_size: u64, buffer_capacity: u32, cycle_on_wrap: bool) -> Self {
        assert!(buffer_capacity > 0, "buffer capacity must be non-zero");

        let mut channel = Self {
            range: RangeState::new(target_size, buffer_capacity),
            seed,
            generation: 0,
            cycle_on_wrap,
            buffer: vec![0u8; buffer_capacity as usize],
        };
        channel.refill();

        log::debug!(
            "read channel opened: target={} capacity={} seed={:#x} cyclic={}",
            target_size,
            buffer_capacity,
            seed,
            cycle_on_wrap
        );

        channel
    }

    /// Reads up to `dst.len()` bytes into `dst`.
    ///
    /// Returns `Some(n)` with the number of bytes copied, or `None` once
    /// the target size has been produced (EOF; the channel is terminal and
    /// all further reads return `None`). An empty `dst` yields `Some(0)`
    /// without side effects.
    ///
    /// A single call never crosses a buffer-cycle boundary, so `n` can be
    /// smaller than `dst.len()` even before the end of the stream.
    pub fn read(&mut self, dst: &mut [u8]) -> Option<usize> {
        if dst.is_empty() {
            return Some(0);
        }

        if self.range.is_complete() {
            if self.range.is_open() {
                self.range.close();
                log::debug!(
                    "read channel EOF: {} bytes in {} calls",
                    self.range.bytes_moved(),
                    self.range.call_count()
                );
            }
            return None;
        }

        self.range.record_call();

        let capacity = self.range.buffer_capacity() as u64;
        let offset = (self.range.bytes_moved() % capacity) as usize;
        let cycle_left = self.buffer.len() - offset;
        let n = self
            .range
            .remaining()
            .min(cycle_left as u64)
            .min(dst.len() as u64) as usize;

        dst[..n].copy_from_slice(&self.buffer[offset..offset + n]);
        self.range.advance(n as u64);

        // Regenerate the buffer when the stream position wraps. Skipped at
        // completion: the channel is terminal and the refill would never be
        // observed.
        if self.cycle_on_wrap
            && !self.range.is_complete()
            && self.range.bytes_moved() % capacity == 0
        {
            self.generation += 1;
            self.refill();
        }

        Some(n)
    }

    /// The seed this channel was constructed with.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Current buffer generation: 0 until the first wrap, then incremented
    /// once per wrap when `cycle_on_wrap` is set.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Byte-range accounting for this channel.
    pub fn state(&self) -> &RangeState {
        &self.range
    }

    fn refill(&mut self) {
        let cycle_seed = self.seed.wrapping_add(self.generation as i64) as u64;
        let mut rng = ChaCha8Rng::seed_from_u64(cycle_seed);
        rng.fill_bytes(&mut self.buffer);
    }
}

impl std::io::Read for SyntheticReadChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Ok(SyntheticReadChannel::read(self, buf).unwrap_or(0))
    }
}
