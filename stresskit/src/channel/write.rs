//! Bounded byte sink with integrity hashing and overrun diagnosis.

use super::RangeState;
use sha3::{Digest, Sha3_256};

/// Maximum number of overrun bytes captured for diagnostics.
pub const OVERRUN_CAPTURE_LIMIT: usize = 2048;

/// Terminal and non-terminal states of a write channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// Accepting bytes; target not yet reached.
    Open,
    /// All target bytes consumed; digest (if enabled) is final.
    Closed,
    /// A write was attempted after the target was reached.
    Overrun,
}

/// Diagnostic record of a write past the channel's target size.
#[derive(Debug, Clone)]
pub struct OverrunRecord {
    /// Number of bytes the offending call tried to write.
    pub attempted: u64,
    /// Prefix of the offending data, at most [`OVERRUN_CAPTURE_LIMIT`] bytes.
    pub captured: Vec<u8>,
}

/// Bounded sink for verifying a byte transfer without storing the data.
///
/// Consumes bytes up to a fixed target size, optionally folding exactly
/// those bytes into an incremental SHA3-256 digest. Extra bytes past the
/// target are a reportable anomaly, not an error: the offending call gets a
/// distinguished end-of-stream return and a bounded prefix of the data is
/// kept for the failure report, so the harness keeps running and records
/// the discrepancy.
///
/// State machine: OPEN until `target_size` bytes have been consumed
/// (CLOSED), or until a write is attempted past the target (OVERRUN).
///
/// # Examples
///
/// ```rust,ignore
/// use stresskit::channel::SyntheticWriteChannel;
///
/// let mut sink = SyntheticWriteChannel::new(1 << 30, true);
/// // feed bytes received from the transport under test:
/// // sink.write(&chunk)
/// // after completion:
/// // assert_eq!(sink.digest(), Some(&expected));
/// ```
pub struct SyntheticWriteChannel {
    range: RangeState,
    hasher: Option<Sha3_256>,
    digest: Option<[u8; 32]>,
    overrun: Option<OverrunRecord>,
}

impl SyntheticWriteChannel {
    /// Creates a sink for `target_size` bytes. When `hash_enabled` is set,
    /// the first `target_size` bytes written are folded into a SHA3-256
    /// digest readable after completion.
    pub fn new(target_size: u64, hash_enabled: bool) -> Self {
        log::debug!(
            "write channel opened: target={} hashing={}",
            target_size,
            hash_enabled
        );

        let mut channel = Self {
            range: RangeState::new(target_size, OVERRUN_CAPTURE_LIMIT as u32),
            hasher: hash_enabled.then(Sha3_256::new),
            digest: None,
            overrun: None,
        };

        // A zero-length target is complete from birth
        if channel.range.is_complete() {
            channel.range.close();
            if let Some(hasher) = channel.hasher.take() {
                channel.digest = Some(hasher.finalize().into());
            }
        }

        channel
    }

    /// Writes `data` into the sink.
    ///
    /// Returns `Some(n)` with the number of bytes consumed, which is less
    /// than `data.len()` when the target is closer than the payload. Returns
    /// `None` once the channel no longer accepts bytes: any call that starts
    /// at or past the target is an overrun, recorded (with a bounded capture
    /// of the attempted data) rather than raised.
    pub fn write(&mut self, data: &[u8]) -> Option<usize> {
        if self.range.is_complete() {
            if self.overrun.is_none() {
                let captured = data[..data.len().min(OVERRUN_CAPTURE_LIMIT)].to_vec();
                log::warn!(
                    "write overrun: target {} already consumed, rejecting {} extra bytes ({} captured)",
                    self.range.target_size(),
                    data.len(),
                    captured.len()
                );
                self.overrun = Some(OverrunRecord {
                    attempted: data.len() as u64,
                    captured,
                });
                self.range.close();
            }
            return None;
        }

        self.range.record_call();

        let n = (self.range.remaining().min(data.len() as u64)) as usize;
        if let Some(hasher) = &mut self.hasher {
            hasher.update(&data[..n]);
        }
        self.range.advance(n as u64);

        if self.range.is_complete() {
            self.range.close();
            if let Some(hasher) = self.hasher.take() {
                self.digest = Some(hasher.finalize().into());
            }
            log::debug!(
                "write channel complete: {} bytes in {} calls",
                self.range.bytes_moved(),
                self.range.call_count()
            );
        }

        Some(n)
    }

    /// Current channel status.
    pub fn status(&self) -> WriteStatus {
        if self.overrun.is_some() {
            WriteStatus::Overrun
        } else if !self.range.is_open() {
            WriteStatus::Closed
        } else {
            WriteStatus::Open
        }
    }

    /// Final content digest. `None` until the channel closes normally, or
    /// when hashing was not enabled.
    pub fn digest(&self) -> Option<&[u8; 32]> {
        self.digest.as_ref()
    }

    /// Final content digest as a lowercase hex string.
    pub fn digest_hex(&self) -> Option<String> {
        self.digest.map(|d| {
            d.iter()
                .map(|b| format!("{:02x}", b))
                .collect::<String>()
        })
    }

    /// Overrun diagnostics, if a write past the target was attempted.
    pub fn overrun(&self) -> Option<&OverrunRecord> {
        self.overrun.as_ref()
    }

    /// Byte-range accounting for this channel.
    pub fn state(&self) -> &RangeState {
        &self.range
    }
}
