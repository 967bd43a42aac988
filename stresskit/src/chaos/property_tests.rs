//! Property-Based Tests for the synthetic channels and the driver
//!
//! Verified properties:
//!
//! 1. **Chunk independence**: read-call sizes never change stream content.
//! 2. **Hash equivalence**: a hashing sink fed any re-chunking of a source's
//!    output reports the digest of the byte sequence itself.
//! 3. **Overrun safety**: writing past the target never panics and always
//!    closes the channel at exactly the target size.
//! 4. **Aggregation arithmetic**: the driver's iteration total is the sum
//!    of its workers' totals for an always-succeeding task.
//!
//! All generated inputs are seeded by proptest and shrinkable; channel
//! streams themselves are reproducible from the generated seeds.

#[allow(unused_imports)]
use crate::channel::{expected_digest, SyntheticReadChannel, SyntheticWriteChannel, WriteStatus};
#[allow(unused_imports)]
use proptest::prelude::*;

/// Reads the whole stream using the given rotation of chunk sizes.
#[allow(dead_code)]
fn drain_with_chunks(channel: &mut SyntheticReadChannel, chunks: &[usize]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    loop {
        let chunk = chunks[i % chunks.len()].max(1);
        i += 1;
        let mut buf = vec![0u8; chunk];
        match channel.read(&mut buf) {
            Some(n) => out.extend_from_slice(&buf[..n]),
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::{IterationOutcome, TerminationPolicy};
    use crate::tasks::FnTask;
    use proptest::test_runner::TestCaseError;

    proptest! {
        /// Stream content is independent of read-call chunking.
        #[test]
        fn prop_read_chunking_invariance(
            seed in any::<i64>(),
            target in 0u64..8192,
            capacity in 1u32..512,
            cyclic in any::<bool>(),
            chunks in prop::collection::vec(1usize..1024, 1..8),
        ) {
            let mut reference =
                SyntheticReadChannel::new(seed, target, capacity, cyclic);
            let expected = drain_with_chunks(&mut reference, &[target.max(1) as usize]);

            let mut chunked = SyntheticReadChannel::new(seed, target, capacity, cyclic);
            let actual = drain_with_chunks(&mut chunked, &chunks);

            prop_assert_eq!(actual.len() as u64, target);
            prop_assert_eq!(actual, expected);
        }

        /// A hashing sink fed any re-chunking of the source output reports
        /// the digest of the bytes themselves.
        #[test]
        fn prop_hash_matches_any_chunking(
            seed in any::<i64>(),
            target in 1u64..4096,
            capacity in 1u32..256,
            cyclic in any::<bool>(),
            read_chunks in prop::collection::vec(1usize..512, 1..6),
            write_chunks in prop::collection::vec(1usize..512, 1..6),
        ) {
            let mut source = SyntheticReadChannel::new(seed, target, capacity, cyclic);
            let bytes = drain_with_chunks(&mut source, &read_chunks);

            let mut sink = SyntheticWriteChannel::new(target, true);
            let mut pos = 0;
            let mut i = 0;
            while pos < bytes.len() {
                let chunk = write_chunks[i % write_chunks.len()];
                i += 1;
                let end = (pos + chunk).min(bytes.len());
                match sink.write(&bytes[pos..end]) {
                    Some(n) => pos += n,
                    None => break,
                }
            }

            prop_assert_eq!(sink.status(), WriteStatus::Closed);
            prop_assert_eq!(
                sink.digest().copied(),
                Some(expected_digest(seed, target, capacity, cyclic))
            );
        }

        /// Overrun never panics; the channel closes at exactly the target.
        #[test]
        fn prop_overrun_closes_at_target(
            target in 0u64..2048,
            extra in 1usize..4096,
        ) {
            let mut sink = SyntheticWriteChannel::new(target, true);

            let payload = vec![0xa5u8; target as usize];
            if !payload.is_empty() {
                prop_assert_eq!(sink.write(&payload), Some(payload.len()));
            }

            prop_assert_eq!(sink.write(&vec![0x5au8; extra]), None);
            prop_assert_eq!(sink.status(), WriteStatus::Overrun);
            prop_assert_eq!(sink.state().bytes_moved(), target);
            prop_assert_eq!(sink.overrun().unwrap().attempted, extra as u64);
        }

        /// Driver iteration totals are the sum over workers.
        #[test]
        fn prop_driver_sums_iterations(
            workers in 1u32..5,
            iterations in 0u64..6,
        ) {
            tokio::runtime::Runtime::new().unwrap().block_on(async {
                let task = std::sync::Arc::new(FnTask::new(|_| {
                    Ok(IterationOutcome::pass().with_bytes(1))
                }));
                let aggregate = crate::load::run_load(
                    task,
                    TerminationPolicy::ByIterationCount(iterations),
                    workers,
                )
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

                prop_assert!(aggregate.passed);
                prop_assert_eq!(aggregate.iterations, workers as u64 * iterations);
                Ok(())
            })?;
        }
    }
}
