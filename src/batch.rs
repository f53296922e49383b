//! Fixed-size batching over the learner population.
//!
//! Learners are pulled lazily from the enrollment source so a course with tens
//! of thousands of learners never has to be materialized at once. The last
//! batch is simply shorter; there is no filler value to strip.

use log::debug;

/// Default number of learners graded per batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Iterator adapter yielding `Vec`s of at most `size` items
pub struct Batches<I: Iterator> {
    inner: I,
    size: usize,
    produced: usize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<I::Item> = self.inner.by_ref().take(self.size).collect();
        if batch.is_empty() {
            return None;
        }
        self.produced += 1;
        debug!("Produced batch {} with {} entries", self.produced, batch.len());
        Some(batch)
    }
}

/// Group an iterator into batches of `size` (a size of 0 is treated as 1)
pub fn batches<I: IntoIterator>(items: I, size: usize) -> Batches<I::IntoIter> {
    Batches { inner: items.into_iter(), size: size.max(1), produced: 0 }
}
