//! Error decoding and the non-destructive throughput test.

mod classifier;
mod exerciser;
mod throughput;

pub use classifier::{classify, Classification, ErrorEntry, ERROR_TABLE};
pub use exerciser::{
    Exerciser, Measurement, MAX_REPORTED_MISMATCHES, MAX_TEST_BLOCKS, MIN_TEST_BLOCKS,
    SETTLE_TIMEOUT_FACTOR, TEST_PATTERN_OFFSET, TEST_REPETITIONS,
};
pub use throughput::Throughput;
