use core::fmt;

/// Transfer rate over a timed run, in integer arithmetic only.
///
/// `speed` is `total_kb * 1000 / elapsed_ms`. It is displayed with one decimal
/// digit as `speed / 10 . speed % 10` KB/s, and as MB/s via a further division
/// by 1024.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Throughput {
    pub total_kb: u32,
    pub elapsed_ms: u32,
    pub speed: u32,
}

impl Throughput {
    /// A zero duration is counted as 1 ms.
    pub fn new(total_bytes: u32, elapsed_ms: u32) -> Self {
        let total_kb = total_bytes / 1024;
        let elapsed_ms = elapsed_ms.max(1);
        Self { total_kb, elapsed_ms, speed: total_kb * 1000 / elapsed_ms }
    }

    /// (integer part, tenths)
    pub fn kb_per_s(&self) -> (u32, u32) {
        (self.speed / 10, self.speed % 10)
    }

    /// (integer part, tenths)
    pub fn mb_per_s(&self) -> (u32, u32) {
        (self.speed / 1024, ((self.speed % 1024) * 10) / 1024)
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mb, mb_tenth) = self.mb_per_s();
        let (kb, kb_tenth) = self.kb_per_s();
        write!(f, "{}.{} MB/s ({}.{} KB/s)", mb, mb_tenth, kb, kb_tenth)
    }
}
