/// Monotonic millisecond tick source.
///
/// The counter is free running and allowed to wrap; all elapsed time is
/// computed with wrapping subtraction.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<F: Fn() -> u32> Clock for F {
    fn now_ms(&self) -> u32 {
        self()
    }
}

/// Tick checkpoint taken at the start of a wait.
#[derive(Copy, Clone, Debug)]
pub struct Deadline {
    watch: Stopwatch,
    timeout_ms: u32,
}

impl Deadline {
    pub fn start<C: Clock>(clock: &C, timeout_ms: u32) -> Self {
        Self { watch: Stopwatch::start(clock), timeout_ms }
    }

    pub fn elapsed<C: Clock>(&self, clock: &C) -> u32 {
        self.watch.elapsed(clock)
    }

    pub fn expired<C: Clock>(&self, clock: &C) -> bool {
        self.elapsed(clock) >= self.timeout_ms
    }
}

/// Elapsed time since a tick checkpoint
#[derive(Copy, Clone, Debug)]
pub struct Stopwatch {
    start: u32,
}

impl Stopwatch {
    pub fn start<C: Clock>(clock: &C) -> Self {
        Self { start: clock.now_ms() }
    }

    pub fn elapsed<C: Clock>(&self, clock: &C) -> u32 {
        clock.now_ms().wrapping_sub(self.start)
    }
}
