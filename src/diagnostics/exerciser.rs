use embedded_hal::digital::v2::InputPin;

use crate::block::{Block, BlockBuffer};
use crate::bus::{Bus, SD_MMC_BLOCK_SIZE};
use crate::card::CardState;
use crate::clock::{Clock, Stopwatch};
use crate::controller::Controller;
use crate::error::Error;
use crate::interrupt::InterruptControl;

use super::throughput::Throughput;

/// Largest test range, bounded by the backup buffer
pub const MAX_TEST_BLOCKS: usize = 256;
/// Smallest test range that gives a meaningful throughput figure
pub const MIN_TEST_BLOCKS: usize = 32;
/// Added to every backed-up byte to form the test pattern
pub const TEST_PATTERN_OFFSET: u8 = 0x0A;
/// Back-to-back transfers per timed phase
pub const TEST_REPETITIONS: u32 = 4;
/// Settling waits after a timed phase use this multiple of the base timeout
pub const SETTLE_TIMEOUT_FACTOR: u32 = 15;
/// Mismatches logged individually; the rest are only counted
pub const MAX_REPORTED_MISMATCHES: u32 = 5;

/// Result of a passing test run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Measurement {
    pub write: Throughput,
    /// Derived from the backup reads, the verify pass is not timed
    pub read: Throughput,
    pub restore_ms: u32,
}

/// Non-destructive read/write test over blocks `start..start + N`.
///
/// The original content is backed up first and written back on every path
/// that has modified the card. The exerciser holds `N` blocks of backup, so
/// large instances belong in a `static`.
pub struct Exerciser<const N: usize> {
    start: u32,
    timeout_ms: u32,
    backup: BlockBuffer<N>,
    scratch: Block,
}

impl<const N: usize> Exerciser<N> {
    const FITS_BUFFER: () =
        assert!(N > 0 && N <= MAX_TEST_BLOCKS, "test range must be between 1 and 256 blocks");
    const MEASURABLE: () = assert!(
        N >= MIN_TEST_BLOCKS,
        "less than 32 test blocks is too little data to reflect card throughput"
    );

    /// `timeout_ms` is the base timeout of every transfer
    pub const fn new(start: u32, timeout_ms: u32) -> Self {
        let () = Self::FITS_BUFFER;
        let () = Self::MEASURABLE;
        Self::build(start, timeout_ms)
    }

    /// Like [`new`](Self::new) but accepts ranges below `MIN_TEST_BLOCKS`.
    /// Throughput figures of such runs are not meaningful.
    pub const fn new_small(start: u32, timeout_ms: u32) -> Self {
        let () = Self::FITS_BUFFER;
        Self::build(start, timeout_ms)
    }

    const fn build(start: u32, timeout_ms: u32) -> Self {
        Self { start, timeout_ms, backup: BlockBuffer::new(), scratch: Block::new() }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last block of the range, `None` if the range runs past the block address space
    fn end(&self) -> Option<u32> {
        self.start.checked_add(N as u32 - 1)
    }

    fn shift_pattern(&mut self, forward: bool) {
        for byte in self.backup.as_bytes_mut() {
            *byte = if forward {
                byte.wrapping_add(TEST_PATTERN_OFFSET)
            } else {
                byte.wrapping_sub(TEST_PATTERN_OFFSET)
            };
        }
    }

    /// Backup, write the shifted pattern, verify it, restore.
    ///
    /// The returned status is the outcome of the test itself. A failed
    /// restore is logged; it is only returned when the test had passed.
    pub fn run<BUS, CLK, IRQ, DETECT>(
        &mut self,
        sd: &mut Controller<BUS, CLK, IRQ, DETECT>,
    ) -> Result<Measurement, Error>
    where
        BUS: Bus,
        CLK: Clock,
        IRQ: InterruptControl,
        DETECT: InputPin,
    {
        log::info!("========== SD card polling test start ==========");
        if N < MIN_TEST_BLOCKS {
            log::warn!(
                "[SD] [WARN] only {} test blocks, throughput figures are not representative",
                N
            );
        }

        let end = match self.end() {
            Some(end) => end,
            None => {
                log::error!("[SD] [FAIL] test range starting at {} overflows", self.start);
                return Err(Error::InvalidArgument);
            }
        };

        log::info!("[SD] checking SD card ready state");
        let state = sd.state();
        if state != CardState::Transfer {
            log::error!("[SD] [FAIL] SD card not ready, state: {:?}", state);
            return Err(Error::Hardware);
        }

        let read_ms = self.take_backup(sd, end)?;

        log::info!("[SD] preparing test data (backup + 0x{:02X})", TEST_PATTERN_OFFSET);
        self.shift_pattern(true);

        let outcome = self.write_and_verify(sd, read_ms);
        let restored = self.restore(sd);
        log::info!("========== SD card polling test end ==========");

        let (write, read) = outcome?;
        Ok(Measurement { write, read, restore_ms: restored? })
    }

    fn settle_timeout(&self) -> u32 {
        self.timeout_ms.saturating_mul(SETTLE_TIMEOUT_FACTOR)
    }

    fn total_bytes(&self) -> u32 {
        (N * SD_MMC_BLOCK_SIZE) as u32 * TEST_REPETITIONS
    }

    /// Returns the time taken, reused as the read throughput baseline
    fn take_backup<BUS, CLK, IRQ, DETECT>(
        &mut self,
        sd: &mut Controller<BUS, CLK, IRQ, DETECT>,
        end: u32,
    ) -> Result<u32, Error>
    where
        BUS: Bus,
        CLK: Clock,
        IRQ: InterruptControl,
        DETECT: InputPin,
    {
        log::info!("[SD] backing up original data of blocks {}-{}", self.start, end);
        let watch = Stopwatch::start(&sd.clock);
        for _ in 0..TEST_REPETITIONS {
            if let Err(error) =
                sd.read_blocks(self.backup.as_bytes_mut(), self.start, N as u32, self.timeout_ms)
            {
                log::error!("[SD] [FAIL] backup read failed: {:?}", error);
                return Err(error);
            }
        }
        sd.wait_ready(self.settle_timeout())?;
        let elapsed = watch.elapsed(&sd.clock);
        log::info!("[SD] [PASS] backup done ({}x), took {} ms", TEST_REPETITIONS, elapsed);
        Ok(elapsed)
    }

    fn write_and_verify<BUS, CLK, IRQ, DETECT>(
        &mut self,
        sd: &mut Controller<BUS, CLK, IRQ, DETECT>,
        read_ms: u32,
    ) -> Result<(Throughput, Throughput), Error>
    where
        BUS: Bus,
        CLK: Clock,
        IRQ: InterruptControl,
        DETECT: InputPin,
    {
        log::info!("[SD] writing test data (consecutive multi-block writes)");
        let watch = Stopwatch::start(&sd.clock);
        for pass in 1..=TEST_REPETITIONS {
            if let Err(error) =
                sd.write_blocks(self.backup.as_bytes(), self.start, N as u32, self.timeout_ms)
            {
                log::error!("[SD] [FAIL] multi-block write {} failed: {:?}", pass, error);
                return Err(error);
            }
        }
        if let Err(error) = sd.wait_ready(self.settle_timeout()) {
            log::error!("[SD] [FAIL] SD card did not become ready after writing");
            return Err(error);
        }
        let write_ms = watch.elapsed(&sd.clock);
        log::info!("[SD] [PASS] write done ({}x), took {} ms", TEST_REPETITIONS, write_ms);

        let mismatches = self.verify(sd)?;
        if mismatches != 0 {
            log::error!("[SD] [FAIL] verification failed, {} mismatches", mismatches);
            return Err(Error::Hardware);
        }
        log::info!("[SD] [PASS] verification passed");

        let write = Throughput::new(self.total_bytes(), write_ms);
        let read = Throughput::new(self.total_bytes(), read_ms);
        log::info!("[SD] write speed: {}", write);
        log::info!("[SD] read speed: {}", read);
        log::info!(
            "[SD] total: {} KB (write {} ms, read {} ms)",
            write.total_kb,
            write.elapsed_ms,
            read.elapsed_ms
        );
        Ok((write, read))
    }

    /// Read the range back one block at a time and compare it with the
    /// backup buffer. Every differing byte is counted, the first
    /// `MAX_REPORTED_MISMATCHES` are logged.
    fn verify<BUS, CLK, IRQ, DETECT>(
        &mut self,
        sd: &mut Controller<BUS, CLK, IRQ, DETECT>,
    ) -> Result<u32, Error>
    where
        BUS: Bus,
        CLK: Clock,
        IRQ: InterruptControl,
        DETECT: InputPin,
    {
        log::info!("[SD] reading back and verifying test data");
        let mut mismatches = 0u32;
        for i in 0..N {
            let block = self.start.checked_add(i as u32).ok_or(Error::InvalidArgument)?;
            sd.read_blocks(&mut self.scratch.0, block, 1, self.timeout_ms)?;
            if let Err(error) = sd.wait_ready(self.timeout_ms) {
                log::error!("[SD] [FAIL] read of block {} timed out", block);
                sd.explain("read timeout");
                return Err(error);
            }

            let expected = self.backup.block(i);
            for (offset, (&actual, &wanted)) in self.scratch.iter().zip(expected.iter()).enumerate() {
                if actual != wanted {
                    mismatches += 1;
                    if mismatches <= MAX_REPORTED_MISMATCHES {
                        log::error!(
                            "[SD] [FAIL] block {} offset {} mismatch: expected 0x{:02X}, got 0x{:02X}",
                            block,
                            offset,
                            wanted,
                            actual
                        );
                    }
                }
            }
        }
        Ok(mismatches)
    }

    fn restore<BUS, CLK, IRQ, DETECT>(
        &mut self,
        sd: &mut Controller<BUS, CLK, IRQ, DETECT>,
    ) -> Result<u32, Error>
    where
        BUS: Bus,
        CLK: Clock,
        IRQ: InterruptControl,
        DETECT: InputPin,
    {
        log::info!("[SD] restoring original data (backup - 0x{:02X})", TEST_PATTERN_OFFSET);
        self.shift_pattern(false);

        let watch = Stopwatch::start(&sd.clock);
        if let Err(error) =
            sd.write_blocks(self.backup.as_bytes(), self.start, N as u32, self.timeout_ms)
        {
            log::error!("[SD] [FAIL] restoring original data failed: {:?}", error);
            return Err(error);
        }
        if let Err(error) = sd.wait_ready(self.settle_timeout()) {
            log::error!("[SD] [FAIL] SD card did not become ready after restoring");
            return Err(error);
        }
        let elapsed = watch.elapsed(&sd.clock);
        log::info!("[SD] [PASS] original data restored, took {} ms", elapsed);
        Ok(elapsed)
    }
}

impl<BUS: Bus, CLK: Clock, IRQ: InterruptControl, DETECT: InputPin>
    Controller<BUS, CLK, IRQ, DETECT>
{
    /// Run the non-destructive throughput test of `exerciser` on this card
    pub fn run_measurement<const N: usize>(
        &mut self,
        exerciser: &mut Exerciser<N>,
    ) -> Result<Measurement, Error> {
        exerciser.run(self)
    }
}
