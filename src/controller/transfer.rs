use embedded_hal::digital::v2::InputPin;

use crate::bus::Bus;
use crate::clock::Clock;
use crate::error::Error;
use crate::interrupt::{InterruptControl, InterruptFree};
use crate::transaction::TransferRequest;

use super::controller::Controller;

impl<BUS: Bus, CLK: Clock, IRQ: InterruptControl, DETECT: InputPin>
    Controller<BUS, CLK, IRQ, DETECT>
{
    /// Multi-block write in polling mode.
    ///
    /// Interrupts are masked for the duration of the driver call only, so the
    /// FIFO cannot underrun. The driver status is returned as is.
    /// # Arguments
    ///  * `data` - Word aligned buffer holding at least `number_of_blocks` blocks
    ///  * `start` - First block address
    ///  * `number_of_blocks` - Number of blocks to write
    ///  * `timeout_ms` - Bound for the readiness wait and for the transfer
    pub fn write_blocks(
        &mut self,
        data: &[u8],
        start: u32,
        number_of_blocks: u32,
        timeout_ms: u32,
    ) -> Result<(), Error> {
        let request = TransferRequest::new(start, number_of_blocks, timeout_ms);
        let len = request.validate(data)?;
        self.wait_ready(timeout_ms)?;

        let result = {
            let _irq = InterruptFree::new(&self.irq);
            self.bus.write_blocks(&data[..len], start, number_of_blocks, timeout_ms)
        };
        if let Err(error) = result {
            diag!(error, "[SD] [FAIL] multi-block write failed, status: {:?}", error);
            #[cfg(feature = "diagnostics")]
            self.explain("write");
        }
        result
    }

    /// Multi-block read in polling mode, see [`write_blocks`](Self::write_blocks)
    pub fn read_blocks(
        &mut self,
        destination: &mut [u8],
        start: u32,
        number_of_blocks: u32,
        timeout_ms: u32,
    ) -> Result<(), Error> {
        let request = TransferRequest::new(start, number_of_blocks, timeout_ms);
        let len = request.validate(destination)?;
        self.wait_ready(timeout_ms)?;

        let result = {
            let _irq = InterruptFree::new(&self.irq);
            self.bus.read_blocks(
                &mut destination[..len],
                start,
                number_of_blocks,
                timeout_ms,
            )
        };
        if let Err(error) = result {
            diag!(error, "[SD] [FAIL] multi-block read failed, status: {:?}", error);
            #[cfg(feature = "diagnostics")]
            self.explain("read");
        }
        result
    }

    /// Erase `number_of_blocks` blocks starting at `start`
    pub fn erase_blocks(
        &mut self,
        start: u32,
        number_of_blocks: u32,
        timeout_ms: u32,
    ) -> Result<(), Error> {
        if number_of_blocks == 0 {
            diag!(error, "[SD] [FAIL] invalid argument: number of blocks is 0");
            return Err(Error::InvalidArgument);
        }
        let end = start.checked_add(number_of_blocks - 1).ok_or(Error::InvalidArgument)?;
        self.wait_ready(timeout_ms)?;
        self.bus.erase_blocks(start, end).map_err(|error| {
            diag!(error, "[SD] [FAIL] erase of blocks {}-{} failed: {:?}", start, end, error);
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::block::BlockBuffer;
    use crate::bus::SD_MMC_BLOCK_SIZE;
    use crate::card::CardState;
    use crate::error::Error;
    use crate::fake::{self, FakeBus};
    use crate::DEFAULT_TIMEOUT_MS;

    #[test]
    fn write_then_read_round_trip() {
        let mut sd = fake::controller(FakeBus::new(32));
        let mut data = BlockBuffer::<5>::new();
        for (i, byte) in data.as_bytes_mut().iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
        sd.write_blocks(data.as_bytes(), 10, 5, DEFAULT_TIMEOUT_MS).unwrap();

        let mut back = BlockBuffer::<5>::new();
        sd.read_blocks(back.as_bytes_mut(), 10, 5, DEFAULT_TIMEOUT_MS).unwrap();
        assert_eq!(back.as_bytes(), data.as_bytes());
    }

    #[test]
    fn rejects_invalid_arguments_without_touching_hardware() {
        let mut sd = fake::controller(FakeBus::new(8));
        let data = BlockBuffer::<5>::new();
        assert_eq!(sd.write_blocks(&[], 0, 5, 1000), Err(Error::InvalidArgument));
        assert_eq!(sd.write_blocks(data.as_bytes(), 0, 0, 1000), Err(Error::InvalidArgument));
        let mut small = BlockBuffer::<1>::new();
        assert_eq!(sd.read_blocks(small.as_bytes_mut(), 0, 2, 1000), Err(Error::InvalidArgument));
        assert_eq!(
            sd.write_blocks(data.as_bytes(), 0, u32::MAX, 1000),
            Err(Error::InvalidArgument)
        );
        assert_eq!(sd.bus.state_polls, 0);
        assert_eq!(sd.bus.writes + sd.bus.reads, 0);
    }

    #[test]
    fn interrupts_masked_only_during_transfer() {
        let mut sd = fake::controller(FakeBus::new(8));
        let mut data = BlockBuffer::<2>::new();
        sd.write_blocks(data.as_bytes(), 0, 2, 1000).unwrap();
        sd.read_blocks(data.as_bytes_mut(), 0, 2, 1000).unwrap();
        assert_eq!(sd.bus.irq_seen, vec![false, false]);
        assert!(sd.irq.enabled());
        assert_eq!(sd.irq.disable_count(), 2);
        assert_eq!(sd.irq.enable_count(), 2);
    }

    #[test]
    fn interrupts_reenabled_after_driver_failure() {
        let mut bus = FakeBus::new(8);
        bus.fail_write_on = Some((1, Error::Busy));
        bus.fail_read_on = Some((1, Error::TimedOut));
        let mut sd = fake::controller(bus);
        let mut data = BlockBuffer::<2>::new();

        assert_eq!(sd.write_blocks(data.as_bytes(), 0, 2, 1000), Err(Error::Busy));
        assert!(sd.irq.enabled());
        assert_eq!(sd.read_blocks(data.as_bytes_mut(), 0, 2, 1000), Err(Error::TimedOut));
        assert!(sd.irq.enabled());
        assert_eq!(sd.irq.disable_count(), sd.irq.enable_count());
    }

    #[test]
    fn driver_hardware_error_passes_through() {
        let mut sd = fake::controller(FakeBus::new(4));
        let data = BlockBuffer::<2>::new();
        // blocks 3 and 4 run past the end of the fake card
        assert_eq!(sd.write_blocks(data.as_bytes(), 3, 2, 1000), Err(Error::Hardware));
        assert!(sd.irq.enabled());
    }

    #[test]
    fn readiness_timeout_skips_transfer() {
        let mut bus = FakeBus::new(4);
        bus.state = CardState::Programming;
        let mut sd = fake::controller(bus);
        let data = BlockBuffer::<1>::new();
        assert_eq!(sd.write_blocks(data.as_bytes(), 0, 1, 20), Err(Error::TimedOut));
        assert_eq!(sd.bus.writes, 0);
        assert_eq!(sd.irq.disable_count(), 0);
    }

    #[test]
    fn oversized_buffer_transfers_requested_blocks_only() {
        let mut sd = fake::controller(FakeBus::new(4));
        let before = sd.bus.snapshot(1, 1);
        let data = BlockBuffer::<2>::new();
        sd.write_blocks(data.as_bytes(), 0, 1, 1000).unwrap();
        assert_eq!(sd.bus.snapshot(0, 1), vec![0u8; SD_MMC_BLOCK_SIZE]);
        assert_eq!(sd.bus.snapshot(1, 1), before);
    }

    #[test]
    fn erase_covers_inclusive_range() {
        let mut sd = fake::controller(FakeBus::new(8));
        sd.erase_blocks(2, 3, 1000).unwrap();
        assert_eq!(sd.bus.erased, vec![(2, 4)]);
        assert_eq!(sd.erase_blocks(0, 0, 1000), Err(Error::InvalidArgument));
        assert_eq!(sd.erase_blocks(u32::MAX, 2, 1000), Err(Error::InvalidArgument));
    }
}
