//! In-memory stand-ins for the driver, tick source and interrupt mask.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use crate::bus::{Bus, SD_MMC_BLOCK_SIZE};
use crate::card::{CardInfo, CardState, HandleState};
use crate::clock::Clock;
use crate::controller::Controller;
use crate::dummy_input_pin::DummyInputPin;
use crate::error::Error;
use crate::error_bits::ErrorBits;
use crate::interrupt::InterruptControl;

pub struct FakeBus {
    pub blocks: Vec<[u8; SD_MMC_BLOCK_SIZE]>,
    /// State reported once `scripted_states` is drained
    pub state: CardState,
    pub scripted_states: VecDeque<CardState>,
    pub handle: HandleState,
    pub error: ErrorBits,
    pub info: CardInfo,
    pub initialized: bool,
    /// 1-based index of the write call that fails, with its status
    pub fail_write_on: Option<(usize, Error)>,
    pub fail_read_on: Option<(usize, Error)>,
    /// Flip one byte on the next single block read of this block
    pub corrupt_single_read: Option<(u32, usize)>,
    pub state_polls: usize,
    /// Calls to `error_bits`, one per classifier run
    pub error_queries: usize,
    pub reads: usize,
    pub writes: usize,
    pub erased: Vec<(u32, u32)>,
    /// Interrupt mask seen by each transfer, `true` meaning enabled
    pub irq_seen: Vec<bool>,
    irq_probe: Option<Rc<Cell<bool>>>,
}

impl FakeBus {
    pub fn new(number_of_blocks: usize) -> Self {
        let mut blocks = Vec::with_capacity(number_of_blocks);
        for i in 0..number_of_blocks {
            let mut block = [0u8; SD_MMC_BLOCK_SIZE];
            for (j, byte) in block.iter_mut().enumerate() {
                *byte = (i * 7 + j) as u8;
            }
            blocks.push(block);
        }
        Self {
            blocks,
            state: CardState::Transfer,
            scripted_states: VecDeque::new(),
            handle: HandleState::Ready,
            error: ErrorBits::NONE,
            info: CardInfo {
                card_type: 1,
                card_version: 1,
                class: 0x5B5,
                relative_address: 0xAAAA,
                block_count: number_of_blocks as u32,
                block_size: 512,
                logical_block_count: number_of_blocks as u32,
                logical_block_size: 512,
            },
            initialized: false,
            fail_write_on: None,
            fail_read_on: None,
            corrupt_single_read: None,
            state_polls: 0,
            error_queries: 0,
            reads: 0,
            writes: 0,
            erased: Vec::new(),
            irq_seen: Vec::new(),
            irq_probe: None,
        }
    }

    pub fn snapshot(&self, start: u32, count: usize) -> Vec<u8> {
        let start = start as usize;
        self.blocks[start..start + count].iter().flat_map(|b| b.iter().copied()).collect()
    }

    fn record_irq(&mut self) {
        if let Some(probe) = &self.irq_probe {
            self.irq_seen.push(probe.get());
        }
    }

    fn check_range(&mut self, start: u32, count: u32) -> Result<(), Error> {
        if start as usize + count as usize > self.blocks.len() {
            self.error = ErrorBits::DATA_TIMEOUT;
            return Err(Error::Hardware);
        }
        Ok(())
    }
}

impl Bus for FakeBus {
    fn initialize(&mut self) -> Result<(), Error> {
        self.initialized = true;
        Ok(())
    }

    fn handle_state(&mut self) -> HandleState {
        self.handle
    }

    fn card_state(&mut self) -> CardState {
        self.state_polls += 1;
        self.scripted_states.pop_front().unwrap_or(self.state)
    }

    fn error_bits(&mut self) -> ErrorBits {
        self.error_queries += 1;
        self.error
    }

    fn read_blocks(
        &mut self,
        destination: &mut [u8],
        start: u32,
        number_of_blocks: u32,
        _timeout_ms: u32,
    ) -> Result<(), Error> {
        self.record_irq();
        self.reads += 1;
        if let Some((n, error)) = self.fail_read_on {
            if n == self.reads {
                self.error = ErrorBits::RX_OVERRUN;
                return Err(error);
            }
        }
        self.check_range(start, number_of_blocks)?;
        for i in 0..number_of_blocks as usize {
            let offset = i * SD_MMC_BLOCK_SIZE;
            destination[offset..offset + SD_MMC_BLOCK_SIZE]
                .copy_from_slice(&self.blocks[start as usize + i]);
        }
        if number_of_blocks == 1 {
            if let Some((block, offset)) = self.corrupt_single_read {
                if block == start {
                    destination[offset] ^= 0xFF;
                    self.corrupt_single_read = None;
                }
            }
        }
        Ok(())
    }

    fn write_blocks(
        &mut self,
        data: &[u8],
        start: u32,
        number_of_blocks: u32,
        _timeout_ms: u32,
    ) -> Result<(), Error> {
        self.record_irq();
        self.writes += 1;
        if let Some((n, error)) = self.fail_write_on {
            if n == self.writes {
                self.error = ErrorBits::TX_UNDERRUN;
                return Err(error);
            }
        }
        self.check_range(start, number_of_blocks)?;
        for i in 0..number_of_blocks as usize {
            let offset = i * SD_MMC_BLOCK_SIZE;
            self.blocks[start as usize + i]
                .copy_from_slice(&data[offset..offset + SD_MMC_BLOCK_SIZE]);
        }
        Ok(())
    }

    fn erase_blocks(&mut self, start: u32, end: u32) -> Result<(), Error> {
        self.check_range(start, end - start + 1)?;
        for block in &mut self.blocks[start as usize..=end as usize] {
            *block = [0xFF; SD_MMC_BLOCK_SIZE];
        }
        self.erased.push((start, end));
        Ok(())
    }

    fn card_info(&mut self) -> Result<CardInfo, Error> {
        Ok(self.info)
    }
}

/// Tick source that advances by `step` on every read.
pub struct FakeClock {
    now: Cell<u32>,
    step: u32,
}

impl FakeClock {
    pub fn starting_at(now: u32, step: u32) -> Self {
        Self { now: Cell::new(now), step }
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.step));
        now
    }
}

pub struct FakeIrq {
    enabled: Rc<Cell<bool>>,
    disables: Cell<usize>,
    enables: Cell<usize>,
}

impl Default for FakeIrq {
    fn default() -> Self {
        Self { enabled: Rc::new(Cell::new(true)), disables: Cell::new(0), enables: Cell::new(0) }
    }
}

impl FakeIrq {
    pub fn enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn disable_count(&self) -> usize {
        self.disables.get()
    }

    pub fn enable_count(&self) -> usize {
        self.enables.get()
    }

    pub fn probe(&self) -> Rc<Cell<bool>> {
        self.enabled.clone()
    }
}

impl InterruptControl for FakeIrq {
    fn disable(&self) {
        self.disables.set(self.disables.get() + 1);
        self.enabled.set(false);
    }

    fn enable(&self) {
        self.enables.set(self.enables.get() + 1);
        self.enabled.set(true);
    }
}

pub type FakeController = Controller<FakeBus, FakeClock, FakeIrq, DummyInputPin>;

/// Controller over `bus` with a clock that starts close to wrapping.
pub fn controller(mut bus: FakeBus) -> FakeController {
    let irq = FakeIrq::default();
    bus.irq_probe = Some(irq.probe());
    Controller::new(bus, FakeClock::starting_at(u32::MAX - 100, 1), irq)
}
