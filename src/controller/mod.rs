mod controller;
mod transfer;

use embedded_hal::digital::v2::InputPin;

use crate::bus::Bus;
use crate::card::{CardInfo, CardState, HandleState};
use crate::clock::{Clock, Deadline};
use crate::error::Error;
use crate::interrupt::InterruptControl;
use crate::DEFAULT_TIMEOUT_MS;

pub use controller::Controller;

impl<BUS: Bus, CLK: Clock, IRQ: InterruptControl, DETECT: InputPin>
    Controller<BUS, CLK, IRQ, DETECT>
{
    /// Bring up the driver and make sure the card ends up in transfer state.
    /// The driver handle gets `DEFAULT_TIMEOUT_MS` to become ready.
    pub fn init(&mut self) -> Result<(), Error> {
        diag!(info, "[SD] initializing SD card");
        if !self.card_present()? {
            diag!(error, "[SD] [FAIL] no card in slot");
            return Err(Error::Hardware);
        }
        self.bus.initialize()?;
        diag!(
            info,
            "[SD] handle state = {:?}, error code = 0x{:08X}",
            self.bus.handle_state(),
            self.bus.error_bits().bits()
        );

        let deadline = Deadline::start(&self.clock, DEFAULT_TIMEOUT_MS);
        let mut handle = self.bus.handle_state();
        while handle != HandleState::Ready && !deadline.expired(&self.clock) {
            handle = self.bus.handle_state();
        }
        if handle != HandleState::Ready {
            diag!(error, "[SD] [FAIL] SD card not ready, handle state: {:?}", handle);
            return Err(Error::Hardware);
        }

        let state = self.bus.card_state();
        if state != CardState::Transfer {
            diag!(error, "[SD] card in unexpected state: {:?}", state);
            return Err(Error::Hardware);
        }

        #[cfg(feature = "diagnostics")]
        self.report_capacity();
        Ok(())
    }

    #[cfg(feature = "diagnostics")]
    fn report_capacity(&mut self) {
        match self.card_info() {
            Ok(info) => {
                let (gb, gb_tenth) = info.capacity_gb();
                log::info!(
                    "[SD] [PASS] SD card initialized, capacity: {} MB ({}.{} GB)",
                    info.capacity_mb(),
                    gb,
                    gb_tenth
                );
                log::info!(
                    "[SD] block size: {}, block count: {}",
                    info.logical_block_size,
                    info.logical_block_count
                );
            }
            Err(_) => log::warn!("[SD] [WARN] could not read card info"),
        }
    }

    /// Classify the current card state
    pub fn check(&mut self) -> Result<(), Error> {
        match self.bus.card_state() {
            CardState::Transfer | CardState::Ready => Ok(()),
            state if state.is_busy() => Err(Error::Busy),
            CardState::Disconnected => Err(Error::TimedOut),
            CardState::Error => {
                diag!(error, "[SD] card in error state");
                #[cfg(feature = "diagnostics")]
                self.explain("check");
                Err(Error::Hardware)
            }
            _ => Err(Error::Hardware),
        }
    }

    /// Current card state, read from the card
    pub fn state(&mut self) -> CardState {
        self.bus.card_state()
    }

    /// Busy-wait until the card reports transfer state.
    /// The state is polled before the deadline is checked, so a zero timeout
    /// still succeeds on a ready card.
    pub fn wait_ready(&mut self, timeout_ms: u32) -> Result<(), Error> {
        let deadline = Deadline::start(&self.clock, timeout_ms);
        loop {
            if self.bus.card_state() == CardState::Transfer {
                return Ok(());
            }
            if deadline.expired(&self.clock) {
                diag!(error, "[SD] [FAIL] timed out waiting for SD card ready ({} ms)", timeout_ms);
                return Err(Error::TimedOut);
            }
        }
    }

    pub fn card_info(&mut self) -> Result<CardInfo, Error> {
        self.bus.card_info().map_err(|error| {
            diag!(error, "[SD] [FAIL] reading card info failed: {:?}", error);
            error
        })
    }
}
