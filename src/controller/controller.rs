use embedded_hal::digital::v2::InputPin;

use crate::bus::Bus;
use crate::clock::Clock;
use crate::dummy_input_pin::DummyInputPin;
use crate::error::Error;
use crate::interrupt::InterruptControl;

/// Handle over the single card slot.
///
/// Every operation takes `&mut self`, so a controller shared between several
/// callers needs an outer lock.
pub struct Controller<BUS, CLK, IRQ, DETECT = DummyInputPin> {
    /// Block storage driver
    pub bus: BUS,
    /// Millisecond tick source
    pub clock: CLK,
    /// Global interrupt mask
    pub irq: IRQ,
    /// Card detection pin
    pub detect: DETECT,
    /// Whether a pulled high pin is logic true that a card is detected
    pub detect_high_activated: bool,
}

impl<BUS: Bus, CLK: Clock, IRQ: InterruptControl> Controller<BUS, CLK, IRQ, DummyInputPin> {
    /// Create a controller for a slot without card detection
    pub fn new(bus: BUS, clock: CLK, irq: IRQ) -> Self {
        Controller { bus, clock, irq, detect: DummyInputPin, detect_high_activated: true }
    }
}

impl<BUS: Bus, CLK: Clock, IRQ: InterruptControl, DETECT: InputPin>
    Controller<BUS, CLK, IRQ, DETECT>
{
    pub fn with_detect_pin(
        bus: BUS,
        clock: CLK,
        irq: IRQ,
        detect_pin: DETECT,
        detect_high_activated: bool,
    ) -> Self {
        Controller { bus, clock, irq, detect: detect_pin, detect_high_activated }
    }

    pub fn card_present(&self) -> Result<bool, Error> {
        let level = self.detect.is_high().map_err(|_| Error::Hardware)?;
        Ok(level == self.detect_high_activated)
    }

    /// Give back the driver, tick source and interrupt mask
    pub fn release(self) -> (BUS, CLK, IRQ) {
        (self.bus, self.clock, self.irq)
    }
}
