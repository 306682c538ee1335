use core::convert::Infallible;

use embedded_hal::digital::v2::InputPin;

/// Stand-in for boards without a card-detect line: always reads high.
#[derive(Copy, Clone, Debug, Default)]
pub struct DummyInputPin;

impl InputPin for DummyInputPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}
