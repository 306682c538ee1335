use crate::card::{CardInfo, CardState, HandleState};
use crate::error::Error;
use crate::error_bits::ErrorBits;

pub const SD_MMC_BLOCK_SIZE: usize = 512;

/// Block storage driver underneath this crate.
///
/// Command sequencing, CRC, clocking and the FIFO itself live behind this
/// trait. Transfers are expected to run in polling mode and return only once
/// the data has gone through the FIFO or the timeout has elapsed.
pub trait Bus {
    /// Initialize the controller and identify the card
    fn initialize(&mut self) -> Result<(), Error>;

    /// State of the driver handle
    fn handle_state(&mut self) -> HandleState;

    /// Query the card state (CMD13)
    fn card_state(&mut self) -> CardState;

    /// Error flags accumulated by the last failed operation
    fn error_bits(&mut self) -> ErrorBits;

    /// Read `number_of_blocks` blocks starting at `start` into `destination`
    /// # Arguments
    ///  * `destination` Buffer of at least `number_of_blocks` blocks, 4 byte aligned
    ///  * `start` First block address
    ///  * `number_of_blocks` Number of blocks to read
    ///  * `timeout_ms` Upper bound for the whole transfer
    fn read_blocks(
        &mut self,
        destination: &mut [u8],
        start: u32,
        number_of_blocks: u32,
        timeout_ms: u32,
    ) -> Result<(), Error>;

    /// Write `number_of_blocks` blocks from `data` starting at `start`
    fn write_blocks(
        &mut self,
        data: &[u8],
        start: u32,
        number_of_blocks: u32,
        timeout_ms: u32,
    ) -> Result<(), Error>;

    /// Erase blocks `start..=end`
    fn erase_blocks(&mut self, start: u32, end: u32) -> Result<(), Error>;

    fn card_info(&mut self) -> Result<CardInfo, Error>;
}
