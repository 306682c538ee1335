use crate::bus::SD_MMC_BLOCK_SIZE;
use crate::error::Error;

/// Block range and timeout of one multi-block transfer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub start: u32,
    pub number_of_blocks: u32,
    pub timeout_ms: u32,
}

impl TransferRequest {
    pub fn new(start: u32, number_of_blocks: u32, timeout_ms: u32) -> Self {
        Self { start, number_of_blocks, timeout_ms }
    }

    /// Bytes covered by the request, `None` if that does not fit a `usize`
    pub fn byte_len(&self) -> Option<usize> {
        (self.number_of_blocks as usize).checked_mul(SD_MMC_BLOCK_SIZE)
    }

    /// Check the request against the buffer it will transfer from or into and
    /// return the number of bytes to transfer.
    /// The buffer must be non-empty, word aligned and hold every block.
    pub fn validate(&self, buffer: &[u8]) -> Result<usize, Error> {
        if buffer.is_empty() {
            diag!(error, "[SD] [FAIL] invalid argument: empty buffer");
            return Err(Error::InvalidArgument);
        }
        if self.number_of_blocks == 0 {
            diag!(error, "[SD] [FAIL] invalid argument: number of blocks is 0");
            return Err(Error::InvalidArgument);
        }
        if buffer.as_ptr() as usize % 4 != 0 {
            diag!(error, "[SD] [FAIL] invalid argument: buffer is not 4 byte aligned");
            return Err(Error::InvalidArgument);
        }
        let len = match self.byte_len() {
            Some(len) => len,
            None => {
                diag!(error, "[SD] [FAIL] invalid argument: {} blocks overflow", self.number_of_blocks);
                return Err(Error::InvalidArgument);
            }
        };
        if buffer.len() < len {
            diag!(
                error,
                "[SD] [FAIL] invalid argument: buffer holds {} bytes, {} blocks need {}",
                buffer.len(),
                self.number_of_blocks,
                len
            );
            return Err(Error::InvalidArgument);
        }
        Ok(len)
    }
}
