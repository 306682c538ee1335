use core::ops::{Deref, DerefMut};

use crate::bus::SD_MMC_BLOCK_SIZE;

/// One 512 byte block, word aligned as the controller FIFO requires.
#[derive(Copy, Clone)]
#[repr(C, align(4))]
pub struct Block(pub [u8; SD_MMC_BLOCK_SIZE]);

impl Block {
    pub const fn new() -> Self {
        Self([0; SD_MMC_BLOCK_SIZE])
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Block {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for Block {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

/// Fixed capacity run of `N` contiguous blocks.
#[derive(Clone)]
pub struct BlockBuffer<const N: usize> {
    blocks: [Block; N],
}

impl<const N: usize> BlockBuffer<N> {
    pub const fn new() -> Self {
        Self { blocks: [Block::new(); N] }
    }

    pub const fn number_of_blocks(&self) -> usize {
        N
    }

    pub fn block(&self, index: usize) -> &Block {
        &self.blocks[index]
    }

    pub fn block_mut(&mut self, index: usize) -> &mut Block {
        &mut self.blocks[index]
    }

    pub fn as_bytes(&self) -> &[u8] {
        let len = N * SD_MMC_BLOCK_SIZE;
        // Block is exactly SD_MMC_BLOCK_SIZE bytes with no padding
        unsafe { core::slice::from_raw_parts(self.blocks.as_ptr() as *const u8, len) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = N * SD_MMC_BLOCK_SIZE;
        unsafe { core::slice::from_raw_parts_mut(self.blocks.as_mut_ptr() as *mut u8, len) }
    }
}

impl<const N: usize> Default for BlockBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_contiguous_and_aligned() {
        let mut buffer = BlockBuffer::<3>::new();
        buffer.block_mut(1)[0] = 0xAB;
        buffer.block_mut(2)[511] = 0xCD;
        let bytes = buffer.as_bytes();
        assert_eq!(bytes.len(), 3 * SD_MMC_BLOCK_SIZE);
        assert_eq!(bytes[512], 0xAB);
        assert_eq!(bytes[3 * 512 - 1], 0xCD);
        assert_eq!(bytes.as_ptr() as usize % 4, 0);
    }

    #[test]
    fn byte_view_writes_through() {
        let mut buffer = BlockBuffer::<2>::default();
        buffer.as_bytes_mut()[513] = 7;
        assert_eq!(buffer.block(1)[1], 7);
        assert_eq!(core::mem::size_of::<Block>(), SD_MMC_BLOCK_SIZE);
    }
}
