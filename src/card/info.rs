/// Card metadata snapshot returned by the driver.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CardInfo {
    /// Card type (0: SDSC, 1: SDHC/SDXC, 3: secured)
    pub card_type: u32,
    /// Card version (0: V1.x, 1: V2.x)
    pub card_version: u32,
    /// Card command classes supported
    pub class: u32,
    /// Relative card address
    pub relative_address: u32,
    /// Capacity in physical blocks
    pub block_count: u32,
    /// Physical block size in bytes
    pub block_size: u32,
    /// Capacity in logical blocks
    pub logical_block_count: u32,
    /// Logical block size in bytes
    pub logical_block_size: u32,
}

impl CardInfo {
    pub fn high_capacity(&self) -> bool {
        self.card_type == 1
    }

    /// Capacity in MB, assuming 512 byte logical blocks
    pub fn capacity_mb(&self) -> u32 {
        self.logical_block_count / 2048
    }

    /// Capacity in GB as (integer part, tenths)
    pub fn capacity_gb(&self) -> (u32, u32) {
        let mb = self.capacity_mb();
        (mb / 1024, ((mb % 1024) * 10) / 1024)
    }
}
