use bit_field::BitField;

/// SDMMC transport error flags as reported by the driver.
///
/// Several flags may be set at once. The constants cover every bit the
/// controller is known to raise; anything else is reported as unknown.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorBits(pub u32);

impl ErrorBits {
    pub const NONE: ErrorBits = ErrorBits(0);
    /// Command response CRC check failed
    pub const CMD_CRC_FAIL: ErrorBits = ErrorBits(0x0000_0001);
    /// Data block CRC check failed
    pub const DATA_CRC_FAIL: ErrorBits = ErrorBits(0x0000_0002);
    /// Command response timeout
    pub const CMD_RSP_TIMEOUT: ErrorBits = ErrorBits(0x0000_0004);
    /// Data timeout
    pub const DATA_TIMEOUT: ErrorBits = ErrorBits(0x0000_0008);
    /// Transmit FIFO underrun
    pub const TX_UNDERRUN: ErrorBits = ErrorBits(0x0000_0010);
    /// Receive FIFO overrun
    pub const RX_OVERRUN: ErrorBits = ErrorBits(0x0000_0020);
    pub const ADDR_MISALIGNED: ErrorBits = ErrorBits(0x0000_0040);
    pub const BLOCK_LEN_ERR: ErrorBits = ErrorBits(0x0000_0080);
    pub const WRITE_PROT_VIOLATION: ErrorBits = ErrorBits(0x0000_0400);
    pub const LOCK_UNLOCK_FAILED: ErrorBits = ErrorBits(0x0000_0800);
    pub const CARD_IS_LOCKED: ErrorBits = ErrorBits(0x0000_1000);
    pub const CARD_NOT_SUPPORTED: ErrorBits = ErrorBits(0x0000_2000);
    pub const REQUEST_NOT_APPLICABLE: ErrorBits = ErrorBits(0x0000_4000);
    pub const INVALID_PARAMETER: ErrorBits = ErrorBits(0x0000_8000);
    pub const UNSUPPORTED_FEATURE: ErrorBits = ErrorBits(0x0001_0000);
    pub const BUSY: ErrorBits = ErrorBits(0x0002_0000);
    pub const DMA: ErrorBits = ErrorBits(0x0004_0000);
    /// Software timeout inside the driver
    pub const TIMEOUT: ErrorBits = ErrorBits(0x0008_0000);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every flag of `other` is set in `self`
    pub fn contains(self, other: ErrorBits) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: ErrorBits) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: ErrorBits) -> ErrorBits {
        ErrorBits(self.0 | other.0)
    }

    pub fn difference(self, other: ErrorBits) -> ErrorBits {
        ErrorBits(self.0 & !other.0)
    }

    pub fn is_set(self, bit: usize) -> bool {
        self.0.get_bit(bit)
    }

    pub fn set(&mut self, bit: usize, value: bool) -> &mut Self {
        self.0.set_bit(bit, value);
        self
    }

    /// Number of flags raised
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl From<u32> for ErrorBits {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Into<u32> for ErrorBits {
    fn into(self) -> u32 {
        self.0
    }
}

impl core::ops::BitOr for ErrorBits {
    type Output = ErrorBits;

    fn bitor(self, rhs: ErrorBits) -> ErrorBits {
        self.union(rhs)
    }
}
