use embedded_hal::digital::v2::InputPin;

use crate::bus::Bus;
use crate::clock::Clock;
use crate::controller::Controller;
use crate::error_bits::ErrorBits;
use crate::interrupt::InterruptControl;

/// One known controller error flag.
#[derive(Copy, Clone, Debug)]
pub struct ErrorEntry {
    pub mask: ErrorBits,
    pub name: &'static str,
    pub meaning: &'static str,
    pub cause: &'static str,
}

const fn entry(
    mask: ErrorBits,
    name: &'static str,
    meaning: &'static str,
    cause: &'static str,
) -> ErrorEntry {
    ErrorEntry { mask, name, meaning, cause }
}

/// Every SDMMC error flag the controller is known to raise, lowest bit first.
/// New silicon revisions add rows here.
pub static ERROR_TABLE: [ErrorEntry; 18] = [
    entry(
        ErrorBits::CMD_CRC_FAIL,
        "CCRC_FAIL",
        "command response CRC error",
        "poor signal integrity or clock too high",
    ),
    entry(
        ErrorBits::DATA_CRC_FAIL,
        "DCRC_FAIL",
        "data block CRC error",
        "clock above card limit, long or badly matched traces, high speed mode not switched",
    ),
    entry(
        ErrorBits::CMD_RSP_TIMEOUT,
        "CTIMEOUT",
        "command response timeout",
        "card removed, insufficient supply, or clock above 400kHz during identification",
    ),
    entry(
        ErrorBits::DATA_TIMEOUT,
        "DTIMEOUT",
        "data timeout (DAT0 not driven low)",
        "card not responding, block address out of range, or write protected",
    ),
    entry(
        ErrorBits::TX_UNDERRUN,
        "TX_UNDERRUN",
        "transmit FIFO underrun",
        "FIFO not refilled in time: interrupt preemption or clock too high",
    ),
    entry(
        ErrorBits::RX_OVERRUN,
        "RX_OVERRUN",
        "receive FIFO overrun",
        "FIFO not drained in time or FIFO threshold misconfigured",
    ),
    entry(
        ErrorBits::ADDR_MISALIGNED,
        "ADDR_MISALIGNED",
        "buffer address not 4 byte aligned",
        "transfer buffer must be word aligned",
    ),
    entry(ErrorBits::BLOCK_LEN_ERR, "BLOCK_LEN", "block length error", "block size is not 512 bytes"),
    entry(
        ErrorBits::WRITE_PROT_VIOLATION,
        "WRITE_PROT",
        "write protected",
        "physical write protect switch is on",
    ),
    entry(
        ErrorBits::LOCK_UNLOCK_FAILED,
        "LOCK_UNLOCK_FAILED",
        "lock/unlock command failed",
        "card has a password set, CMD42 unlock required",
    ),
    entry(
        ErrorBits::CARD_IS_LOCKED,
        "CARD_IS_LOCKED",
        "card is locked",
        "card is locked and rejects data access",
    ),
    entry(
        ErrorBits::CARD_NOT_SUPPORTED,
        "CARD_NOT_SUPPORTED",
        "card not supported",
        "voltage range or function mismatch",
    ),
    entry(
        ErrorBits::REQUEST_NOT_APPLICABLE,
        "REQUEST_NOT_SUPPORTED",
        "command not supported",
        "an illegal command was sent",
    ),
    entry(
        ErrorBits::INVALID_PARAMETER,
        "INVALID_PARAMETER",
        "invalid parameter",
        "out of range argument or null pointer",
    ),
    entry(
        ErrorBits::UNSUPPORTED_FEATURE,
        "UNSUPPORTED_FEATURE",
        "feature not supported",
        "not available in the current transfer mode",
    ),
    entry(ErrorBits::BUSY, "BUSY", "card busy", "card is busy and refuses new commands"),
    entry(ErrorBits::DMA, "DMA", "DMA error", "DMA transfer aborted or transfer error flag set"),
    entry(ErrorBits::TIMEOUT, "TIMEOUT", "software timeout", "driver timed out waiting for an event"),
];

/// Error flags decoded against [`ERROR_TABLE`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub bits: ErrorBits,
    /// Flags set in `bits` that have no table row
    pub unknown: ErrorBits,
}

impl Classification {
    /// Table rows whose flag is set, in table order
    pub fn entries(&self) -> impl Iterator<Item = &'static ErrorEntry> {
        let bits = self.bits;
        ERROR_TABLE.iter().filter(move |entry| bits.intersects(entry.mask))
    }

    pub fn named_count(&self) -> usize {
        self.entries().count()
    }

    /// No flag at all: the failure came from driver state, not the transport
    pub fn is_zero(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn has_unknown(&self) -> bool {
        !self.unknown.is_empty()
    }
}

pub fn known_mask() -> ErrorBits {
    ERROR_TABLE.iter().fold(ErrorBits::NONE, |mask, entry| mask | entry.mask)
}

pub fn classify(bits: ErrorBits) -> Classification {
    Classification { bits, unknown: bits.difference(known_mask()) }
}

impl<BUS: Bus, CLK: Clock, IRQ: InterruptControl, DETECT: InputPin>
    Controller<BUS, CLK, IRQ, DETECT>
{
    /// Log what the controller error flags say about a failed `operation`.
    /// Only reads from the driver.
    pub fn explain(&mut self, operation: &str) -> Classification {
        let bits = self.bus.error_bits();
        let handle = self.bus.handle_state();
        let classification = classify(bits);

        log::error!("[SD] === SD card {} [FAIL] diagnosis start ===", operation);
        log::error!("[SD] error code = 0x{:08X}, handle state = {:?}", bits.bits(), handle);

        if classification.is_zero() {
            log::warn!("[SD] [WARN] error code is 0, the failure is a driver status, not a transport error");
            log::warn!("[SD] check: 1. card state  2. handle state and error code  3. statuses returned up the call stack");
            log::error!("[SD] === SD card [FAIL] diagnosis end ===");
            return classification;
        }

        for entry in classification.entries() {
            log::error!("[SD] [ERROR] {} (0x{:08X}): {}", entry.name, entry.mask.bits(), entry.meaning);
            log::error!("[SD] [CAUSE] {}", entry.cause);
        }
        if classification.has_unknown() {
            log::warn!("[SD] [WARN] unknown error bits: 0x{:08X}", classification.unknown.bits());
            log::warn!("[SD] check the SDMMC chapter of the reference manual for new error flags");
        }
        if classification.named_count() == 0 {
            log::warn!("[SD] [WARN] error code matches no known error");
        }
        log::error!("[SD] === SD card [FAIL] diagnosis end ===");
        classification
    }
}
