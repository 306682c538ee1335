//! Polling-mode SD card block I/O on top of an SDMMC driver.
//!
//! The [`Controller`] owns the driver ([`Bus`]), a millisecond tick source
//! ([`Clock`]) and the global interrupt mask ([`InterruptControl`]). Every
//! transfer waits for the card to reach the transfer state, then runs with
//! interrupts masked so the controller FIFO is never starved.
//!
//! With the `diagnostics` feature the crate also decodes controller error
//! bits and can run a non-destructive throughput test over a block range.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod macros;

pub mod block;
pub mod bus;
pub mod card;
pub mod clock;
pub mod controller;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
pub mod dummy_input_pin;
pub mod error;
pub mod error_bits;
pub mod interrupt;
pub mod transaction;

#[cfg(test)]
mod fake;

pub use block::{Block, BlockBuffer};
pub use bus::{Bus, SD_MMC_BLOCK_SIZE};
pub use card::{CardInfo, CardState, HandleState};
pub use clock::{Clock, Deadline, Stopwatch};
pub use controller::Controller;
pub use error::{Error, Status};
pub use error_bits::ErrorBits;
pub use interrupt::{InterruptControl, InterruptFree};

/// Timeout used for ordinary transfers and readiness waits.
pub const DEFAULT_TIMEOUT_MS: u32 = 1000;
/// Timeout for operations that may legitimately take several seconds.
pub const LONG_TIMEOUT_MS: u32 = 10_000;
