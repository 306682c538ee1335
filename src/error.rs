use core::fmt;

use embedded_error::mci::MciError;
use embedded_error::ImplError;

/// Failure of an SD operation.
///
/// Driver failures are passed through unchanged; this layer only produces
/// `InvalidArgument` itself, and `TimedOut` when a readiness wait expires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Empty or misaligned buffer, buffer shorter than the request, or zero blocks
    InvalidArgument,
    /// Card is in the middle of another operation
    Busy,
    /// Deadline exceeded waiting for readiness or for the transfer
    TimedOut,
    /// Transport fault, card in error state or an unrecognized state
    Hardware,
}

/// Outcome of an operation that returns no data.
pub type Status = Result<(), Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Error::InvalidArgument => "invalid argument",
            Error::Busy => "busy",
            Error::TimedOut => "timed out",
            Error::Hardware => "hardware error",
        };
        f.write_str(text)
    }
}

impl From<Error> for MciError {
    fn from(error: Error) -> Self {
        match error {
            Error::InvalidArgument => MciError::Impl(ImplError::InvalidConfiguration),
            Error::Busy => MciError::GroupBusy,
            Error::TimedOut => MciError::Impl(ImplError::TimedOut),
            Error::Hardware => MciError::UnusableCard,
        }
    }
}
