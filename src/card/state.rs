/// Card state as reported by the SEND_STATUS response.
///
/// This is a view of the hardware at one point in time; every query goes back
/// to the card.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CardState {
    Ready,
    Identification,
    Standby,
    /// Ready to accept a data transfer command
    Transfer,
    Sending,
    Receiving,
    Programming,
    Disconnected,
    Error,
    Unknown(u32),
}

impl CardState {
    /// Card is mid-operation and will come back to Transfer on its own
    pub fn is_busy(self) -> bool {
        matches!(self, CardState::Sending | CardState::Receiving | CardState::Programming)
    }
}

impl From<u32> for CardState {
    fn from(value: u32) -> Self {
        match value {
            0x1 => CardState::Ready,
            0x2 => CardState::Identification,
            0x3 => CardState::Standby,
            0x4 => CardState::Transfer,
            0x5 => CardState::Sending,
            0x6 => CardState::Receiving,
            0x7 => CardState::Programming,
            0x8 => CardState::Disconnected,
            0xFF => CardState::Error,
            other => CardState::Unknown(other),
        }
    }
}

impl Into<u32> for CardState {
    fn into(self) -> u32 {
        match self {
            CardState::Ready => 0x1,
            CardState::Identification => 0x2,
            CardState::Standby => 0x3,
            CardState::Transfer => 0x4,
            CardState::Sending => 0x5,
            CardState::Receiving => 0x6,
            CardState::Programming => 0x7,
            CardState::Disconnected => 0x8,
            CardState::Error => 0xFF,
            CardState::Unknown(raw) => raw,
        }
    }
}

/// State of the driver handle itself, as opposed to the card behind it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandleState {
    Reset,
    Ready,
    Busy,
    Error,
}

impl From<u32> for HandleState {
    fn from(value: u32) -> Self {
        match value {
            0x0 => HandleState::Reset,
            0x1 => HandleState::Ready,
            0x3 => HandleState::Busy,
            _ => HandleState::Error,
        }
    }
}
