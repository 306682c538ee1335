mod info;
mod state;

pub use info::CardInfo;
pub use state::{CardState, HandleState};
