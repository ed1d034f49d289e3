use crate::{clock::BoardClock, hal};

/// Busy-wait delay running off the board clock.
pub type Delay = hal::delay::Delay<BoardClock>;
