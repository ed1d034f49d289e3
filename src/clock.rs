use crate::hal;

pub use hal::clock::Clock;

/// Board clock rate of the Arduino Mega.
pub type BoardClock = hal::clock::MHz16;
